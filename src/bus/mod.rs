//! # Messaging Bus
//!
//! The messaging collaborator the mapper is written against, plus an
//! in-process implementation.
//!
//! This module handles:
//! - Advertising outbound topics with a bounded queue depth
//! - Subscribing to inbound topics
//! - Fire-and-forget publishing
//!
//! Each topic is a `tokio::sync::broadcast` channel sized to its queue depth.
//! A subscriber that falls behind loses the oldest messages first.
//!
//! A tap receives every message on a set of topics through one queue, in the
//! order they were published.

pub mod jsonl;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::error::{Ps4ControllerError, Result};
use crate::msg::Message;

/// Receiving end of a topic.
pub type Subscription = broadcast::Receiver<Message>;

/// Receiving end of a tap: `(topic, message)` in publish order.
pub type Tap = mpsc::Receiver<(String, Message)>;

/// Outbound half of the messaging collaborator.
///
/// Delivery is best effort. Callers never learn whether a message arrived.
#[cfg_attr(test, mockall::automock)]
pub trait Publish {
    fn publish(&self, topic: &str, message: Message);
}

/// Full messaging collaborator: topic registration plus publishing.
pub trait Node: Publish {
    /// Register an outbound topic with the given queue depth.
    fn advertise(&self, topic: &str, queue_size: usize) -> Result<()>;

    /// Register interest in an inbound topic with the given queue depth.
    fn subscribe(&self, topic: &str, queue_size: usize) -> Result<Subscription>;
}

/// In-process topic registry.
///
/// Cloning is cheap and every clone shares the same topics.
///
/// # Examples
///
/// ```
/// use ps4_controller::bus::{Bus, Node, Publish};
/// use ps4_controller::msg::Message;
///
/// let bus = Bus::new();
/// let mut rx = bus.subscribe("/click_select_button", 10)?;
/// bus.publish("/click_select_button", Message::Trigger);
/// assert_eq!(rx.try_recv().unwrap(), Message::Trigger);
/// # Ok::<(), ps4_controller::error::Ps4ControllerError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bus {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<Message>>>>,
    taps: Arc<Mutex<Vec<TapSender>>>,
}

#[derive(Debug)]
struct TapSender {
    topics: Vec<String>,
    sender: mpsc::Sender<(String, Message)>,
}

impl Bus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the channel for `topic`. The first registration fixes its depth.
    fn channel(&self, topic: &str, queue_size: usize) -> Result<broadcast::Sender<Message>> {
        if queue_size == 0 {
            return Err(Ps4ControllerError::Transport(format!(
                "queue size for {} must be greater than 0",
                topic
            )));
        }

        let mut topics = self
            .topics
            .lock()
            .map_err(|_| Ps4ControllerError::Transport("topic registry poisoned".to_string()))?;

        let sender = topics.entry(topic.to_string()).or_insert_with(|| {
            debug!("Registered topic {} (queue size {})", topic, queue_size);
            broadcast::channel(queue_size).0
        });

        Ok(sender.clone())
    }

    /// Receive every message published on `topics` through a single queue.
    ///
    /// Messages keep their publish order across topics. When the queue is
    /// full, new messages are dropped. The tap closes once every clone of
    /// the bus is gone.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if `queue_size` is 0 or the tap registry is poisoned.
    pub fn tap(&self, topics: &[&str], queue_size: usize) -> Result<Tap> {
        if queue_size == 0 {
            return Err(Ps4ControllerError::Transport(
                "tap queue size must be greater than 0".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::channel(queue_size);
        self.taps
            .lock()
            .map_err(|_| Ps4ControllerError::Transport("tap registry poisoned".to_string()))?
            .push(TapSender {
                topics: topics.iter().map(|t| t.to_string()).collect(),
                sender,
            });

        Ok(receiver)
    }

    fn feed_taps(&self, topic: &str, message: &Message) {
        let Ok(mut taps) = self.taps.lock() else {
            warn!("Tap registry poisoned, skipping taps for {}", topic);
            return;
        };

        taps.retain(|tap| {
            if !tap.topics.iter().any(|t| t == topic) {
                return true;
            }
            match tap.sender.try_send((topic.to_string(), message.clone())) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!("Tap queue full, dropped message on {}", topic);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
    }
}

impl Publish for Bus {
    fn publish(&self, topic: &str, message: Message) {
        let sender = match self.topics.lock() {
            Ok(topics) => topics.get(topic).cloned(),
            Err(_) => {
                warn!("Topic registry poisoned, dropping message for {}", topic);
                return;
            }
        };

        match sender {
            Some(sender) => {
                self.feed_taps(topic, &message);
                if sender.send(message).is_err() {
                    debug!("No subscribers on {}, message dropped", topic);
                }
            }
            None => warn!("Publish on unregistered topic {}", topic),
        }
    }
}

impl Node for Bus {
    fn advertise(&self, topic: &str, queue_size: usize) -> Result<()> {
        self.channel(topic, queue_size).map(|_| ())
    }

    fn subscribe(&self, topic: &str, queue_size: usize) -> Result<Subscription> {
        Ok(self.channel(topic, queue_size)?.subscribe())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::ActuatorSpeed;
    use tokio::sync::broadcast::error::TryRecvError;

    fn speed(value: f32) -> Message {
        Message::Speed(ActuatorSpeed { value })
    }

    #[test]
    fn test_publish_reaches_subscriber() {
        let bus = Bus::new();
        let mut rx = bus.subscribe("/digger_rc", 5).unwrap();

        bus.publish("/digger_rc", speed(0.5));

        assert_eq!(rx.try_recv().unwrap(), speed(0.5));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let bus = Bus::new();
        bus.advertise("/linear_rc", 5).unwrap();
        let mut first = bus.subscribe("/linear_rc", 5).unwrap();
        let mut second = bus.clone().subscribe("/linear_rc", 5).unwrap();

        bus.publish("/linear_rc", speed(-1.0));

        assert_eq!(first.try_recv().unwrap(), speed(-1.0));
        assert_eq!(second.try_recv().unwrap(), speed(-1.0));
    }

    #[test]
    fn test_zero_queue_size_rejected() {
        let bus = Bus::new();
        match bus.advertise("/cmd_vel", 0) {
            Err(Ps4ControllerError::Transport(msg)) => assert!(msg.contains("/cmd_vel")),
            other => panic!("Expected Transport error, got: {:?}", other),
        }
    }

    #[test]
    fn test_queue_depth_drops_oldest() {
        let bus = Bus::new();
        let mut rx = bus.subscribe("/cmd_vel", 1).unwrap();

        bus.publish("/cmd_vel", speed(0.1));
        bus.publish("/cmd_vel", speed(0.2));

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(1))));
        assert_eq!(rx.try_recv().unwrap(), speed(0.2));
    }

    #[test]
    fn test_first_registration_fixes_depth() {
        let bus = Bus::new();
        bus.advertise("/digger_rc", 1).unwrap();
        let mut rx = bus.subscribe("/digger_rc", 10).unwrap();

        bus.publish("/digger_rc", speed(0.1));
        bus.publish("/digger_rc", speed(0.2));

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(1))));
    }

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let bus = Bus::new();
        bus.advertise("/click_select_button", 10).unwrap();
        bus.publish("/click_select_button", Message::Trigger);

        // Late subscribers do not see earlier messages
        let mut rx = bus.subscribe("/click_select_button", 10).unwrap();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_tap_keeps_publish_order_across_topics() {
        let bus = Bus::new();
        bus.advertise("/linear_rc", 5).unwrap();
        bus.advertise("/digger_rc", 5).unwrap();
        bus.advertise("/click_select_button", 10).unwrap();
        let mut tap = bus.tap(&["/linear_rc", "/digger_rc"], 8).unwrap();

        bus.publish("/digger_rc", speed(0.1));
        bus.publish("/click_select_button", Message::Trigger);
        bus.publish("/linear_rc", speed(0.2));
        bus.publish("/digger_rc", speed(0.3));

        let received: Vec<(String, Message)> = std::iter::from_fn(|| tap.try_recv().ok()).collect();
        assert_eq!(
            received,
            vec![
                ("/digger_rc".to_string(), speed(0.1)),
                ("/linear_rc".to_string(), speed(0.2)),
                ("/digger_rc".to_string(), speed(0.3)),
            ]
        );
    }

    #[test]
    fn test_tap_full_drops_newest() {
        let bus = Bus::new();
        bus.advertise("/digger_rc", 5).unwrap();
        let mut tap = bus.tap(&["/digger_rc"], 1).unwrap();

        bus.publish("/digger_rc", speed(0.1));
        bus.publish("/digger_rc", speed(0.2));

        assert_eq!(tap.try_recv().unwrap(), ("/digger_rc".to_string(), speed(0.1)));
        assert!(tap.try_recv().is_err());
    }

    #[test]
    fn test_tap_closes_with_bus() {
        let bus = Bus::new();
        let mut tap = bus.tap(&["/cmd_vel"], 4).unwrap();
        drop(bus);
        assert!(matches!(
            tap.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_dropped_tap_is_removed() {
        let bus = Bus::new();
        bus.advertise("/cmd_vel", 1).unwrap();
        drop(bus.tap(&["/cmd_vel"], 4).unwrap());

        bus.publish("/cmd_vel", Message::Trigger);
        assert!(bus.taps.lock().unwrap().is_empty());
    }

    #[test]
    fn test_zero_tap_queue_size_rejected() {
        let bus = Bus::new();
        assert!(matches!(bus.tap(&["/cmd_vel"], 0), Err(Ps4ControllerError::Transport(_))));
    }

    #[test]
    fn test_publish_unregistered_topic_is_ignored() {
        let bus = Bus::new();
        bus.publish("/nowhere", Message::Trigger);
        assert!(bus.topics.lock().unwrap().is_empty());
    }
}
