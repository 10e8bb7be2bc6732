//! # Input Mapper Module
//!
//! Fans a gamepad [`Joy`] report out into drive, actuator and autonomy
//! commands.
//!
//! ## Mapping
//!
//! | Output topic | Source | Transform |
//! |--------------|--------|-----------|
//! | `/cmd_vel` linear | `axes[left_vert_axis]` | `* linear_scale` |
//! | `/cmd_vel` angular | `axes[right_horiz_axis]` | `* angular_scale` |
//! | `/linear_rc` | `axes[right_trigger]` | negated |
//! | `/digger_rc` | `axes[left_trigger]` | negated |
//! | `/click_select_button` | `buttons[start_button]` | emitted only while pressed |
//!
//! Indices are used as-is. A report shorter than a configured index is a
//! fatal fault: the handler panics before anything is published.
//!
//! ## Usage
//!
//! ```
//! use ps4_controller::bus::{Bus, Node};
//! use ps4_controller::config::MapperConfig;
//! use ps4_controller::controller::mapper::InputMapper;
//! use ps4_controller::controller::topics;
//! use ps4_controller::msg::{Joy, Message, VelocityCommand};
//!
//! let bus = Bus::new();
//! let mut cmd_vel = bus.subscribe(topics::CMD_VEL, topics::CMD_VEL_QUEUE_SIZE)?;
//!
//! let mapper = InputMapper::new(MapperConfig::default());
//! let joy = Joy { axes: vec![0.0, 0.5, -0.25, 0.1, 0.8], buttons: vec![false; 13] };
//! mapper.on_joy(&joy, &bus);
//!
//! assert_eq!(
//!     cmd_vel.try_recv().unwrap(),
//!     Message::Velocity(VelocityCommand { linear: 0.5, angular: -0.25 })
//! );
//! # Ok::<(), ps4_controller::error::Ps4ControllerError>(())
//! ```

use std::future::Future;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, info, warn};

use super::topics;
use crate::bus::{Node, Publish, Subscription};
use crate::config::MapperConfig;
use crate::error::Result;
use crate::msg::{ActuatorSpeed, Joy, Message, VelocityCommand};
use crate::params::ParamStore;

/// Number of reports between status log messages
const LOG_INTERVAL_REPORTS: u64 = 1000;

/// Translates gamepad reports into command messages.
///
/// Holds nothing but its configuration, so the same report always produces
/// the same output.
#[derive(Debug, Clone)]
pub struct InputMapper {
    config: MapperConfig,
}

impl InputMapper {
    /// Creates a mapper with an already-resolved configuration.
    #[must_use]
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    /// Resolve configuration from `params` and register the node's topics.
    ///
    /// Advertises the four outbound topics and subscribes to the inbound
    /// report topic, returning that subscription for [`spin`](Self::spin).
    ///
    /// # Errors
    ///
    /// Returns error if a parameter is invalid or a topic cannot be registered.
    pub fn init<P, N>(params: &P, node: &N) -> Result<(Self, Subscription)>
    where
        P: ParamStore + ?Sized,
        N: Node + ?Sized,
    {
        let config = MapperConfig::from_params(params)?;

        for (topic, queue_size) in topics::OUTPUTS {
            node.advertise(topic, queue_size)?;
        }
        let joy = node.subscribe(topics::JOY, topics::JOY_QUEUE_SIZE)?;

        info!("Listening for input reports on {}", topics::JOY);
        Ok((Self::new(config), joy))
    }

    /// The configuration this mapper was built with.
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Transform one report and publish the results.
    ///
    /// Velocity and both actuator speeds are always published, in that order.
    /// The autonomy trigger follows only if its button is pressed.
    ///
    /// # Panics
    ///
    /// Panics if any configured index is past the end of `joy.axes` or
    /// `joy.buttons`. Nothing is published in that case.
    pub fn on_joy<P: Publish + ?Sized>(&self, joy: &Joy, out: &P) {
        let c = &self.config;

        let velocity = VelocityCommand {
            linear: c.linear_scale * f64::from(joy.axes[c.left_vert_axis]),
            angular: c.angular_scale * f64::from(joy.axes[c.right_horiz_axis]),
        };
        let linear_actuator = ActuatorSpeed {
            value: -1.0 * joy.axes[c.right_trigger],
        };
        let digger = ActuatorSpeed {
            value: -1.0 * joy.axes[c.left_trigger],
        };
        let autonomy_requested = joy.buttons[c.start_button];

        out.publish(topics::CMD_VEL, Message::Velocity(velocity));
        out.publish(topics::LINEAR_RC, Message::Speed(linear_actuator));
        out.publish(topics::DIGGER_RC, Message::Speed(digger));

        if autonomy_requested {
            out.publish(topics::AUTONOMY_TOGGLE, Message::Trigger);
        }
    }

    /// Handle reports from `joy` in delivery order until `shutdown` resolves
    /// or the channel closes.
    ///
    /// `shutdown` is checked before each report, so a busy input stream cannot
    /// hold it off. Reports already queued when it resolves are still handled.
    ///
    /// # Returns
    ///
    /// The number of reports handled.
    pub async fn spin<P, S>(&self, mut joy: Subscription, out: &P, shutdown: S) -> u64
    where
        P: Publish + ?Sized,
        S: Future,
    {
        tokio::pin!(shutdown);

        let mut count: u64 = 0;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }

                received = joy.recv() => match received {
                    Ok(message) => self.dispatch(message, out, &mut count),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Input queue overflowed, dropped {} reports", skipped);
                    }
                    Err(RecvError::Closed) => {
                        info!("Input channel closed");
                        break;
                    }
                },
            }
        }

        loop {
            match joy.try_recv() {
                Ok(message) => self.dispatch(message, out, &mut count),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Input queue overflowed, dropped {} reports", skipped);
                }
                Err(_) => break,
            }
        }

        info!("Total input reports handled: {}", count);
        count
    }

    fn dispatch<P: Publish + ?Sized>(&self, message: Message, out: &P, count: &mut u64) {
        match message {
            Message::Joy(report) => {
                self.on_joy(&report, out);
                *count += 1;

                if *count % LOG_INTERVAL_REPORTS == 0 {
                    info!("Handled {} input reports", count);
                }
            }
            other => debug!("Ignoring non-report message on {}: {:?}", topics::JOY, other),
        }
    }
}
