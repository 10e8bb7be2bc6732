//! # Message Types
//!
//! Shapes of everything that travels over the bus: the inbound gamepad report
//! and the commands the mapper fans it out into.

use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot of a gamepad's axes and buttons at one sampling instant.
///
/// Axes are nominally in `[-1.0, 1.0]`. On the wire, buttons may be given as
/// booleans or as integers (any nonzero value counts as pressed).
///
/// # Examples
///
/// ```
/// use ps4_controller::msg::Joy;
///
/// let joy: Joy = serde_json::from_str(r#"{"axes":[0.0,0.5],"buttons":[0,1,true]}"#)?;
/// assert_eq!(joy.axes, vec![0.0, 0.5]);
/// assert_eq!(joy.buttons, vec![false, true, true]);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Joy {
    /// Continuous inputs (sticks, analog triggers).
    #[serde(default)]
    pub axes: Vec<f32>,

    /// Discrete inputs, `true` when pressed.
    #[serde(default, deserialize_with = "deserialize_buttons")]
    pub buttons: Vec<bool>,
}

/// Drive command: forward speed and turn rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VelocityCommand {
    pub linear: f64,
    pub angular: f64,
}

/// Speed setpoint for a single actuator, nominally in `[-1.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActuatorSpeed {
    pub value: f32,
}

/// Any message carried by the bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Message {
    /// Raw gamepad report
    Joy(Joy),
    /// Drive command
    Velocity(VelocityCommand),
    /// Actuator speed setpoint
    Speed(ActuatorSpeed),
    /// Zero-payload marker (mode toggle request)
    Trigger,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ButtonState {
    Flag(bool),
    Level(i64),
}

fn deserialize_buttons<'de, D>(deserializer: D) -> std::result::Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<ButtonState>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|state| match state {
            ButtonState::Flag(pressed) => pressed,
            ButtonState::Level(level) => level != 0,
        })
        .collect())
}
