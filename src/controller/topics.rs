//! Topic names and queue depths used by the node.

/// Inbound gamepad reports
pub const JOY: &str = "joy";
pub const JOY_QUEUE_SIZE: usize = 10;

/// Drive command
pub const CMD_VEL: &str = "/cmd_vel";
pub const CMD_VEL_QUEUE_SIZE: usize = 1;

/// Autonomy toggle request
pub const AUTONOMY_TOGGLE: &str = "/click_select_button";
pub const AUTONOMY_TOGGLE_QUEUE_SIZE: usize = 10;

/// Digger arm linear actuator speed
pub const LINEAR_RC: &str = "/linear_rc";
pub const LINEAR_RC_QUEUE_SIZE: usize = 5;

/// Digger drum speed
pub const DIGGER_RC: &str = "/digger_rc";
pub const DIGGER_RC_QUEUE_SIZE: usize = 5;

/// Every outbound topic with its queue depth, in registration order.
pub const OUTPUTS: [(&str, usize); 4] = [
    (CMD_VEL, CMD_VEL_QUEUE_SIZE),
    (AUTONOMY_TOGGLE, AUTONOMY_TOGGLE_QUEUE_SIZE),
    (LINEAR_RC, LINEAR_RC_QUEUE_SIZE),
    (DIGGER_RC, DIGGER_RC_QUEUE_SIZE),
];
