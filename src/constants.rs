use std::time::Duration;

/// Name of the stack parameter that switches the game server on and off.
pub const PARAMETER_SERVER_STATE: &str = "ServerState";

/// Stack status reported while CloudFormation is applying an update.
pub const STACK_STATUS_UPDATE_IN_PROGRESS: &str = "UPDATE_IN_PROGRESS";

/// Capability acknowledged on every stack update: the template creates IAM
/// resources.
pub const CAPABILITY_IAM: &str = "CAPABILITY_IAM";

/// RCON command listing the players currently online.
pub const RCON_COMMAND_PLAYERS_ONLINE: &str = "/players o";

pub const RCON_PORT_DEFAULT: u16 = 27015;

pub const RCON_TIMEOUT_DEFAULT: Duration = Duration::from_secs(5);

pub const PATH_CONFIG_DEFAULT: &str = "/etc/factorioctl/config.toml";
