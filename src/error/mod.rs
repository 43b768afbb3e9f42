//! Main error module.

/// Non recoverable errors that the _main_ may exit with.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    #[error("cannot load configuration")]
    Config(#[from] crate::config::Error),
    #[error("cannot initialize logging")]
    Logging(#[from] crate::logging::Error),
    #[error("cannot connect to CloudFormation")]
    Stack(#[from] crate::stack::Error),
    #[error("command failed")]
    Command(#[from] crate::manager::Error),
}

impl FatalError {
    pub fn exit_code(&self) -> u8 {
        return match self {
            FatalError::Command(_) => EXIT_ERR_COMMAND,
            FatalError::Stack(_) => EXIT_ERR_COMMAND,
            FatalError::Config(_) => EXIT_ERR_CONFIG,
            FatalError::Logging(_) => EXIT_ERR_LOGGING,
        };
    }
}

/// The requested operation failed.
pub const EXIT_ERR_COMMAND: u8 = 1;

/// Configuration could not be read or is invalid.
pub const EXIT_ERR_CONFIG: u8 = 2;

pub const EXIT_ERR_LOGGING: u8 = 3;
