//! Server state as derived from the description of the hosting stack.

use crate::constants::{PARAMETER_SERVER_STATE, STACK_STATUS_UPDATE_IN_PROGRESS};

/// State of the game server. Never stored: recomputed from the stack on every
/// query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ServerState {
    Starting,
    Running,
    Stopping,
    Stopped,
    Unknown,
}

impl std::fmt::Display for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s: &str = match self {
            ServerState::Starting => "Starting",
            ServerState::Running => "Running",
            ServerState::Stopping => "Stopping",
            ServerState::Stopped => "Stopped",
            ServerState::Unknown => "Unknown",
        };
        return f.write_str(s);
    }
}

/// A single key/value parameter of a stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackParameter {
    pub key: String,
    pub value: String,
}

impl StackParameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        return Self {
            key: key.into(),
            value: value.into(),
        };
    }
}

/// The parts of a stack description the state depends on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StackDescription {
    /// Parameters in the order the provider listed them.
    pub parameters: Vec<StackParameter>,
    /// Stack status, e.g. `UPDATE_COMPLETE`.
    pub status: String,
}

impl StackDescription {
    /// Value of the first parameter named `key`, if any.
    pub fn parameter(&self, key: &str) -> Option<&str> {
        return self
            .parameters
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str());
    }
}

/// Translate a stack description into a [`ServerState`].
///
/// The `ServerState` parameter holds the desired state and the stack status
/// tells whether CloudFormation is still converging towards it.
///
/// ```rust
/// use factorioctl::state::{translate, ServerState, StackDescription, StackParameter};
///
/// let stack = StackDescription {
///     parameters: vec![StackParameter::new("ServerState", "Running")],
///     status: "UPDATE_IN_PROGRESS".into(),
/// };
/// assert_eq!(translate(Some(&stack)), ServerState::Starting);
/// assert_eq!(translate(None), ServerState::Unknown);
/// ```
pub fn translate(description: Option<&StackDescription>) -> ServerState {
    let description: &StackDescription = match description {
        Some(n) => n,
        None => return ServerState::Unknown,
    };

    let desired: &str = match description.parameter(PARAMETER_SERVER_STATE) {
        Some(n) if !n.is_empty() => n,
        _ => "Unknown",
    };
    let updating: bool = description.status == STACK_STATUS_UPDATE_IN_PROGRESS;

    return match (desired, updating) {
        ("Running", true) => ServerState::Starting,
        ("Running", false) => ServerState::Running,
        ("Stopped", true) => ServerState::Stopping,
        ("Stopped", false) => ServerState::Stopped,
        _ => ServerState::Unknown,
    };
}
