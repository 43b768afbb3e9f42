//! The infrastructure stack the game server is provisioned with.

mod cloudformation;

pub use cloudformation::CloudFormation;

use crate::launch::ParameterUpdate;
use crate::state::StackDescription;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("stack operation '{operation}' failed: {message}")]
    Sdk {
        operation: &'static str,
        message: String,
    },
    #[error("cannot create runtime for the stack client")]
    Runtime(#[source] std::io::Error),
}

/// A stack update that keeps the current template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub stack_name: String,
    pub parameters: Vec<ParameterUpdate>,
    pub use_previous_template: bool,
    pub capabilities: Vec<String>,
}

/// Source of stack descriptions and sink of stack updates.
pub trait StackProvider {
    /// Describe the stack, or `None` when the provider returns no stack
    /// record for the name.
    fn describe(&self, stack_name: &str) -> Result<Option<StackDescription>, Error>;

    /// Request an update. Returns once the request is accepted, not once the
    /// stack has converged.
    fn update(&self, request: &UpdateRequest) -> Result<(), Error>;
}
