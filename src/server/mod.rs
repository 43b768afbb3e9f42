//! Game servers that can be switched on and off.

use crate::constants::CAPABILITY_IAM;
use crate::launch::{build_parameters, LaunchArguments, TargetState};
use crate::stack::{StackProvider, UpdateRequest};
use crate::state::{translate, ServerState, StackDescription};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot request server {action}")]
    Stack {
        action: &'static str,
        #[source]
        source: crate::stack::Error,
    },
}

/// A game server whose state can be queried and changed.
pub trait Server {
    /// Current state. Failures to find out are reported as
    /// [`ServerState::Unknown`].
    fn state(&self) -> ServerState;

    /// Ask the server to start. Does not wait for it to come up.
    fn start(&self) -> Result<(), Error>;

    /// Ask the server to stop. Does not wait for it to go down.
    fn stop(&self) -> Result<(), Error>;
}

/// Server provisioned by an infrastructure stack whose `ServerState`
/// parameter switches the game server on and off.
pub struct StackServer<P: StackProvider> {
    provider: P,
    stack_name: String,
    launch_arguments: LaunchArguments,
}

impl<P: StackProvider> StackServer<P> {
    /// Server whose launch arguments all keep their previous values.
    pub fn new(provider: P, stack_name: impl Into<String>) -> Self {
        return Self::with_launch_arguments(provider, stack_name, Self::default_launch_arguments());
    }

    pub fn with_launch_arguments(
        provider: P,
        stack_name: impl Into<String>,
        launch_arguments: LaunchArguments,
    ) -> Self {
        return Self {
            provider,
            stack_name: stack_name.into(),
            launch_arguments,
        };
    }

    pub fn default_launch_arguments() -> LaunchArguments {
        return LaunchArguments::default();
    }

    pub fn stack_name(&self) -> &str {
        return &self.stack_name;
    }

    pub fn launch_arguments(&self) -> &LaunchArguments {
        return &self.launch_arguments;
    }

    /// Like [`Server::state`], but keeps the reason the stack could not be
    /// described.
    pub fn query_state(&self) -> Result<ServerState, crate::stack::Error> {
        let description: Option<StackDescription> = self.provider.describe(&self.stack_name)?;
        if description.is_none() {
            log::debug!("No stack record returned for {}", self.stack_name);
        }
        return Ok(translate(description.as_ref()));
    }

    fn update_request(&self, target: TargetState) -> UpdateRequest {
        return UpdateRequest {
            stack_name: self.stack_name.clone(),
            parameters: build_parameters(&self.launch_arguments, target),
            use_previous_template: true,
            capabilities: vec![CAPABILITY_IAM.into()],
        };
    }

    fn request(&self, target: TargetState, action: &'static str) -> Result<(), Error> {
        let request: UpdateRequest = self.update_request(target);
        log::info!(
            "Requesting stack {} to update ServerState to {}",
            self.stack_name,
            target.as_str()
        );
        match self.provider.update(&request) {
            Ok(()) => return Ok(()),
            Err(source) => return Err(Error::Stack { action, source }),
        }
    }
}

impl<P: StackProvider> Server for StackServer<P> {
    fn state(&self) -> ServerState {
        match self.query_state() {
            Ok(n) => n,
            Err(err) => {
                log::warn!("Cannot describe stack {}: {err}", self.stack_name);
                ServerState::Unknown
            }
        }
    }

    fn start(&self) -> Result<(), Error> {
        return self.request(TargetState::Running, "start");
    }

    fn stop(&self) -> Result<(), Error> {
        return self.request(TargetState::Stopped, "stop");
    }
}
