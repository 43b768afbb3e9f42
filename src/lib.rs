//! Manage a Factorio server hosted on an AWS CloudFormation stack.
//!
//! The stack carries a `ServerState` parameter that provisions or tears down
//! the game server. Flipping it starts or stops the server, and reading it
//! together with the stack status tells the server's state. Players online
//! are listed over the game server's RCON.

pub mod args;
pub mod config;
pub mod constants;
pub mod error;
pub mod launch;
pub mod logging;
pub mod manager;
pub mod rcon;
pub mod server;
pub mod stack;
pub mod state;
pub mod util;
