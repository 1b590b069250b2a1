//! Lyra terminal player
//!
//! Library half of the `lyra` binary: configuration loading, prompt command
//! parsing and the interactive session loop.

pub mod command;
pub mod config;
pub mod error;
pub mod inspect;
pub mod session;

pub use command::{Command, CommandError};
pub use config::AppConfig;
pub use error::ConfigError;
pub use session::{Flow, Session};
