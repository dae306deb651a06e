pub mod commands;
pub mod controller;
pub mod error;
pub mod prompts;
pub mod render;
pub mod validate;

pub use commands::{parse_command, Command, CommandError};
pub use controller::{BidConsole, BidOutcome, ConsoleSettings, PlayerInsight};
pub use error::{ConsoleError, ErrorKind};
