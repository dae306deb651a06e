pub mod logger;

pub use logger::{init_logger, log_directory};
