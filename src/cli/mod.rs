pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands};
pub use handlers::{build_controller, run_command, CommandStatus, FileError};
pub use output::{OutputFormat, OutputFormatter};
