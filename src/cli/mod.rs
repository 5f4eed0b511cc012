//! CLI module for wellchat.
//!
//! - Argument parsing
//! - Version and help display
//!
//! # Usage
//!
//! ```ignore
//! use wellchat::cli::{parse_args, run_cli_command, CliCommand};
//!
//! let command = parse_args(std::env::args());
//! if let Some(result) = run_cli_command(&command) {
//!     if let Err(e) = result {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(2);
//!     }
//!     std::process::exit(0);
//! }
//! // CliCommand::Ask: talk to the assistant
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand};
pub use version::{handle_version_command, VERSION};

use color_eyre::eyre::eyre;
use color_eyre::Result;

/// Usage text for `--help`.
pub const USAGE: &str = "\
Usage: wellchat [--locale <tag>] <message...>

Send a message to the wellness assistant and print the reply.

Options:
  -l, --locale <tag>   Reply language (en, es, pt, fr; region suffixes allowed)
  -h, --help           Show this help
  -V, --version        Show version

Environment:
  WELLCHAT_ENDPOINT         Chat endpoint URL
  WELLCHAT_AUTH_TOKEN       Bearer token for the endpoint
  WELLCHAT_TIER             free | premium (default: free)
  WELLCHAT_LOCALE           Default locale (default: en)
  WELLCHAT_CONNECT_TIMEOUT  Connect timeout in seconds (default: 10)
  RUST_LOG                  Log filter (default: wellchat=info)";

/// Run a CLI command if it does not need the assistant.
///
/// # Returns
///
/// * `None` - If the command is `Ask`
/// * `Some(Ok(()))` - If a CLI command executed successfully
/// * `Some(Err(e))` - If the arguments were invalid
///
/// # Note
///
/// The `Version` command never returns as it calls `std::process::exit(0)`.
pub fn run_cli_command(command: &CliCommand) -> Option<Result<()>> {
    match command {
        CliCommand::Version => handle_version_command(),
        CliCommand::Help => {
            println!("{}", USAGE);
            Some(Ok(()))
        }
        CliCommand::Invalid(reason) => Some(Err(eyre!("{}\n\n{}", reason, USAGE))),
        CliCommand::Ask { .. } => None,
    }
}
