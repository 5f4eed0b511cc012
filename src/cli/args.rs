//! Command-line argument parsing for the wellchat CLI.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Send a message to the assistant (default)
    Ask {
        locale: Option<String>,
        message: String,
    },
    /// Arguments could not be understood
    Invalid(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Arguments
///
/// * `args` - Iterator of command-line arguments (typically `std::env::args()`)
///
/// # Examples
///
/// ```
/// use wellchat::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["wellchat".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut locale = None;
    let mut words: Vec<String> = Vec::new();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        // Everything after `--` is message text
        if arg == "--" {
            words.extend(args.by_ref());
            break;
        }
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--locale" | "-l" => match args.next() {
                Some(tag) => locale = Some(tag),
                None => return CliCommand::Invalid("--locale needs a value".to_string()),
            },
            other if other.starts_with("--locale=") => {
                locale = Some(other["--locale=".len()..].to_string());
            }
            other if other.starts_with('-') && other.len() > 1 => {
                return CliCommand::Invalid(format!("unknown option '{}'", other));
            }
            _ => words.push(arg),
        }
    }

    let message = words.join(" ");
    if message.trim().is_empty() {
        return CliCommand::Help;
    }
    CliCommand::Ask { locale, message }
}
