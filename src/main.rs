use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use color_eyre::Result;
use tracing::warn;

use wellchat::adapters::StaticEntitlement;
use wellchat::assistant::{Assistant, Reply};
use wellchat::cli::{parse_args, run_cli_command, CliCommand};
use wellchat::config::AssistConfig;
use wellchat::models::Conversation;
use wellchat::session::{SessionHandle, SessionOutcome, SessionUpdate};
use wellchat::traits::Tier;

const ENV_AUTH_TOKEN: &str = "WELLCHAT_AUTH_TOKEN";
const ENV_TIER: &str = "WELLCHAT_TIER";

/// Exit code when the user interrupts a streaming reply.
const EXIT_CANCELLED: u8 = 130;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("wellchat=info"));

    // stdout carries the transcript only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn tier_from_env() -> Tier {
    match std::env::var(ENV_TIER) {
        Ok(raw) => Tier::parse(&raw).unwrap_or_else(|| {
            warn!("Ignoring invalid {}={:?}, using free", ENV_TIER, raw);
            Tier::Free
        }),
        Err(_) => Tier::Free,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    init_tracing();

    let command = parse_args(std::env::args());
    if let Some(result) = run_cli_command(&command) {
        result?;
        return Ok(ExitCode::SUCCESS);
    }

    let CliCommand::Ask { locale, message } = command else {
        return Ok(ExitCode::SUCCESS);
    };

    let mut config = AssistConfig::from_env();
    if let Some(locale) = locale {
        config = config.with_locale(locale);
    }

    let auth_token = std::env::var(ENV_AUTH_TOKEN).unwrap_or_default();
    if auth_token.is_empty() {
        warn!("{} is not set; only canned replies are available", ENV_AUTH_TOKEN);
    }

    let entitlements = Arc::new(StaticEntitlement::new(tier_from_env()));
    let assistant = Assistant::from_config(&config, entitlements)?;

    let conversation = Conversation::new();
    match assistant
        .send_message(&conversation, &message, &auth_token)
        .await?
    {
        Reply::Fallback { reply, .. } => {
            println!("{}", reply.text());
            Ok(ExitCode::SUCCESS)
        }
        Reply::Streaming(handle) => stream_reply(handle).await,
    }
}

/// Print fragments as they arrive; Ctrl-C cancels the session.
async fn stream_reply(mut handle: SessionHandle) -> Result<ExitCode> {
    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut stdout = std::io::stdout();
    let mut printed = 0;

    while let Some(update) = handle.recv().await {
        match update {
            SessionUpdate::Snapshot(text) => {
                // Snapshots are cumulative; print only the new suffix
                if let Some(new) = text.get(printed..) {
                    write!(stdout, "{}", new)?;
                    stdout.flush()?;
                }
                printed = text.len();
            }
            SessionUpdate::Finished(_) => break,
        }
    }

    let report = handle.join().await?;
    if printed > 0 {
        writeln!(stdout)?;
    }

    let code = match &report.outcome {
        SessionOutcome::Completed | SessionOutcome::EndedWithoutTerminal => ExitCode::SUCCESS,
        SessionOutcome::Cancelled => {
            eprintln!("Cancelled.");
            ExitCode::from(EXIT_CANCELLED)
        }
        SessionOutcome::Failed(err) => {
            eprintln!("{}", err.user_message());
            if err.is_retryable() {
                eprintln!("{}", err.recovery_hint());
            }
            ExitCode::from(1)
        }
    };
    Ok(code)
}
