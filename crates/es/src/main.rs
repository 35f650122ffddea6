use clap::Parser;
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod dispatch;
mod output;

use cli::Cli;
use commands::config::{load_config, Config};
use commands::{CommandContext, CommandError};
use dispatch::Dispatch;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            let ctx = CommandContext::from_cli(&cli, &Config::default());
            report_error(&ctx, &e);
            return error_exit_code(&e);
        }
    };
    let ctx = CommandContext::from_cli(&cli, &config);

    match Dispatch::from_cli(&cli).execute(&ctx, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&ctx, &e);
            error_exit_code(&e)
        }
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` selects debug and
/// everything else warn.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Prints an error to stderr, as JSON or as text.
fn report_error(ctx: &CommandContext, e: &CommandError) {
    if ctx.json_output {
        let mut error = serde_json::json!({
            "code": error_code(e),
            "message": e.to_string(),
        });
        if let CommandError::Syntax { error: syntax, .. } = e {
            if let Ok(details) = serde_json::to_value(syntax) {
                error["details"] = details;
            }
        }
        let error_json = serde_json::json!({ "error": error });
        let text = serde_json::to_string_pretty(&error_json)
            .unwrap_or_else(|_| error_json.to_string());
        eprintln!("{text}");
        return;
    }

    match e {
        CommandError::Syntax { error, input } => {
            let rendered = error.render(input);
            match rendered.strip_prefix("Error:") {
                Some(rest) if ctx.use_colors => eprintln!("{}{rest}", "Error:".red().bold()),
                _ => eprintln!("{rendered}"),
            }
        }
        _ if ctx.use_colors => eprintln!("{} {e}", "Error:".red().bold()),
        _ => eprintln!("Error: {e}"),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Syntax { .. } => "SYNTAX_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the exit status for an error.
fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Syntax { .. } => 1,
        CommandError::Config(_) => 5,
        CommandError::Io(_) => 3,
        CommandError::Json(_) => 1,
    }
}

fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(exit_status(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syntax_error() -> CommandError {
        let input = "tag:\"open";
        let error = expense_search_rs::parse(input).unwrap_err();
        CommandError::syntax(error, input)
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(error_code(&syntax_error()), "SYNTAX_ERROR");
        assert_eq!(
            error_code(&CommandError::Config("bad".to_string())),
            "CONFIG_ERROR"
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(error_code(&CommandError::Io(io)), "IO_ERROR");
    }

    #[test]
    fn test_exit_statuses() {
        assert_eq!(exit_status(&syntax_error()), 1);
        assert_eq!(exit_status(&CommandError::Config("bad".to_string())), 5);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(exit_status(&CommandError::Io(io)), 3);
    }
}
