//! Logger initialization.
//!
//! Log lines go to stderr so a JSON report on stdout stays machine-readable.
//! Every line names the audited URL.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter};

/// Initializes the logger with the specified level and format.
///
/// The logger reads from the `RUST_LOG` environment variable by default, but
/// the provided `level` parameter will override it for this crate.
///
/// # Arguments
///
/// * `level` - Minimum log level to display (overrides `RUST_LOG` if set)
/// * `format` - Log format (Plain or Json)
/// * `audit_url` - URL under audit, stamped onto every line
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger was already installed.
///
/// # Examples
///
/// ```bash
/// # Override with CLI args (takes precedence)
/// RUST_LOG=debug origin_audit --url example.com --log-level info
///
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=origin_audit=debug,sqlx=info origin_audit --url example.com
/// ```
pub fn init_logger_with(
    level: LevelFilter,
    format: LogFormat,
    audit_url: &str,
) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.target(env_logger::Target::Stderr);
    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Warn);
    // The CDP handler logs every unknown protocol message it drops
    builder.filter_module("chromiumoxide", LevelFilter::Error);
    builder.filter_module("tungstenite", LevelFilter::Warn);
    builder.filter_module("origin_audit", level);

    let audit_url = audit_url.to_string();
    match format {
        LogFormat::Json => {
            builder.format(move |buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        record.level(),
                        record.target(),
                        &audit_url,
                        &record.args().to_string()
                    )
                )
            });
        }
        LogFormat::Plain => {
            builder.format(move |buf, record| {
                writeln!(
                    buf,
                    "{} {} {} {}",
                    chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
                    colored_level(record.level()),
                    format!("<{}>", audit_url).cyan(),
                    record.args()
                )
            });
        }
    }

    // try_init: tests may install a logger more than once per process
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// One JSON log object: timestamp, level, module, audited URL, message.
fn json_line(level: Level, target: &str, audit_url: &str, message: &str) -> String {
    serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "level": level.as_str(),
        "module": target,
        "url": audit_url,
        "msg": message,
    })
    .to_string()
}

fn colored_level(level: Level) -> ColoredString {
    let label = format!("{:<5}", level.as_str());
    match level {
        Level::Error => label.red().bold(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    }
}
