//! Logger initialization.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Crates whose debug output drowns the checker's own messages.
const NOISY_MODULES: &[(&str, LevelFilter)] = &[
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("reqwest", LevelFilter::Info),
    ("rustls", LevelFilter::Warn),
    ("tower", LevelFilter::Info),
    ("kube_client", LevelFilter::Info),
    ("kube", LevelFilter::Info),
];

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first; `level` then overrides the global filter and the
/// filter for `portal_checker` itself, while HTTP and Kubernetes client
/// internals stay at info or above.
///
/// Plain output is colored with an emoji per level. JSON output writes one
/// object per line with `ts` (epoch milliseconds), `level`, `target` and `msg`.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=kube_client=debug portal_checker --log-level info
///
/// # Structured output for log shippers
/// LOG_FORMAT=json portal_checker
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    for (module, filter) in NOISY_MODULES {
        builder.filter_module(module, (*filter).min(level));
    }
    builder.filter_module("portal_checker", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                let emoji = match level {
                    log::Level::Error => "❌",
                    log::Level::Warn => "⚠️",
                    log::Level::Info => "✔️",
                    log::Level::Debug => "🔍",
                    log::Level::Trace => "🔬",
                };

                writeln!(
                    buf,
                    "{} {} {} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S"),
                    emoji,
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init so a second call (tests) reports an error instead of panicking
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}
