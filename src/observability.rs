//! This module provides observability and diagnostics for the family selector.
//!
//! The selector makes an empirical decision per signal, so its scoring needs to
//! be visible. Two tools are provided:
//! 1. `log_metric!`, a structured key/value line compiled out of release builds.
//! 2. `enable_verbose_logging`, which installs an `env_logger` backend for the
//!    `log` calls made throughout the crate.

use std::fs::OpenOptions;
use std::sync::Once;

use log::LevelFilter;

use crate::error::HybridError;

/// Logs a structured key-value metric string to stdout, only in debug builds.
///
/// # Example
/// ```
/// use tambak_rp2::log_metric;
/// let size = 1024;
/// log_metric!("event"="candidate_scored", "basis"="db4", "size"=&size);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            let output = format!("TAMBAK_RP2_METRIC: {{ {} }}", parts.join(", "));
            println!("{}", output);
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Turns on `info`-level logging for the selector's candidate scoring.
///
/// Only the first call is acted on: it opens `log_file` (if any) and installs
/// the logger. Later calls return `Ok(())` without touching the filesystem. If
/// `log_file` is given, records are appended to that file instead of stderr.
///
/// # Errors
/// `Io` when the first call cannot open `log_file`.
pub fn enable_verbose_logging(log_file: Option<&str>) -> Result<(), HybridError> {
    let mut result = Ok(());
    INIT_LOGGER.call_once(|| {
        result = configure_builder(log_file).map(|mut builder| {
            let _ = builder.try_init();
        });
    });
    result
}

fn configure_builder(log_file: Option<&str>) -> Result<env_logger::Builder, HybridError> {
    let mut builder = env_logger::Builder::new();

    builder.is_test(false);
    builder.filter_level(LevelFilter::Info);

    // Custom formatter: just print the level and message
    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(buf, "[{}] {}", record.level(), record.args())?;
        buf.flush()?;
        Ok(())
    });

    if let Some(path) = log_file {
        let file = OpenOptions::new().append(true).create(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_verbose_logging_is_idempotent() {
        assert!(enable_verbose_logging(None).is_ok());
        assert!(enable_verbose_logging(None).is_ok());
    }

    #[test]
    fn test_bad_log_path_is_reported() {
        let result = configure_builder(Some("/nonexistent-dir/for/sure/log.txt"));
        assert!(matches!(result, Err(HybridError::Io(_))));
    }

    #[test]
    fn test_later_calls_do_not_create_the_log_file() {
        // Whichever test runs first, the logger is installed after this call.
        assert!(enable_verbose_logging(None).is_ok());

        let path = std::env::temp_dir().join(format!(
            "tambak_rp2_unused_log_{}.txt",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let path_str = path.to_str().unwrap();

        assert!(enable_verbose_logging(Some(path_str)).is_ok());
        assert!(!path.exists());
    }

    #[test]
    fn test_log_metric_accepts_mixed_values() {
        let level = 3;
        log_metric!("event" = "unit_test", "level" = &level, "basis" = "haar");
    }
}
