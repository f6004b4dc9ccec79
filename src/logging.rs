//! Tracing setup.
//!
//! Two layers:
//! - `<logdir>/tweed.log`, rotated at 2 MB with 5 numbered backups, every
//!   event at DEBUG and above, one `timestamp [LEVEL] message` line each
//! - stderr, filtered by `RUST_LOG` (default `warn`, `debug` with `--verbose`)

use crate::config::Config;
use chrono::Local;
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use std::error::Error;
use std::fmt;
use std::sync::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tfmt, EnvFilter, Layer};

pub const MAX_LOG_BYTES: usize = 2_000_000;
pub const LOG_BACKUPS: usize = 5;
const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// `2024-03-05 10:00:00,123 [INFO] message key=value`
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{} [{}] ",
            Local::now().format(TIMESTAMP),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub fn init(config: &Config, verbose: bool) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(&config.log_directory)?;

    let log_file = FileRotate::new(
        config.log_file(),
        AppendCount::new(LOG_BACKUPS),
        ContentLimit::Bytes(MAX_LOG_BYTES),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    let file_layer = tfmt::layer()
        .with_ansi(false)
        .event_format(LineFormat)
        .with_writer(Mutex::new(log_file))
        .with_filter(LevelFilter::DEBUG);

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console_layer = tfmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_line_format() {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let subscriber = tfmt()
            .with_ansi(false)
            .event_format(LineFormat)
            .with_writer(move || sink.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(link = "page1", "malformed <link>");
        });

        let out = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(out.ends_with("[WARN] malformed <link> link=\"page1\"\n"), "{out}");
        // 2024-03-05 10:00:00,123
        assert_eq!(out.find(" ["), Some(23));
    }
}
