//! Logger construction.
//!
//! Every event is rendered as
//!
//! ```text
//! [2024-05-01 12:00:00] [INFO] [webhook] Received approved request for token: abc123
//! ```
//!
//! and written to stderr and, when configured, appended to a log file shared
//! with the rest of the duplexer pipeline.
//!
//! The [`Logger`] is a plain value. `main` builds one, the router runs every
//! request under it, and it is dropped when the process exits. Nothing is
//! installed as the global default subscriber.

use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::models::approval::TIMESTAMP_FORMAT;

/// Component tag written into every log line.
pub const COMPONENT: &str = "webhook";

#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Build a logger writing to stderr and, if `logfile` is set, appending to it.
    pub fn new(filter: &str, logfile: Option<&Path>) -> anyhow::Result<Self> {
        let filter = EnvFilter::try_new(filter)
            .with_context(|| format!("invalid log filter: {filter:?}"))?;

        let file_layer = match logfile {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create log directory {}", parent.display())
                    })?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("failed to open log file {}", path.display()))?;
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .event_format(LineFormat)
                        .with_writer(Mutex::new(file)),
                )
            }
            None => None,
        };

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .event_format(LineFormat)
                    .with_writer(std::io::stderr),
            )
            .with(file_layer);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
        })
    }

    /// A logger that drops everything.
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// `[timestamp] [LEVEL] [webhook] message key=value... span_key=value...`
#[derive(Debug, Clone, Copy)]
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
            "[{}] [{}] [{}] ",
            chrono::Local::now().format(TIMESTAMP_FORMAT),
            event.metadata().level(),
            COMPONENT
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        // Trail with the fields of enclosing spans (e.g. method and uri of a request).
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, " {}", fields)?;
                    }
                }
            }
        }
        writeln!(writer)
    }
}
