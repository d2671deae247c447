//! Structured logging setup
//!
//! Installs a `tracing` subscriber with a console sink on stderr and an
//! optional rolling file sink. Both use [`ServiceFormat`], which stamps
//! every record with the service name and the current request id.

use std::fmt::{self, Write as _};

use anyhow::Context as _;
use serde_json::{Map, Value};
use tracing::{
    field::{Field, Visit},
    Event, Subscriber,
};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter,
};
use zd_shared::config::{LogFileConfig, LogFormat, LogRotation, LoggingConfig};

use crate::context::current_request_id;

/// Placeholder for records emitted outside a request
const NO_REQUEST_ID: &str = "-";

/// Keeps the file sink flushing; drop it only at shutdown
#[derive(Debug)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level`. Fails if a global
/// subscriber is already installed.
pub fn setup_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("Invalid log level: {}", config.level))?,
    };

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .event_format(ServiceFormat::new(&config.service, config.format));

    let (file_layer, guard) = match &config.file {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(file));
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .event_format(ServiceFormat::new(&config.service, file.format));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::debug!(service = %config.service, level = %config.level, "Logging initialized");
    Ok(LoggingGuard { _file: guard })
}

fn file_appender(file: &LogFileConfig) -> rolling::RollingFileAppender {
    match file.rotation {
        LogRotation::Daily => rolling::daily(&file.directory, &file.prefix),
        LogRotation::Hourly => rolling::hourly(&file.directory, &file.prefix),
        LogRotation::Never => rolling::never(&file.directory, &file.prefix),
    }
}

/// Event formatter adding the service name and request id
#[derive(Debug, Clone)]
pub struct ServiceFormat {
    service: String,
    format: LogFormat,
}

impl ServiceFormat {
    pub fn new(service: impl Into<String>, format: LogFormat) -> Self {
        Self {
            service: service.into(),
            format,
        }
    }
}

impl<S, N> FormatEvent<S, N> for ServiceFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let mut fields = FieldCollector::default();
        event.record(&mut fields);
        let request_id = current_request_id();

        match self.format {
            LogFormat::Json => {
                let mut record = Map::new();
                record.insert(
                    "timestamp".to_string(),
                    Value::String(
                        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                    ),
                );
                record.insert("level".to_string(), Value::String(metadata.level().to_string()));
                record.insert("service".to_string(), Value::String(self.service.clone()));
                record.insert(
                    "request_id".to_string(),
                    request_id.map_or(Value::Null, Value::String),
                );
                record.insert("target".to_string(), Value::String(metadata.target().to_string()));
                record.insert("message".to_string(), Value::String(fields.message));
                record.insert("fields".to_string(), Value::Object(fields.values));
                record.insert(
                    "file".to_string(),
                    metadata.file().map_or(Value::Null, |file| Value::String(file.to_string())),
                );
                record.insert(
                    "line".to_string(),
                    metadata.line().map_or(Value::Null, Value::from),
                );
                writeln!(writer, "{}", Value::Object(record))
            }
            LogFormat::Text => {
                let thread = std::thread::current();
                write!(
                    writer,
                    "{} | {} | {} | {} | {} | {}: {}",
                    chrono::Local::now().format("%Y%m%d %H:%M:%S"),
                    self.service,
                    request_id.as_deref().unwrap_or(NO_REQUEST_ID),
                    thread.name().unwrap_or("unnamed"),
                    metadata.target(),
                    metadata.level(),
                    fields.message,
                )?;
                for (name, value) in &fields.values {
                    match value {
                        Value::String(text) => write!(writer, " {}={}", name, text)?,
                        other => write!(writer, " {}={}", name, other)?,
                    }
                }
                writeln!(
                    writer,
                    " | {}:{}",
                    metadata.file().unwrap_or("?"),
                    metadata.line().unwrap_or(0)
                )
            }
        }
    }
}

/// Splits the message from the structured fields of an event
#[derive(Debug, Default)]
struct FieldCollector {
    message: String,
    values: Map<String, Value>,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            match value {
                Value::String(text) => self.message = text,
                other => self.message = other.to_string(),
            }
        } else {
            self.values.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldCollector {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let mut text = String::new();
        let _ = write!(text, "{:?}", value);
        self.insert(field, Value::String(text));
    }
}
