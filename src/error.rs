use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

use crate::transport::TransportFailure;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client was built without an API key.
    #[error("OpenWeatherMap API key is not defined (set OWM_API_KEY or put `key:` in .owmrc)")]
    MissingCredential,

    /// An operation argument was rejected before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid service name: {name}. Available services are: {available}")]
    UnknownService { name: String, available: String },

    /// Connection or timeout failures exhausted the retries, or the request
    /// could not be sent at all.
    #[error("GET {uri} failed: {source}")]
    Transport {
        uri: String,
        #[source]
        source: TransportFailure,
    },

    /// The provider is throttling this API key.
    #[error(
        "GET {uri}: access limitation reached (HTTP {status}); the free plan only allows 60 API calls per minute"
    )]
    AccessLimitation { uri: String, status: u16 },

    #[error("GET {uri}: HTTP {status}{}", format_provider_message(.message))]
    HttpStatus {
        uri: String,
        status: u16,
        message: Option<String>,
    },

    /// A successful response whose body carries an `error` member.
    #[error("{message} on GET {uri}")]
    Application { uri: String, message: String },

    #[error("response validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("GET {uri}: response is not valid JSON: {source}")]
    Json {
        uri: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("GET {uri}: failed to decompress response: {source}")]
    Io {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read configuration file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_provider_message(message: &Option<String>) -> String {
    match message.as_deref() {
        Some(m) if !m.is_empty() => format!(": {m}"),
        _ => String::new(),
    }
}

/// One field that did not match the expected response shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON path of the offending field, e.g. `list[2].main.temp`.
    pub path: String,
    pub message: String,
}

/// Every violation found while mapping a response, not only the first one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub(crate) fn push(&mut self, path: &str, message: impl Into<String>) {
        self.violations.push(Violation {
            path: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.path, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Error payload sent by the provider alongside non-200 statuses,
/// e.g. `{"cod": 401, "message": "Invalid API key."}`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ProviderErrorBody {
    #[serde(default)]
    pub(crate) cod: Option<Value>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

pub(crate) fn provider_message(body: &[u8]) -> Option<String> {
    let parsed: ProviderErrorBody = serde_json::from_slice(body).ok()?;
    let message = parsed.message.filter(|m| !m.trim().is_empty())?;
    match parsed.cod {
        Some(Value::String(code)) => Some(format!("{message} (cod {code})")),
        Some(Value::Number(code)) => Some(format!("{message} (cod {code})")),
        _ => Some(message),
    }
}

/// Returns the message of an embedded `error` member, if the body has one.
pub(crate) fn embedded_error(data: &Value) -> Option<String> {
    let error = data.as_object()?.get("error")?;
    Some(match error {
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    })
}
