use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{CONTENT_LENGTH, HeaderMap, HeaderValue, USER_AGENT};
use std::fmt;
use std::io::Read;
use std::time::Duration;

/// One outbound GET as the call engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    /// Query parameters in the order they must be sent.
    pub query: Vec<(String, String)>,
    /// Large bodies (the bulk city list) are read incrementally.
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connect,
    Timeout,
    /// Anything else: request building, body decoding, redirect loops.
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Connect => "connection error",
            FailureKind::Timeout => "timeout",
            FailureKind::Other => "request error",
        })
    }
}

/// A request that produced no HTTP response.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {source}")]
pub struct TransportFailure {
    pub kind: FailureKind,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportFailure {
    pub fn new(
        kind: FailureKind,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    /// Connection and timeout failures are worth another attempt.
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, FailureKind::Connect | FailureKind::Timeout)
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_connect() || err.is_request() {
            FailureKind::Connect
        } else {
            FailureKind::Other
        };
        Self::new(kind, err)
    }
}

/// Sends a single blocking GET. Implementations must not retry on their own.
pub trait Transport {
    fn get(&self, request: &HttpRequest) -> Result<RawResponse, TransportFailure>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, request: &HttpRequest) -> Result<RawResponse, TransportFailure> {
        (**self).get(request)
    }
}

/// `reqwest` backed transport used by default.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
    progress: bool,
}

impl HttpTransport {
    pub fn new(timeout: Duration, progress: bool) -> Result<Self, TransportFailure> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!(
                "openweathermap-client-rs/{}",
                env!("CARGO_PKG_VERSION")
            ))
            .unwrap_or(HeaderValue::from_static("openweathermap-client-rs")),
        );

        let http = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportFailure::new(FailureKind::Other, e))?;

        Ok(Self { http, progress })
    }

    fn read_streamed(
        &self,
        mut resp: reqwest::blocking::Response,
    ) -> Result<Vec<u8>, TransportFailure> {
        let total = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let pb = if self.progress {
            let pb = ProgressBar::new(total.unwrap_or(0));
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} {bytes}/{total_bytes} ({bytes_per_sec}) {wide_bar} {eta}",
            ) {
                pb.set_style(style.progress_chars("=>-"));
            }
            Some(pb)
        } else {
            None
        };

        read_body(&mut resp, total, pb.as_ref())
    }
}

/// Upper bound on what an advertised `Content-Length` may pre-allocate.
const MAX_PREALLOCATION: u64 = 64 << 20;

/// Reads `reader` to the end in 64 KiB chunks. `total` is only a hint.
fn read_body(
    reader: &mut impl Read,
    total: Option<u64>,
    pb: Option<&ProgressBar>,
) -> Result<Vec<u8>, TransportFailure> {
    let capacity = total.map_or(0, |t| t.min(MAX_PREALLOCATION)) as usize;
    let mut body = Vec::with_capacity(capacity);
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let kind = if e.kind() == std::io::ErrorKind::TimedOut {
                    FailureKind::Timeout
                } else {
                    FailureKind::Connect
                };
                if let Some(pb) = pb {
                    pb.abandon();
                }
                return Err(TransportFailure::new(kind, e));
            }
        };
        body.extend_from_slice(&buf[..n]);
        if let Some(pb) = pb {
            pb.inc(n as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    Ok(body)
}

impl Transport for HttpTransport {
    fn get(&self, request: &HttpRequest) -> Result<RawResponse, TransportFailure> {
        let resp = self.http.get(&request.url).query(&request.query).send()?;
        let status = resp.status().as_u16();
        let body = if request.stream {
            self.read_streamed(resp)?
        } else {
            resp.bytes()?.to_vec()
        };
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io;

    #[derive(Debug)]
    pub(crate) enum Step {
        Respond(u16, Vec<u8>),
        Fail(FailureKind),
    }

    /// Plays back scripted outcomes and records every request it receives.
    /// The last step repeats once the script runs out.
    #[derive(Debug)]
    pub(crate) struct ScriptedTransport {
        steps: RefCell<VecDeque<Step>>,
        last: RefCell<Option<Step>>,
        pub(crate) requests: RefCell<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: RefCell::new(steps.into()),
                last: RefCell::new(None),
                requests: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn ok_json(body: &str) -> Self {
            Self::new(vec![Step::Respond(200, body.as_bytes().to_vec())])
        }

        pub(crate) fn calls(&self) -> usize {
            self.requests.borrow().len()
        }

        pub(crate) fn last_request(&self) -> Option<HttpRequest> {
            self.requests.borrow().last().cloned()
        }
    }

    fn replay(step: &Step) -> Result<RawResponse, TransportFailure> {
        match step {
            Step::Respond(status, body) => Ok(RawResponse {
                status: *status,
                body: body.clone(),
            }),
            Step::Fail(kind) => Err(TransportFailure::new(
                *kind,
                io::Error::new(io::ErrorKind::ConnectionRefused, "scripted failure"),
            )),
        }
    }

    impl Transport for ScriptedTransport {
        fn get(&self, request: &HttpRequest) -> Result<RawResponse, TransportFailure> {
            self.requests.borrow_mut().push(request.clone());
            if let Some(step) = self.steps.borrow_mut().pop_front() {
                let out = replay(&step);
                *self.last.borrow_mut() = Some(step);
                return out;
            }
            match self.last.borrow().as_ref() {
                Some(step) => replay(step),
                None => Err(TransportFailure::new(
                    FailureKind::Other,
                    io::Error::other("empty script"),
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn only_connect_and_timeout_are_retriable() {
        let failure = |kind| TransportFailure::new(kind, io::Error::other("x"));
        assert!(failure(FailureKind::Connect).is_retriable());
        assert!(failure(FailureKind::Timeout).is_retriable());
        assert!(!failure(FailureKind::Other).is_retriable());
    }

    #[test]
    fn failure_display_names_the_kind() {
        let f = TransportFailure::new(FailureKind::Timeout, io::Error::other("read timed out"));
        assert_eq!(f.to_string(), "timeout: read timed out");
    }

    #[test]
    fn advertised_length_does_not_drive_allocation() {
        let mut reader = io::Cursor::new(b"[]".to_vec());
        let body = read_body(&mut reader, Some(9_000_000_000_000_000_000), None).unwrap();
        assert_eq!(body, b"[]");
        assert!(body.capacity() <= MAX_PREALLOCATION as usize);
    }

    #[test]
    fn body_is_read_past_a_short_length_hint() {
        let data = vec![7u8; 200 * 1024];
        let mut reader = io::Cursor::new(data.clone());
        let pb = ProgressBar::hidden();
        let body = read_body(&mut reader, Some(10), Some(&pb)).unwrap();
        assert_eq!(body, data);
        assert_eq!(pb.position(), data.len() as u64);
    }

    #[test]
    fn read_timeout_is_classified() {
        struct Stalled;
        impl Read for Stalled {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"))
            }
        }
        let err = read_body(&mut Stalled, None, None).unwrap_err();
        assert_eq!(err.kind, FailureKind::Timeout);
        assert!(err.is_retriable());
    }

    #[test]
    fn http_transport_builds() {
        assert!(HttpTransport::new(Duration::from_secs(5), false).is_ok());
    }
}
