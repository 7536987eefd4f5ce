use crate::error::{Error, Result, provider_message};
use crate::transport::{HttpRequest, RawResponse, Transport};
use crate::util::redacted_query;

const STATUS_OK: u16 = 200;
const STATUS_TOO_MANY_REQUESTS: u16 = 429;
const STATUS_BAD_GATEWAY: u16 = 502;

/// Diagnostics for one logical call, updated across its retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallAttempt {
    pub uri: String,
    /// Query string in send order with the API key masked.
    pub query: String,
    pub attempts: u32,
    pub last_status: Option<u16>,
}

impl CallAttempt {
    pub fn new(request: &HttpRequest) -> Self {
        Self {
            uri: request.url.clone(),
            query: redacted_query(&request.query),
            attempts: 0,
            last_status: None,
        }
    }

    /// Full URI with the redacted query string, safe to log.
    pub fn display_uri(&self) -> String {
        if self.query.is_empty() {
            self.uri.clone()
        } else {
            format!("{}?{}", self.uri, self.query)
        }
    }
}

/// The provider signals throttling with a bad gateway, and sometimes 429.
fn is_throttled(status: u16) -> bool {
    matches!(status, STATUS_BAD_GATEWAY | STATUS_TOO_MANY_REQUESTS)
}

/// Sends GET requests with bounded, immediate retries.
#[derive(Debug, Clone)]
pub struct CallEngine<T> {
    transport: T,
    max_retries: u32,
}

impl<T: Transport> CallEngine<T> {
    pub fn new(transport: T, max_retries: u32) -> Self {
        Self {
            transport,
            max_retries: max_retries.max(1),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs `request`, recording progress into `attempt`.
    ///
    /// A 200 response is returned as soon as it arrives, on any attempt.
    /// Connection/timeout failures and throttling statuses are retried up to
    /// `max_retries` attempts in total; any other status fails immediately.
    pub fn call(&self, request: &HttpRequest, attempt: &mut CallAttempt) -> Result<RawResponse> {
        let max = self.max_retries;
        attempt.attempts = 0;
        attempt.last_status = None;

        loop {
            attempt.attempts += 1;
            let n = attempt.attempts;
            let is_final = n >= max;

            match self.transport.get(request) {
                Err(failure) => {
                    log::warn!("{}/{} GET {}: {}", n, max, attempt.display_uri(), failure);
                    if is_final || !failure.is_retriable() {
                        let err = Error::Transport {
                            uri: attempt.display_uri(),
                            source: failure,
                        };
                        log::error!("{err}");
                        return Err(err);
                    }
                }
                Ok(resp) => {
                    attempt.last_status = Some(resp.status);
                    if resp.status == STATUS_OK {
                        log::debug!("{}/{} GET {}: HTTP 200", n, max, attempt.display_uri());
                        return Ok(resp);
                    }

                    if is_throttled(resp.status) {
                        if is_final {
                            let err = Error::AccessLimitation {
                                uri: attempt.display_uri(),
                                status: resp.status,
                            };
                            log::error!("{err}");
                            return Err(err);
                        }
                        log::warn!(
                            "{}/{} GET {}: HTTP {}",
                            n,
                            max,
                            attempt.display_uri(),
                            resp.status
                        );
                        continue;
                    }

                    let err = Error::HttpStatus {
                        uri: attempt.display_uri(),
                        status: resp.status,
                        message: provider_message(&resp.body),
                    };
                    log::error!("{err}");
                    return Err(err);
                }
            }
        }
    }
}
