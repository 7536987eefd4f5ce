//! A blocking Rust client for the OpenWeatherMap API.
//!
//! Every call goes through the same flow: build the endpoint URL and ordered
//! query parameters, send a GET with bounded retries, then map the JSON
//! response through a declarative schema onto typed records.
//!
//! ## Quick start
//! - Pass an API key to [`Client::new`], or configure it via the `OWM_API_KEY`
//!   environment variable or a `.owmrc` file (current directory or home) and
//!   use [`Client::from_env`].
//! - Call one of the per-endpoint methods.
//!
//! ```no_run
//! use openweathermap_client::Client;
//!
//! fn main() -> Result<(), openweathermap_client::Error> {
//!     let client = Client::from_env()?;
//!     let weather = client.get_current_weather_by_city_name("Montcuq", Some("FR"), None)?;
//!     println!("{:?} at {}", weather.main.and_then(|m| m.temp), weather.dt_value);
//!     println!("last call: {:?}", client.last_uri_call());
//!     Ok(())
//! }
//! ```
//!
//! ## Retries and errors
//! Connection failures, timeouts and throttling statuses (502, 429) are retried
//! immediately up to `max_retries` attempts in total (5 by default). Any other
//! non-200 status fails at once with [`Error::HttpStatus`]. See [`Error`] for
//! the full taxonomy.
//!
//! The crate logs through the [`log`] facade and never installs a logger.

#![forbid(unsafe_code)]

mod client;
mod config;
mod download;
mod engine;
mod error;
pub mod model;
pub mod registry;
pub mod schema;
pub mod schemas;
mod transport;
mod util;

pub use client::{
    CURRENT, Client, ClientConfig, DEFAULT_HOST, DEFAULT_MAX_RETRIES, Fetched, MAX_GROUP_IDS,
    QueryParams, UnitSystem,
};
pub use engine::{CallAttempt, CallEngine};
pub use error::{Error, Result, ValidationError, Violation};
pub use registry::ServiceDescriptor;
pub use schema::Shape;
pub use transport::{
    FailureKind, HttpRequest, HttpTransport, RawResponse, Transport, TransportFailure,
};
pub use util::{datetime_from_iso8601, datetime_from_timestamp};
