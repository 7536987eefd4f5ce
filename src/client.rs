use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::time::Duration;

use crate::config::load_config;
use crate::download::decode_gzip_json;
use crate::engine::{CallAttempt, CallEngine};
use crate::error::{Error, Result, ValidationError, embedded_error};
use crate::model::{
    CarbonMonoxide, City, CurrentWeather, CurrentWeatherSearch, Forecast, NitrogenDioxide, Ozone,
    SulfurDioxide, UvIndex,
};
use crate::registry::{self, SERVICES, ServiceDescriptor};
use crate::schema;
use crate::transport::{HttpRequest, HttpTransport, RawResponse, Transport};
use crate::util::{CREDENTIAL_PARAM, REDACTED, format_coordinate, urljoin};

pub const DEFAULT_HOST: &str = "api.openweathermap.org";
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// Air pollution alias for the latest available data point.
pub const CURRENT: &str = "current";

/// Each id is billed as one call by the provider.
pub const MAX_GROUP_IDS: usize = 20;
const DEFAULT_CIRCLE_CNT: i64 = 10;
const MAX_CIRCLE_CNT: i64 = 50;

/// Ordered query parameters.
pub type QueryParams = Vec<(String, String)>;

fn param(key: &str, value: impl ToString) -> (String, String) {
    (key.to_string(), value.to_string())
}

/// Unit format applied by the provider to temperatures and speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    /// Kelvin, meter/sec.
    Standard,
    /// Celsius, meter/sec.
    #[default]
    Metric,
    /// Fahrenheit, miles/hour.
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Standard => "standard",
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "standard" => Ok(UnitSystem::Standard),
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(invalid_argument(format!(
                "Invalid units: {value}. Expected are: standard/metric/imperial."
            ))),
        }
    }
}

#[derive(Clone)]
pub struct ClientConfig {
    api_key: Option<String>,
    host: String,
    use_ssl: bool,
    max_retries: u32,
    units: UnitSystem,
    timeout: Duration,
    progress: bool,
}

impl ClientConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            host: DEFAULT_HOST.to_string(),
            use_ssl: true,
            max_retries: DEFAULT_MAX_RETRIES,
            units: UnitSystem::default(),
            timeout: Duration::from_secs(60),
            progress: false,
        }
    }

    /// An empty host keeps the default one.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into();
        self.host = if host.trim().is_empty() {
            DEFAULT_HOST.to_string()
        } else {
            host
        };
        self
    }

    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    /// Total attempts per call. Zero falls back to [`DEFAULT_MAX_RETRIES`].
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = if max_retries == 0 {
            DEFAULT_MAX_RETRIES
        } else {
            max_retries
        };
        self
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    /// Per-attempt timeout of the default transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shows a progress bar while downloading the bulk city list.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn use_ssl(&self) -> bool {
        self.use_ssl
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn base_uri(&self) -> String {
        format!(
            "http{}://{}",
            if self.use_ssl { "s" } else { "" },
            self.host
        )
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .field("host", &self.host)
            .field("use_ssl", &self.use_ssl)
            .field("max_retries", &self.max_retries)
            .field("units", &self.units)
            .field("timeout", &self.timeout)
            .field("progress", &self.progress)
            .finish()
    }
}

/// A decoded response with the diagnostics of the call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<D> {
    pub data: D,
    pub call: CallAttempt,
}

/// Blocking OpenWeatherMap API client.
///
/// The last call snapshot lives in a `RefCell`, so a `Client` is not `Sync`;
/// callers sharing one across threads must synchronize access themselves.
#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport> {
    config: ClientConfig,
    base_uri: String,
    engine: CallEngine<T>,
    last_call: RefCell<Option<CallAttempt>>,
}

impl Client<HttpTransport> {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(Some(api_key.into())))
    }

    /// Creates a client using (in order of precedence):
    /// - environment variables `OWM_API_KEY` / `OWM_HOST` / `OWM_UNITS`
    /// - config file from `OWM_RC` or `.owmrc` (current directory, then home)
    pub fn from_env() -> Result<Self> {
        Self::with_config(load_config(None)?)
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        check_api_key(&config)?;
        let transport =
            HttpTransport::new(config.timeout, config.progress).map_err(|source| {
                let err = Error::Transport {
                    uri: config.base_uri(),
                    source,
                };
                log::error!("{err}");
                err
            })?;
        Self::with_transport(config, transport)
    }
}

fn check_api_key(config: &ClientConfig) -> Result<()> {
    match config.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(()),
        _ => {
            let err = Error::MissingCredential;
            log::error!("{err}");
            Err(err)
        }
    }
}

fn invalid_argument(message: String) -> Error {
    let err = Error::InvalidArgument(message);
    log::warn!("{err}");
    err
}

fn decode<R: DeserializeOwned>(data: Value) -> Result<R> {
    serde_json::from_value(data).map_err(|e| {
        let mut violations = ValidationError::default();
        violations.push("", e.to_string());
        log::error!("{violations}");
        Error::Validation(violations)
    })
}

fn checked_search_type(search_type: Option<&str>) -> Result<Option<&str>> {
    match search_type {
        None | Some("like") | Some("accurate") => Ok(search_type),
        Some(other) => Err(invalid_argument(format!(
            "Invalid search_type: {other}. Expected are: None/like/accurate."
        ))),
    }
}

fn checked_cluster(cluster: Option<&str>) -> Result<Option<&str>> {
    match cluster {
        None | Some("yes") | Some("no") => Ok(cluster),
        Some(other) => Err(invalid_argument(format!(
            "Invalid cluster: {other}. Expected are: None/yes/no."
        ))),
    }
}

pub(crate) fn city_name_params(
    city_name: &str,
    country_code: Option<&str>,
    search_type: Option<&str>,
) -> Result<QueryParams> {
    let search_type = checked_search_type(search_type)?;
    let q = match country_code {
        Some(cc) => format!("{city_name},{cc}"),
        None => city_name.to_string(),
    };
    let mut params = vec![param("q", q)];
    if let Some(t) = search_type {
        params.push(param("type", t));
    }
    Ok(params)
}

/// `bbox` is `[left lon, bottom lat, right lon, top lat]`.
pub(crate) fn box_params(
    bbox: &[f64],
    zoom: u32,
    cluster: Option<&str>,
    lang: Option<&str>,
) -> Result<QueryParams> {
    if bbox.len() != 4 {
        return Err(invalid_argument(format!(
            "Invalid box: {bbox:?}. Expected 4 coordinates."
        )));
    }
    let cluster = checked_cluster(cluster)?;

    let mut coords: Vec<String> = bbox.iter().copied().map(format_coordinate).collect();
    coords.push(zoom.to_string());
    let mut params = vec![param("bbox", coords.join(","))];
    if let Some(c) = cluster {
        params.push(param("cluster", c));
    }
    if let Some(l) = lang {
        params.push(param("lang", l));
    }
    Ok(params)
}

pub(crate) fn circle_params(
    latitude: f64,
    longitude: f64,
    cluster: Option<&str>,
    cnt: Option<i64>,
    lang: Option<&str>,
) -> Result<QueryParams> {
    let cluster = checked_cluster(cluster)?;
    let cnt = cnt.unwrap_or(DEFAULT_CIRCLE_CNT).clamp(0, MAX_CIRCLE_CNT);

    let mut params = vec![
        param("lat", format_coordinate(latitude)),
        param("lon", format_coordinate(longitude)),
        param("cnt", cnt),
    ];
    if let Some(c) = cluster {
        params.push(param("cluster", c));
    }
    if let Some(l) = lang {
        params.push(param("lang", l));
    }
    Ok(params)
}

pub(crate) fn group_params(city_ids: &[u64]) -> Result<QueryParams> {
    if city_ids.len() > MAX_GROUP_IDS {
        return Err(invalid_argument(format!(
            "The limit of locations is {MAX_GROUP_IDS}, got {}.",
            city_ids.len()
        )));
    }
    let ids: Vec<String> = city_ids.iter().map(u64::to_string).collect();
    Ok(vec![param("id", ids.join(","))])
}

fn coord_params(latitude: f64, longitude: f64) -> QueryParams {
    vec![
        param("lat", format_coordinate(latitude)),
        param("lon", format_coordinate(longitude)),
    ]
}

fn pollution_extra_uri(latitude: f64, longitude: f64, datetime: Option<&str>) -> String {
    format!(
        "{},{}/{}.json",
        format_coordinate(latitude),
        format_coordinate(longitude),
        datetime.unwrap_or(CURRENT)
    )
}

impl<T: Transport> Client<T> {
    /// Creates a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        check_api_key(&config)?;
        let base_uri = config.base_uri();
        let engine = CallEngine::new(transport, config.max_retries);
        log::debug!("OpenWeatherMap API client initialized. Host: {}", config.host);
        Ok(Self {
            config,
            base_uri,
            engine,
            last_call: RefCell::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn transport(&self) -> &T {
        self.engine.transport()
    }

    /// Services (implemented calls of API endpoints).
    pub fn available_services(&self) -> &'static [ServiceDescriptor] {
        SERVICES
    }

    /// Diagnostics of the most recent call, if any was sent.
    pub fn last_call(&self) -> Option<CallAttempt> {
        self.last_call.borrow().clone()
    }

    /// Redacted URI of the most recent call.
    pub fn last_uri_call(&self) -> Option<String> {
        self.last_call.borrow().as_ref().map(CallAttempt::display_uri)
    }

    pub fn last_call_attempts(&self) -> u32 {
        self.last_call.borrow().as_ref().map_or(0, |c| c.attempts)
    }

    fn send(&self, request: HttpRequest) -> Result<(RawResponse, CallAttempt)> {
        let mut attempt = CallAttempt::new(&request);
        let out = self.engine.call(&request, &mut attempt);
        *self.last_call.borrow_mut() = Some(attempt.clone());
        out.map(|resp| (resp, attempt))
    }

    /// Calls a registered service and maps its response through the
    /// service schema. `extra_uri` is joined onto the service path.
    pub fn get_data(
        &self,
        service_name: &str,
        extra_uri: Option<&str>,
        params: QueryParams,
    ) -> Result<Fetched<Value>> {
        let service = registry::require(service_name)?;

        let mut uri = urljoin(&self.base_uri, service.path);
        if let Some(extra) = extra_uri {
            uri = urljoin(&uri, extra);
        }

        let mut query = params;
        query.push(param(CREDENTIAL_PARAM, self.config.api_key().unwrap_or_default()));
        if service.sends_units {
            query.push(param("units", self.config.units));
        }

        let (resp, call) = self.send(HttpRequest {
            url: uri,
            query,
            stream: false,
        })?;

        let raw: Value = serde_json::from_slice(&resp.body).map_err(|source| {
            let err = Error::Json {
                uri: call.display_uri(),
                source,
            };
            log::error!("{err}");
            err
        })?;

        if let Some(message) = embedded_error(&raw) {
            let err = Error::Application {
                uri: call.display_uri(),
                message,
            };
            log::error!("{err}");
            return Err(err);
        }

        let data = deserialize(service, &raw)?;
        Ok(Fetched { data, call })
    }

    fn fetch<R: DeserializeOwned>(
        &self,
        service_name: &str,
        extra_uri: Option<&str>,
        params: QueryParams,
    ) -> Result<R> {
        decode(self.get_data(service_name, extra_uri, params)?.data)
    }

    /// Retrieves every city known to the provider (ids, names, coordinates)
    /// from the gzip-compressed bulk file.
    pub fn get_city_list(&self) -> Result<Vec<City>> {
        let service = registry::require("city_list")?;
        let raw = self.get_city_list_raw()?;
        decode(deserialize(service, &raw)?)
    }

    /// Same as [`Client::get_city_list`] without schema mapping: the JSON is
    /// returned exactly as in the source file (`coord.lat`, `coord.lon`).
    /// Much faster on the full list.
    pub fn get_city_list_raw(&self) -> Result<Value> {
        let service = registry::require("city_list")?;
        let (resp, call) = self.send(HttpRequest {
            url: urljoin(&self.base_uri, service.path),
            query: Vec::new(),
            stream: true,
        })?;
        decode_gzip_json(&resp.body, &call.display_uri())
    }

    /// 5 day / 3 hour forecast by city id.
    pub fn get_forecast_by_city_id(&self, city_id: u64) -> Result<Forecast> {
        self.fetch("forecast_5d", None, vec![param("id", city_id)])
    }

    pub fn get_forecast_by_coord(&self, latitude: f64, longitude: f64) -> Result<Forecast> {
        self.fetch("forecast_5d", None, coord_params(latitude, longitude))
    }

    /// `search_type` is `None`, `like` (close names) or `accurate` (exact).
    pub fn get_forecast_by_city_name(
        &self,
        city_name: &str,
        country_code: Option<&str>,
        search_type: Option<&str>,
    ) -> Result<Forecast> {
        let params = city_name_params(city_name, country_code, search_type)?;
        self.fetch("forecast_5d", None, params)
    }

    pub fn get_forecast_by_zip_code(&self, zip_code: &str, country_code: &str) -> Result<Forecast> {
        let params = vec![param("zip", format!("{zip_code},{country_code}"))];
        self.fetch("forecast_5d", None, params)
    }

    pub fn get_current_weather_by_city_id(&self, city_id: u64) -> Result<CurrentWeather> {
        self.fetch("current_weather", None, vec![param("id", city_id)])
    }

    pub fn get_current_weather_by_coord(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentWeather> {
        self.fetch("current_weather", None, coord_params(latitude, longitude))
    }

    pub fn get_current_weather_by_city_name(
        &self,
        city_name: &str,
        country_code: Option<&str>,
        search_type: Option<&str>,
    ) -> Result<CurrentWeather> {
        let params = city_name_params(city_name, country_code, search_type)?;
        self.fetch("current_weather", None, params)
    }

    pub fn get_current_weather_by_zip_code(
        &self,
        zip_code: &str,
        country_code: &str,
    ) -> Result<CurrentWeather> {
        let params = vec![param("zip", format!("{zip_code},{country_code}"))];
        self.fetch("current_weather", None, params)
    }

    /// Current weather for the cities inside a rectangle
    /// `[left lon, bottom lat, right lon, top lat]` at map `zoom`.
    /// `cluster` is `None`, `yes` or `no`.
    pub fn get_current_weather_within_box(
        &self,
        bbox: &[f64],
        zoom: u32,
        cluster: Option<&str>,
        lang: Option<&str>,
    ) -> Result<CurrentWeatherSearch> {
        let params = box_params(bbox, zoom, cluster, lang)?;
        self.fetch("current_weather_box", None, params)
    }

    /// Current weather for up to `cnt` cities (default 10, clamped to 0..=50)
    /// around a center point.
    pub fn get_current_weather_within_circle(
        &self,
        latitude: f64,
        longitude: f64,
        cluster: Option<&str>,
        cnt: Option<i64>,
        lang: Option<&str>,
    ) -> Result<CurrentWeatherSearch> {
        let params = circle_params(latitude, longitude, cluster, cnt, lang)?;
        self.fetch("current_weather_circle", None, params)
    }

    /// Current weather for at most [`MAX_GROUP_IDS`] city ids.
    pub fn get_current_weather_group(&self, city_ids: &[u64]) -> Result<CurrentWeatherSearch> {
        let params = group_params(city_ids)?;
        self.fetch("current_weather_group", None, params)
    }

    /// Carbon monoxide profile.
    ///
    /// `datetime` is an ISO 8601 UTC date at any precision (`2016-01-02T15:04Z`,
    /// `2016-01-02Z`, `2016Z`, ...) selecting the latest data point inside that
    /// period, or `None` for [`CURRENT`]. More decimals on the coordinates
    /// narrow the search distance (none: ~78 km, 2 digits: ~786 m).
    pub fn get_air_pollution_carbon_monoxide(
        &self,
        latitude: f64,
        longitude: f64,
        datetime: Option<&str>,
    ) -> Result<CarbonMonoxide> {
        let extra = pollution_extra_uri(latitude, longitude, datetime);
        self.fetch("air_pollution_carbon_monoxide", Some(&extra), Vec::new())
    }

    pub fn get_air_pollution_ozone(
        &self,
        latitude: f64,
        longitude: f64,
        datetime: Option<&str>,
    ) -> Result<Ozone> {
        let extra = pollution_extra_uri(latitude, longitude, datetime);
        self.fetch("air_pollution_ozone", Some(&extra), Vec::new())
    }

    pub fn get_air_pollution_sulfur_dioxide(
        &self,
        latitude: f64,
        longitude: f64,
        datetime: Option<&str>,
    ) -> Result<SulfurDioxide> {
        let extra = pollution_extra_uri(latitude, longitude, datetime);
        self.fetch("air_pollution_sulfur_dioxide", Some(&extra), Vec::new())
    }

    pub fn get_air_pollution_nitrogen_dioxide(
        &self,
        latitude: f64,
        longitude: f64,
        datetime: Option<&str>,
    ) -> Result<NitrogenDioxide> {
        let extra = pollution_extra_uri(latitude, longitude, datetime);
        self.fetch("air_pollution_nitrogen_dioxide", Some(&extra), Vec::new())
    }

    // The UV endpoints want `lat` then `lon` (then `start`, `end`), in that order.

    pub fn get_uv_index_current(&self, latitude: f64, longitude: f64) -> Result<UvIndex> {
        self.fetch("uv_index_current", None, coord_params(latitude, longitude))
    }

    pub fn get_uv_index_forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<UvIndex>> {
        self.fetch("uv_index_forecast", None, coord_params(latitude, longitude))
    }

    pub fn get_uv_index_historical(
        &self,
        latitude: f64,
        longitude: f64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UvIndex>> {
        let mut params = coord_params(latitude, longitude);
        params.push(param("start", start.timestamp()));
        params.push(param("end", end.timestamp()));
        self.fetch("uv_index_historical", None, params)
    }
}

fn deserialize(service: &ServiceDescriptor, raw: &Value) -> Result<Value> {
    schema::deserialize(service.schema, service.shape, raw).map_err(|violations| {
        log::error!("{} response: {violations}", service.name);
        Error::Validation(violations)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::gzip;
    use crate::transport::testing::{ScriptedTransport, Step};

    const KEY: &str = "ae0c16c7a7c591f9d88e50954c9b2c0b";

    fn client(transport: ScriptedTransport) -> Client<ScriptedTransport> {
        Client::with_transport(ClientConfig::new(Some(KEY.into())), transport).unwrap()
    }

    fn query_keys(req: &HttpRequest) -> Vec<&str> {
        req.query.iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn config_defaults() {
        let cfg = ClientConfig::new(Some(KEY.into()));
        assert_eq!(cfg.host(), DEFAULT_HOST);
        assert_eq!(cfg.max_retries(), DEFAULT_MAX_RETRIES);
        assert_eq!(cfg.units(), UnitSystem::Metric);
        assert_eq!(cfg.base_uri(), "https://api.openweathermap.org");

        let cfg = cfg
            .with_ssl(false)
            .with_max_retries(3)
            .with_units(UnitSystem::Standard)
            .with_host("samples.openweathermap.org");
        assert_eq!(cfg.max_retries(), 3);
        assert_eq!(cfg.base_uri(), "http://samples.openweathermap.org");
        assert_eq!(cfg.units().as_str(), "standard");
    }

    #[test]
    fn zero_retries_and_empty_host_fall_back_to_defaults() {
        let cfg = ClientConfig::new(Some(KEY.into())).with_max_retries(0).with_host("");
        assert_eq!(cfg.max_retries(), DEFAULT_MAX_RETRIES);
        assert_eq!(cfg.host(), DEFAULT_HOST);
    }

    #[test]
    fn config_debug_hides_the_key() {
        let dbg = format!("{:?}", ClientConfig::new(Some(KEY.into())));
        assert!(!dbg.contains(KEY));
        assert!(dbg.contains("***"));
    }

    #[test]
    fn missing_or_blank_key_is_rejected() {
        let err = Client::with_transport(ClientConfig::new(None), ScriptedTransport::new(vec![]))
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential));

        let err = Client::with_transport(
            ClientConfig::new(Some("  ".into())),
            ScriptedTransport::new(vec![]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }

    #[test]
    fn unit_system_parsing() {
        assert_eq!(UnitSystem::try_from("Imperial").unwrap(), UnitSystem::Imperial);
        assert!(matches!(
            UnitSystem::try_from("kelvin"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn city_name_query() {
        let params = city_name_params("Montcuq", Some("FR"), Some("like")).unwrap();
        assert_eq!(params, vec![param("q", "Montcuq,FR"), param("type", "like")]);
        let params = city_name_params("Montcuq", None, None).unwrap();
        assert_eq!(params, vec![param("q", "Montcuq")]);
        assert!(city_name_params("Montcuq", None, Some("exact")).is_err());
    }

    #[test]
    fn box_query() {
        let params = box_params(&[12.0, 32.0, 15.0, 37.0], 10, Some("yes"), Some("fr")).unwrap();
        assert_eq!(
            params,
            vec![
                param("bbox", "12.0,32.0,15.0,37.0,10"),
                param("cluster", "yes"),
                param("lang", "fr")
            ]
        );
        assert!(box_params(&[1.0, 2.0, 3.0], 10, None, None).is_err());
        assert!(box_params(&[1.0, 2.0, 3.0, 4.0], 10, Some("maybe"), None).is_err());
    }

    #[test]
    fn circle_cnt_is_clamped() {
        let cnt = |c| {
            circle_params(1.0, 2.0, None, c, None).unwrap()[2].1.clone()
        };
        assert_eq!(cnt(Some(-5)), "0");
        assert_eq!(cnt(Some(1000)), "50");
        assert_eq!(cnt(Some(25)), "25");
        assert_eq!(cnt(None), "10");
    }

    #[test]
    fn group_limit() {
        let ids: Vec<u64> = (1..=20).collect();
        assert_eq!(group_params(&ids).unwrap()[0].1.split(',').count(), 20);
        let ids: Vec<u64> = (1..=21).collect();
        assert!(matches!(group_params(&ids), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn forecast_request_carries_credentials_and_units() {
        let c = client(ScriptedTransport::ok_json(r#"{"cnt": 0, "list": []}"#));
        let forecast = c.get_forecast_by_city_id(6434841).unwrap();
        assert_eq!(forecast.cnt, Some(0));

        let req = c.transport().last_request().unwrap();
        assert_eq!(req.url, "https://api.openweathermap.org/data/2.5/forecast");
        assert_eq!(query_keys(&req), vec!["id", "appid", "units"]);
        assert_eq!(req.query[1].1, KEY);
        assert!(!req.stream);

        let last = c.last_uri_call().unwrap();
        assert_eq!(
            last,
            "https://api.openweathermap.org/data/2.5/forecast?id=6434841&appid=***&units=metric"
        );
        assert_eq!(c.last_call_attempts(), 1);
    }

    #[test]
    fn zip_lookups_send_zip_and_country() {
        let forecast = r#"{"cnt": 0, "list": []}"#;
        let c = client(ScriptedTransport::ok_json(forecast));
        c.get_forecast_by_zip_code("94040", "US").unwrap();
        let req = c.transport().last_request().unwrap();
        assert!(req.url.ends_with("/data/2.5/forecast"));
        assert_eq!(query_keys(&req), vec!["zip", "appid", "units"]);
        assert_eq!(req.query[0].1, "94040,US");

        let weather = r#"{"id": 5375480, "name": "Mountain View", "dt": 1485789600}"#;
        let c = client(ScriptedTransport::ok_json(weather));
        let current = c.get_current_weather_by_zip_code("94040", "US").unwrap();
        assert_eq!(current.dt_timestamp, Some(1485789600));
        let req = c.transport().last_request().unwrap();
        assert!(req.url.ends_with("/data/2.5/weather"));
        assert_eq!(query_keys(&req), vec!["zip", "appid", "units"]);
        assert_eq!(req.query[0].1, "94040,US");
    }

    #[test]
    fn coordinate_lookups_send_lat_and_lon() {
        let forecast = r#"{"cnt": 0, "list": []}"#;
        let c = client(ScriptedTransport::ok_json(forecast));
        c.get_forecast_by_coord(44.55, 1.3).unwrap();
        let req = c.transport().last_request().unwrap();
        assert!(req.url.ends_with("/data/2.5/forecast"));
        assert_eq!(
            req.query[..2],
            [param("lat", "44.55"), param("lon", "1.3")]
        );
        assert_eq!(query_keys(&req), vec!["lat", "lon", "appid", "units"]);

        let weather = r#"{"id": 2991772, "name": "Montcuq", "dt": 1485789600}"#;
        let c = client(ScriptedTransport::ok_json(weather));
        c.get_current_weather_by_coord(45.0, -1.0).unwrap();
        let req = c.transport().last_request().unwrap();
        assert!(req.url.ends_with("/data/2.5/weather"));
        assert_eq!(
            req.query[..2],
            [param("lat", "45.0"), param("lon", "-1.0")]
        );
        assert_eq!(query_keys(&req), vec!["lat", "lon", "appid", "units"]);
    }

    #[test]
    fn uv_historical_keeps_parameter_order_without_units() {
        let body = r#"[{"lat": 37.75, "lon": -122.37, "date_iso": "2017-06-22T12:00:00Z", "date": 1498132800, "value": 9.82}]"#;
        let c = client(ScriptedTransport::ok_json(body));
        let start = DateTime::from_timestamp(1498049953, 0).unwrap();
        let end = DateTime::from_timestamp(1498481991, 0).unwrap();
        let values = c.get_uv_index_historical(37.75, -122.37, start, end).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].dt_timestamp, Some(1498132800));

        let req = c.transport().last_request().unwrap();
        assert_eq!(req.url, "https://api.openweathermap.org/data/2.5/uvi/history");
        assert_eq!(query_keys(&req), vec!["lat", "lon", "start", "end", "appid"]);
        assert_eq!(req.query[2].1, "1498049953");
    }

    #[test]
    fn air_pollution_path_includes_location_and_time() {
        let body = r#"{"time": "2016-12-25T01:04:08Z", "location": {"latitude": 0.0, "longitude": 10.0}, "data": 277.5}"#;
        let c = client(ScriptedTransport::ok_json(body));
        let ozone = c.get_air_pollution_ozone(0.0, 10.0, None).unwrap();
        assert_eq!(ozone.data, Some(277.5));
        assert_eq!(ozone.time.timestamp(), 1482627848);

        let req = c.transport().last_request().unwrap();
        assert_eq!(req.url, "https://api.openweathermap.org/pollution/v1/o3/0.0,10.0/current.json");

        c.get_air_pollution_ozone(0.0, 10.0, Some("2016-12-25Z")).unwrap();
        let req = c.transport().last_request().unwrap();
        assert!(req.url.ends_with("/o3/0.0,10.0/2016-12-25Z.json"));
    }

    #[test]
    fn embedded_error_is_an_application_error() {
        let c = client(ScriptedTransport::ok_json(r#"{"error": "not found"}"#));
        let err = c.get_air_pollution_ozone(0.0, 10.0, None).unwrap_err();
        match err {
            Error::Application { message, uri } => {
                assert_eq!(message, "not found");
                assert!(uri.contains("appid=***"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_reported() {
        let c = client(ScriptedTransport::ok_json("<html></html>"));
        assert!(matches!(
            c.get_current_weather_by_city_id(1),
            Err(Error::Json { .. })
        ));
    }

    #[test]
    fn schema_violations_surface_as_validation_error() {
        let c = client(ScriptedTransport::ok_json(r#"{"dt": "later", "id": "x"}"#));
        match c.get_current_weather_by_city_id(1) {
            Err(Error::Validation(v)) => assert_eq!(v.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_arguments_send_nothing() {
        let c = client(ScriptedTransport::ok_json("{}"));
        assert!(c.get_current_weather_within_box(&[1.0], 10, None, None).is_err());
        assert!(c.get_forecast_by_city_name("Paris", None, Some("exact")).is_err());
        assert_eq!(c.transport().calls(), 0);
        assert!(c.last_call().is_none());
        assert_eq!(c.last_call_attempts(), 0);
    }

    #[test]
    fn unknown_service_is_rejected() {
        let c = client(ScriptedTransport::ok_json("{}"));
        assert!(matches!(
            c.get_data("weather_tomorrow", None, Vec::new()),
            Err(Error::UnknownService { .. })
        ));
    }

    #[test]
    fn get_data_returns_call_diagnostics() {
        let c = client(ScriptedTransport::new(vec![
            Step::Respond(502, Vec::new()),
            Step::Respond(200, br#"{"lat": 1.0, "lon": 2.0, "value": 3.5}"#.to_vec()),
        ]));
        let fetched = c
            .get_data("uv_index_current", None, coord_params(1.0, 2.0))
            .unwrap();
        assert_eq!(fetched.data["value"], serde_json::json!(3.5));
        assert_eq!(fetched.call.attempts, 2);
        assert_eq!(fetched.call.last_status, Some(200));
        assert_eq!(c.last_call(), Some(fetched.call));
    }

    #[test]
    fn city_list_is_streamed_and_decompressed() {
        let body = gzip(
            br#"[{"id": 707860, "name": "Hurzuf", "country": "UA", "coord": {"lon": 34.283333, "lat": 44.549999}}]"#,
        );
        let c = client(ScriptedTransport::new(vec![Step::Respond(200, body)]));

        let cities = c.get_city_list().unwrap();
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].id, 707860);
        assert_eq!(cities[0].coord.as_ref().unwrap().latitude, Some(44.549999));

        let req = c.transport().last_request().unwrap();
        assert_eq!(req.url, "http://bulk.openweathermap.org/sample/city.list.json.gz");
        assert!(req.query.is_empty());
        assert!(req.stream);

        let raw = c.get_city_list_raw().unwrap();
        assert_eq!(raw[0]["coord"]["lat"], serde_json::json!(44.549999));
    }
}
