use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Coord {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: Option<String>,
    /// ISO 3166 country code (`FR`, `GB`, ...).
    pub country: Option<String>,
    pub coord: Option<Coord>,
}

/// Temperatures follow the client's unit system; pressures are in hPa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MainData {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    /// Percent.
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub sea_level: Option<f64>,
    pub grnd_level: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Wind {
    /// Degrees (meteorological).
    pub direction: Option<f64>,
    pub speed: Option<f64>,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WeatherCondition {
    pub id: Option<i64>,
    pub main: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Clouds {
    /// Cloudiness, percent.
    pub clouds_all: Option<i64>,
}

/// Precipitation volumes in mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Rain {
    pub rain_1h: Option<f64>,
    pub rain_3h: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Snow {
    pub snow_1h: Option<f64>,
    pub snow_3h: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub dt_value: DateTime<Utc>,
    pub dt_timestamp: Option<i64>,
    pub dt_txt: Option<String>,
    pub main: Option<MainData>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub clouds: Option<Clouds>,
    pub wind: Option<Wind>,
    pub rain: Option<Rain>,
    pub snow: Option<Snow>,
}

/// 5 day / 3 hour forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: Option<City>,
    pub cnt: Option<i64>,
    #[serde(default)]
    pub datas: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CurrentWeatherSys {
    pub country: Option<String>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub sunrise_timestamp: Option<i64>,
    pub sunset_timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city_id: Option<i64>,
    pub city_name: Option<String>,
    pub city_coord: Option<Coord>,
    pub dt_value: DateTime<Utc>,
    pub dt_timestamp: Option<i64>,
    pub main: Option<MainData>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub clouds: Option<Clouds>,
    pub wind: Option<Wind>,
    pub rain: Option<Rain>,
    pub snow: Option<Snow>,
    pub sys: Option<CurrentWeatherSys>,
    /// Meters.
    pub visibility: Option<i64>,
    /// Shift in seconds from UTC.
    pub timezone: Option<i64>,
}

/// Result of a box, circle or group search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherSearch {
    pub status_code: Option<i64>,
    pub calc_time: Option<f64>,
    pub cnt: Option<i64>,
    #[serde(default)]
    pub datas: Vec<CurrentWeather>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvIndex {
    pub latitude: f64,
    pub longitude: f64,
    pub date: Option<DateTime<Utc>>,
    pub date_iso: Option<String>,
    pub dt_timestamp: Option<i64>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AirPollutionLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PollutantSample {
    pub precision: Option<f64>,
    /// Atmospheric pressure, hPa.
    pub pressure: Option<f64>,
    /// Volume mixing ratio.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonMonoxide {
    pub time: DateTime<Utc>,
    pub time_iso8601: Option<String>,
    pub location: Option<AirPollutionLocation>,
    #[serde(default)]
    pub datas: Vec<PollutantSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ozone {
    pub time: DateTime<Utc>,
    pub time_iso8601: Option<String>,
    pub location: Option<AirPollutionLocation>,
    /// Ozone layer thickness, Dobson units.
    pub data: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SulfurDioxide {
    pub time: DateTime<Utc>,
    pub time_iso8601: Option<String>,
    pub location: Option<AirPollutionLocation>,
    #[serde(default)]
    pub datas: Vec<PollutantSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NitrogenDioxideMeasure {
    pub precision: Option<f64>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NitrogenDioxideData {
    pub no2: Option<NitrogenDioxideMeasure>,
    pub no2_strat: Option<NitrogenDioxideMeasure>,
    pub no2_trop: Option<NitrogenDioxideMeasure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NitrogenDioxide {
    pub time: DateTime<Utc>,
    pub time_iso8601: Option<String>,
    pub location: Option<AirPollutionLocation>,
    pub data: Option<NitrogenDioxideData>,
}
