//! Field mappings for every OpenWeatherMap resource this crate reads.
//!
//! Target names match the fields of the structs in [`crate::model`].

use crate::schema::{Field, Schema};

pub static COORD: Schema = Schema {
    name: "coord",
    fields: &[
        Field::float("latitude").from_key("lat"),
        Field::float("longitude").from_key("lon"),
    ],
};

pub static CITY: Schema = Schema {
    name: "city",
    fields: &[
        Field::integer("id").required(),
        Field::string("name"),
        // ISO 3166 country code
        Field::string("country"),
        Field::nested("coord", &COORD),
    ],
};

// `temp_kf` is an internal provider parameter and is left out.
pub static MAIN: Schema = Schema {
    name: "main",
    fields: &[
        Field::float("temp"),
        Field::float("feels_like"),
        Field::float("temp_min"),
        Field::float("temp_max"),
        Field::float("humidity"),
        Field::float("pressure"),
        Field::float("sea_level"),
        Field::float("grnd_level"),
    ],
};

pub static WIND: Schema = Schema {
    name: "wind",
    fields: &[
        Field::float("direction").from_key("deg"),
        Field::float("speed"),
        Field::float("gust"),
    ],
};

pub static WEATHER_CONDITION: Schema = Schema {
    name: "weather",
    fields: &[
        Field::integer("id"),
        Field::string("main"),
        Field::string("description"),
        Field::string("icon"),
    ],
};

pub static CLOUDS: Schema = Schema {
    name: "clouds",
    fields: &[Field::integer("clouds_all").from_key("all")],
};

pub static RAIN: Schema = Schema {
    name: "rain",
    fields: &[
        Field::float("rain_1h").from_key("1h"),
        Field::float("rain_3h").from_key("3h"),
    ],
};

pub static SNOW: Schema = Schema {
    name: "snow",
    fields: &[
        Field::float("snow_1h").from_key("1h"),
        Field::float("snow_3h").from_key("3h"),
    ],
};

pub static FORECAST_ENTRY: Schema = Schema {
    name: "forecast entry",
    fields: &[
        Field::timestamp("dt_value").from_key("dt").required(),
        Field::integer("dt_timestamp").from_key("dt"),
        Field::string("dt_txt"),
        Field::nested("main", &MAIN),
        Field::list("weather", &WEATHER_CONDITION),
        Field::nested("clouds", &CLOUDS),
        Field::nested("wind", &WIND),
        Field::nested("rain", &RAIN),
        Field::nested("snow", &SNOW),
    ],
};

pub static FORECAST: Schema = Schema {
    name: "forecast",
    fields: &[
        Field::nested("city", &CITY),
        Field::integer("cnt"),
        Field::list("datas", &FORECAST_ENTRY).from_key("list"),
    ],
};

pub static CURRENT_WEATHER_SYS: Schema = Schema {
    name: "sys",
    fields: &[
        Field::string("country"),
        Field::timestamp("sunrise"),
        Field::timestamp("sunset"),
        Field::integer("sunrise_timestamp").from_key("sunrise"),
        Field::integer("sunset_timestamp").from_key("sunset"),
    ],
};

pub static CURRENT_WEATHER: Schema = Schema {
    name: "current weather",
    fields: &[
        Field::integer("city_id").from_key("id"),
        Field::string("city_name").from_key("name"),
        Field::nested("city_coord", &COORD).from_key("coord"),
        Field::timestamp("dt_value").from_key("dt").required(),
        Field::integer("dt_timestamp").from_key("dt"),
        Field::nested("main", &MAIN),
        Field::list("weather", &WEATHER_CONDITION),
        Field::nested("clouds", &CLOUDS),
        Field::nested("wind", &WIND),
        Field::nested("rain", &RAIN),
        Field::nested("snow", &SNOW),
        Field::nested("sys", &CURRENT_WEATHER_SYS),
        Field::integer("visibility"),
        Field::integer("timezone"),
    ],
};

/// Box, circle and group searches share this envelope.
pub static CURRENT_WEATHER_SEARCH: Schema = Schema {
    name: "current weather search",
    fields: &[
        Field::integer("status_code").from_key("cod"),
        Field::float("calc_time"),
        Field::integer("cnt"),
        Field::list("datas", &CURRENT_WEATHER).from_key("list"),
    ],
};

pub static UV_INDEX: Schema = Schema {
    name: "uv index",
    fields: &[
        Field::float("latitude").from_key("lat").required(),
        Field::float("longitude").from_key("lon").required(),
        Field::iso8601("date").from_key("date_iso"),
        Field::string("date_iso"),
        Field::integer("dt_timestamp").from_key("date"),
        Field::float("value").required(),
    ],
};

pub static AIR_POLLUTION_LOCATION: Schema = Schema {
    name: "location",
    fields: &[Field::float("latitude"), Field::float("longitude")],
};

/// One sample of a pollutant profile (carbon monoxide, sulfur dioxide).
pub static POLLUTANT_SAMPLE: Schema = Schema {
    name: "pollutant sample",
    fields: &[
        Field::float("precision"),
        Field::float("pressure"),
        Field::float("value"),
    ],
};

pub static AIR_POLLUTION_CARBON_MONOXIDE: Schema = Schema {
    name: "carbon monoxide",
    fields: &[
        Field::iso8601("time").required(),
        Field::string("time_iso8601").from_key("time"),
        Field::nested("location", &AIR_POLLUTION_LOCATION),
        Field::list("datas", &POLLUTANT_SAMPLE).from_key("data"),
    ],
};

pub static AIR_POLLUTION_OZONE: Schema = Schema {
    name: "ozone",
    fields: &[
        Field::iso8601("time").required(),
        Field::string("time_iso8601").from_key("time"),
        Field::nested("location", &AIR_POLLUTION_LOCATION),
        // ozone layer thickness, Dobson units
        Field::float("data"),
    ],
};

pub static AIR_POLLUTION_SULFUR_DIOXIDE: Schema = Schema {
    name: "sulfur dioxide",
    fields: &[
        Field::iso8601("time").required(),
        Field::string("time_iso8601").from_key("time"),
        Field::nested("location", &AIR_POLLUTION_LOCATION),
        Field::list("datas", &POLLUTANT_SAMPLE).from_key("data"),
    ],
};

pub static NITROGEN_DIOXIDE_MEASURE: Schema = Schema {
    name: "nitrogen dioxide measure",
    fields: &[Field::float("precision"), Field::float("value")],
};

pub static NITROGEN_DIOXIDE_DATA: Schema = Schema {
    name: "nitrogen dioxide data",
    fields: &[
        Field::nested("no2", &NITROGEN_DIOXIDE_MEASURE),
        Field::nested("no2_strat", &NITROGEN_DIOXIDE_MEASURE),
        Field::nested("no2_trop", &NITROGEN_DIOXIDE_MEASURE),
    ],
};

pub static AIR_POLLUTION_NITROGEN_DIOXIDE: Schema = Schema {
    name: "nitrogen dioxide",
    fields: &[
        Field::iso8601("time").required(),
        Field::string("time_iso8601").from_key("time"),
        Field::nested("location", &AIR_POLLUTION_LOCATION),
        Field::nested("data", &NITROGEN_DIOXIDE_DATA),
    ],
};
