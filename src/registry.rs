use crate::error::{Error, Result};
use crate::schema::{Schema, Shape};
use crate::schemas;

pub(crate) const API_DATA_VERSION: &str = "2.5";
pub(crate) const API_POLLUTION_VERSION: &str = "v1";

/// One provider endpoint the client knows how to call and decode.
#[derive(Debug)]
pub struct ServiceDescriptor {
    pub name: &'static str,
    /// Path relative to the configured host, or an absolute URL.
    pub path: &'static str,
    pub shape: Shape,
    pub schema: &'static Schema,
    pub description: &'static str,
    /// Some endpoints reject the `units` query parameter.
    pub sends_units: bool,
}

pub static SERVICES: &[ServiceDescriptor] = &[
    ServiceDescriptor {
        name: "city_list",
        path: "http://bulk.openweathermap.org/sample/city.list.json.gz",
        shape: Shape::List,
        schema: &schemas::CITY,
        description: "Cities' IDs list.",
        sends_units: false,
    },
    ServiceDescriptor {
        name: "forecast_5d",
        path: "/data/2.5/forecast",
        shape: Shape::Single,
        schema: &schemas::FORECAST,
        description: "Forecast 5 day / 3 hour for a location.",
        sends_units: true,
    },
    ServiceDescriptor {
        name: "current_weather",
        path: "/data/2.5/weather",
        shape: Shape::Single,
        schema: &schemas::CURRENT_WEATHER,
        description: "Current weather for a location.",
        sends_units: true,
    },
    ServiceDescriptor {
        name: "current_weather_box",
        path: "/data/2.5/box/city",
        shape: Shape::Single,
        schema: &schemas::CURRENT_WEATHER_SEARCH,
        description: "Current weather within a geographical box.",
        sends_units: true,
    },
    ServiceDescriptor {
        name: "current_weather_circle",
        path: "/data/2.5/find",
        shape: Shape::Single,
        schema: &schemas::CURRENT_WEATHER_SEARCH,
        description: "Current weather within a geographical circle.",
        sends_units: true,
    },
    ServiceDescriptor {
        name: "current_weather_group",
        path: "/data/2.5/group",
        shape: Shape::Single,
        schema: &schemas::CURRENT_WEATHER_SEARCH,
        description: "Current weather for a group of cities.",
        sends_units: true,
    },
    ServiceDescriptor {
        name: "air_pollution_carbon_monoxide",
        path: "/pollution/v1/co/",
        shape: Shape::Single,
        schema: &schemas::AIR_POLLUTION_CARBON_MONOXIDE,
        description: "Carbon monoxide for a location and time.",
        sends_units: true,
    },
    ServiceDescriptor {
        name: "air_pollution_ozone",
        path: "/pollution/v1/o3/",
        shape: Shape::Single,
        schema: &schemas::AIR_POLLUTION_OZONE,
        description: "Ozone for a location and time.",
        sends_units: true,
    },
    ServiceDescriptor {
        name: "air_pollution_sulfur_dioxide",
        path: "/pollution/v1/so2/",
        shape: Shape::Single,
        schema: &schemas::AIR_POLLUTION_SULFUR_DIOXIDE,
        description: "Sulfur dioxide for a location and time.",
        sends_units: true,
    },
    ServiceDescriptor {
        name: "air_pollution_nitrogen_dioxide",
        path: "/pollution/v1/no2/",
        shape: Shape::Single,
        schema: &schemas::AIR_POLLUTION_NITROGEN_DIOXIDE,
        description: "Nitrogen dioxide for a location and time.",
        sends_units: true,
    },
    ServiceDescriptor {
        name: "uv_index_current",
        path: "/data/2.5/uvi",
        shape: Shape::Single,
        schema: &schemas::UV_INDEX,
        description: "UV index for a location.",
        sends_units: false,
    },
    ServiceDescriptor {
        name: "uv_index_forecast",
        path: "/data/2.5/uvi/forecast",
        shape: Shape::List,
        schema: &schemas::UV_INDEX,
        description: "Forecast UV index for a location.",
        sends_units: false,
    },
    ServiceDescriptor {
        name: "uv_index_historical",
        path: "/data/2.5/uvi/history",
        shape: Shape::List,
        schema: &schemas::UV_INDEX,
        description: "Historical UV index for a location.",
        sends_units: false,
    },
];

pub fn lookup(name: &str) -> Option<&'static ServiceDescriptor> {
    SERVICES.iter().find(|s| s.name == name)
}

pub(crate) fn require(name: &str) -> Result<&'static ServiceDescriptor> {
    lookup(name).ok_or_else(|| {
        let err = Error::UnknownService {
            name: name.to_string(),
            available: SERVICES
                .iter()
                .map(|s| s.name)
                .collect::<Vec<_>>()
                .join(", "),
        };
        log::error!("{err}");
        err
    })
}
