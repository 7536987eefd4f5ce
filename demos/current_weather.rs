use anyhow::Result;
use openweathermap_client::{Client, ClientConfig, UnitSystem};

fn main() -> Result<()> {
    // Example program that calls the library API.
    // Set RUST_LOG=debug to see every attempt.
    env_logger::init();

    let key = std::env::var("OWM_API_KEY").ok();
    let client = Client::with_config(
        ClientConfig::new(key)
            .with_units(UnitSystem::Metric)
            .with_max_retries(3),
    )?;

    let weather = client.get_current_weather_by_city_id(6434841)?;
    println!(
        "{} ({}): {:?} °C",
        weather.city_name.as_deref().unwrap_or("?"),
        weather.dt_value,
        weather.main.as_ref().and_then(|m| m.temp)
    );

    let forecast = client.get_forecast_by_coord(44.333328, 1.21667)?;
    for entry in forecast.datas.iter().take(4) {
        let sky = entry
            .weather
            .first()
            .and_then(|w| w.description.as_deref())
            .unwrap_or("-");
        println!("{}  {}", entry.dt_value, sky);
    }

    let uv = client.get_uv_index_current(37.75, -122.37)?;
    println!("UV index: {}", uv.value);

    println!(
        "last call: {} ({} attempt(s))",
        client.last_uri_call().unwrap_or_default(),
        client.last_call_attempts()
    );
    Ok(())
}
