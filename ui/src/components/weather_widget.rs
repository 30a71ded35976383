use dioxus::prelude::*;

use harvest_client::weather::WeatherService;
use harvest_common::location::GeoLocation;
use harvest_common::weather::{icon_url, WeatherData};

use super::auth_state::use_auth;

const WEATHER_FAILED: &str = "Could not load weather data. Please check your location settings.";

/// Current conditions and a five-day outlook for the user's farm.
///
/// Without stored coordinates the user can look a place up by name.
#[component]
pub fn WeatherWidget(#[props(!optional)] location: Option<GeoLocation>) -> Element {
    let auth = use_auth();
    let mut weather = use_signal(|| None::<WeatherData>);
    let mut error_msg = use_signal(|| None::<String>);
    let mut loading = use_signal(|| false);
    let mut place = use_signal(String::new);

    use_effect(move || {
        let Some(at) = location else { return };
        spawn(async move {
            loading.set(true);
            let service = WeatherService::new(&auth.peek().config);
            match service.by_coordinates(at).await {
                Ok(data) => weather.set(Some(data)),
                Err(e) => {
                    tracing::warn!("weather lookup failed: {e}");
                    error_msg.set(Some(e.user_message(WEATHER_FAILED)));
                }
            }
            loading.set(false);
        });
    });

    let search = move |_| {
        let query = place.read().trim().to_string();
        if query.is_empty() {
            return;
        }
        spawn(async move {
            loading.set(true);
            error_msg.set(None);
            let service = WeatherService::new(&auth.peek().config);
            match service.by_location(&query).await {
                Ok(data) => weather.set(Some(data)),
                Err(e) => error_msg.set(Some(e.user_message(WEATHER_FAILED))),
            }
            loading.set(false);
        });
    };

    rsx! {
        div { class: "card weather-widget",
            h3 { "Weather" }

            if location.is_none() {
                div { class: "weather-search",
                    input {
                        r#type: "text",
                        placeholder: "City, country code",
                        value: "{place}",
                        oninput: move |evt| place.set(evt.value()),
                    }
                    button { onclick: search, "Look up" }
                }
            }

            if loading() {
                p { "Loading weather..." }
            }

            if let Some(ref err) = *error_msg.read() {
                div { class: "alert alert-error", "{err}" }
            }

            if let Some(ref data) = *weather.read() {
                div { class: "weather-current",
                    img { src: icon_url(&data.current.icon), alt: "{data.current.condition}" }
                    div {
                        p { class: "weather-temp", "{data.current.temperature:.1}°C" }
                        p { "{data.current.condition_description}" }
                        p { class: "muted", "{data.current.location}" }
                    }
                    ul { class: "weather-stats",
                        li { "Humidity: {data.current.humidity}%" }
                        li { "Wind: {data.current.wind_speed} m/s" }
                        li { "Pressure: {data.current.pressure} hPa" }
                    }
                }
                div { class: "weather-forecast",
                    for day in data.forecast.iter() {
                        div { class: "forecast-day",
                            key: "{day.date}",
                            span { class: "forecast-name", "{day.day_label()}" }
                            span { class: "forecast-date", "{day.date_label()}" }
                            img { src: icon_url(&day.icon), alt: "{day.condition}" }
                            span { "{day.temp:.1}°C" }
                        }
                    }
                }
            }
        }
    }
}
