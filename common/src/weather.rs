//! OpenWeatherMap payloads and the reductions the dashboard shows.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";
pub const FORECAST_DAYS: usize = 5;
pub const LOCATION_NOT_FOUND: &str = "Location not found";

/// Celsius rounded to one decimal.
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    ((kelvin - 273.15) * 10.0).round() / 10.0
}

pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

// ─── Provider payloads ───

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OwmMain {
    pub temp: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub pressure: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OwmCondition {
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OwmWind {
    #[serde(default)]
    pub speed: f64,
}

/// `GET /weather`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OwmCurrent {
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
    #[serde(default)]
    pub wind: OwmWind,
    #[serde(default)]
    pub name: String,
}

/// One 3-hour slot of `GET /forecast`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwmForecastItem {
    pub main: OwmMain,
    #[serde(default)]
    pub weather: Vec<OwmCondition>,
    #[serde(with = "dt_txt")]
    pub dt_txt: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OwmForecast {
    #[serde(default)]
    pub list: Vec<OwmForecastItem>,
}

/// One hit of `GET /direct` geocoding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OwmGeocode {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub name: String,
}

mod dt_txt {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

// ─── View model ───

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub condition: String,
    pub condition_description: String,
    pub wind_speed: f64,
    pub icon: String,
    pub location: String,
}

impl From<OwmCurrent> for CurrentWeather {
    fn from(raw: OwmCurrent) -> Self {
        let cond = raw.weather.into_iter().next().unwrap_or_default();
        Self {
            temperature: kelvin_to_celsius(raw.main.temp),
            humidity: raw.main.humidity,
            pressure: raw.main.pressure,
            condition: cond.main,
            condition_description: cond.description,
            wind_speed: raw.wind.speed,
            icon: cond.icon,
            location: raw.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temp: f64,
    pub condition: String,
    pub icon: String,
}

impl ForecastDay {
    /// e.g. `Mar 4`
    pub fn date_label(&self) -> String {
        self.date.format("%b %-d").to_string()
    }

    /// e.g. `Mon`
    pub fn day_label(&self) -> String {
        self.date.format("%a").to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
}

fn seconds_from_noon(t: NaiveTime) -> i64 {
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
    (t - noon).num_seconds().abs()
}

/// One reading per calendar day, the slot closest to 12:00 (earliest wins a
/// tie), first [`FORECAST_DAYS`] days in date order.
pub fn daily_forecast(items: &[OwmForecastItem]) -> Vec<ForecastDay> {
    let mut days: Vec<&OwmForecastItem> = Vec::new();
    for item in items {
        let date = item.dt_txt.date();
        match days.iter_mut().find(|d| d.dt_txt.date() == date) {
            Some(best) => {
                if seconds_from_noon(item.dt_txt.time()) < seconds_from_noon(best.dt_txt.time()) {
                    *best = item;
                }
            }
            None => days.push(item),
        }
    }
    days.sort_by_key(|d| d.dt_txt.date());
    days.into_iter()
        .take(FORECAST_DAYS)
        .map(|item| {
            let cond = item.weather.first().cloned().unwrap_or_default();
            ForecastDay {
                date: item.dt_txt.date(),
                temp: kelvin_to_celsius(item.main.temp),
                condition: cond.main,
                icon: cond.icon,
            }
        })
        .collect()
}
