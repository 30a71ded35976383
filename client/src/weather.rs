use harvest_common::location::GeoLocation;
use harvest_common::weather::{
    daily_forecast, CurrentWeather, OwmCurrent, OwmForecast, OwmGeocode, WeatherData,
    LOCATION_NOT_FOUND,
};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http::{decode, send};

/// OpenWeatherMap client. The API key comes from configuration only.
#[derive(Debug, Clone)]
pub struct WeatherService {
    http: reqwest::Client,
    base_url: String,
    geo_url: String,
    api_key: Option<String>,
}

impl WeatherService {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.weather_base_url.trim_end_matches('/').to_string(),
            geo_url: config.weather_geo_url.trim_end_matches('/').to_string(),
            api_key: config.weather_api_key.clone(),
        }
    }

    fn key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ClientError::Invalid("Weather API key is not configured".into()))
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(%url, "weather request");
        let key = self.key()?;
        let req = self.http.get(url).query(query).query(&[("appid", key)]);
        decode(send(req).await?)
    }

    pub async fn current(&self, at: GeoLocation) -> Result<CurrentWeather> {
        let raw: OwmCurrent = self
            .fetch(format!("{}/weather", self.base_url), &coords(at))
            .await?;
        Ok(raw.into())
    }

    pub async fn by_coordinates(&self, at: GeoLocation) -> Result<WeatherData> {
        let q = coords(at);
        let (current, forecast) = futures::join!(
            self.fetch::<OwmCurrent>(format!("{}/weather", self.base_url), &q),
            self.fetch::<OwmForecast>(format!("{}/forecast", self.base_url), &q),
        );
        Ok(WeatherData {
            current: current?.into(),
            forecast: daily_forecast(&forecast?.list),
        })
    }

    /// Geocode `place` (e.g. `Kandy, LK`) and fetch its weather.
    pub async fn by_location(&self, place: &str) -> Result<WeatherData> {
        let hits: Vec<OwmGeocode> = self
            .fetch(
                format!("{}/direct", self.geo_url),
                &[("q", place.to_string()), ("limit", "1".to_string())],
            )
            .await?;
        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound(LOCATION_NOT_FOUND.into()))?;
        self.by_coordinates(GeoLocation::new(hit.lat, hit.lon)).await
    }
}

fn coords(at: GeoLocation) -> Vec<(&'static str, String)> {
    vec![("lat", at.latitude.to_string()), ("lon", at.longitude.to_string())]
}
