//! HTTP client for the boundary and city sources.
//!
//! The boundary collection is a static GeoJSON document served next to the
//! application (or read from a local file on native builds). Cities come from
//! `GET /api/cities`, optionally parameterised by camera altitude.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::collection::{parse_boundaries, parse_cities};
use crate::types::{CityRecord, CountryFeature};

/// Default server the sources are resolved against.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
/// Default path of the static boundary collection.
pub const DEFAULT_BOUNDARIES_PATH: &str = "/custom-110-metre.geojson";
/// Default path of the city endpoint.
pub const DEFAULT_CITIES_PATH: &str = "/api/cities";

/// Where the data sources live.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    /// Scheme and authority, without a trailing slash.
    pub base_url: String,
    /// Server path of the boundary collection.
    pub boundaries_path: String,
    /// Local boundary file, used instead of `boundaries_path` when set.
    pub boundaries_file: Option<PathBuf>,
    /// Server path of the city endpoint.
    pub cities_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            boundaries_path: DEFAULT_BOUNDARIES_PATH.to_string(),
            boundaries_file: None,
            cities_path: DEFAULT_CITIES_PATH.to_string(),
        }
    }
}

/// Client for fetching boundary and city collections.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: SourceConfig,
}

impl Client {
    /// Create a client with a default HTTP client.
    #[must_use]
    pub fn new(config: SourceConfig) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    /// Create a client with a custom HTTP client.
    #[must_use]
    pub fn with_http(http: reqwest::Client, mut config: SourceConfig) -> Self {
        let trimmed = config.base_url.trim_end_matches('/').len();
        config.base_url.truncate(trimmed);
        Self { http, config }
    }

    #[must_use]
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// URL of the boundary collection.
    #[must_use]
    pub fn boundaries_url(&self) -> String {
        format!("{}{}", self.config.base_url, self.config.boundaries_path)
    }

    /// URL of the city endpoint, with the altitude parameter when given.
    #[must_use]
    pub fn cities_url(&self, altitude: Option<f64>) -> String {
        match altitude {
            Some(altitude) => format!(
                "{}{}?altitude={altitude}",
                self.config.base_url, self.config.cities_path
            ),
            None => format!("{}{}", self.config.base_url, self.config.cities_path),
        }
    }

    /// Load the country boundary collection.
    pub async fn load_boundaries(&self) -> Result<Vec<CountryFeature>> {
        if let Some(path) = &self.config.boundaries_file {
            let data = read_file(path)?;
            return parse_boundaries(&data);
        }

        let data = self.fetch_bytes(&self.boundaries_url()).await?;
        parse_boundaries(&data)
    }

    /// Fetch city records, optionally for a given camera altitude.
    pub async fn fetch_cities(&self, altitude: Option<f64>) -> Result<Vec<CityRecord>> {
        let data = self.fetch_bytes(&self.cities_url(altitude)).await?;
        parse_cities(&data)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(url, "fetching");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let data = response.bytes().await.map_err(|e| Error::Http {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(data.to_vec())
    }
}

#[cfg(not(target_family = "wasm"))]
fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(target_family = "wasm")]
fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
    Err(Error::Io {
        path: path.display().to_string(),
        message: "local files are not available in the browser".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let client = Client::new(SourceConfig {
            base_url: "http://globe.test/".to_string(),
            ..SourceConfig::default()
        });

        assert_eq!(
            client.boundaries_url(),
            "http://globe.test/custom-110-metre.geojson"
        );
        assert_eq!(client.cities_url(None), "http://globe.test/api/cities");
        assert_eq!(
            client.cities_url(Some(0.45)),
            "http://globe.test/api/cities?altitude=0.45"
        );
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_file(std::path::Path::new("/nonexistent/boundaries.geojson")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Network);
    }
}
