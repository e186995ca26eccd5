use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    /// Estimator configuration file, layered under the `CDW_*` variables
    pub config_path: Option<PathBuf>,
    pub geocoder: GeocoderConfig,
    pub osrm_url: String,
    pub http_timeout: Duration,
}

/// TrueWay geocoding service settings
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub url: String,
    pub api_key: Option<String>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            url: "https://trueway-geocoding.p.rapidapi.com/Geocode".to_string(),
            api_key: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_origin: "http://localhost:3000".to_string(),
            config_path: None,
            geocoder: GeocoderConfig::default(),
            osrm_url: "https://router.project-osrm.org".to_string(),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("CDW_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(defaults.port);

        let cors_origin = env::var("CDW_CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        let config_path = env::var("CDW_CONFIG").ok().map(PathBuf::from);

        let geocoder = GeocoderConfig {
            url: env::var("CDW_GEOCODER_URL").unwrap_or(defaults.geocoder.url),
            api_key: env::var("CDW_GEOCODER_API_KEY").ok().filter(|k| !k.trim().is_empty()),
        };

        let osrm_url = env::var("CDW_OSRM_URL").unwrap_or(defaults.osrm_url);

        let http_timeout = env::var("CDW_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Self {
            port,
            cors_origin,
            config_path,
            geocoder,
            osrm_url,
            http_timeout,
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
