use std::env;
use std::path::PathBuf;

use crate::shared::constants::{
    DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG, DEFAULT_MAP_ZOOM, DEFAULT_RADIUS_KM,
    DEFAULT_TILE_URL, TILE_MAX_ZOOM,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    /// Absent when no `DATABASE_URL` is configured; the service then runs on
    /// the legacy file-backed store.
    pub database: Option<DatabaseConfig>,
    pub local_store: LocalStoreConfig,
    pub geofence: GeofenceConfig,
    pub geocoder: GeocoderConfig,
    pub session: SessionConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Path of the JSON marker file used when no database is configured
#[derive(Debug, Clone)]
pub struct LocalStoreConfig {
    pub path: PathBuf,
}

/// The circular boundary within which reports are accepted, plus the map
/// defaults handed to the client. The source values drifted across
/// iterations of the original app, so everything here is environment-driven.
#[derive(Debug, Clone)]
pub struct GeofenceConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub radius_km: f64,
    pub default_zoom: u8,
    pub tile_url: String,
    pub tile_max_zoom: u8,
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Response language requested from Nominatim (`accept-language`).
    pub language: String,
    /// Descriptive client identifier required by the Nominatim usage policy.
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub idle_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            local_store: LocalStoreConfig::from_env(),
            geofence: GeofenceConfig::from_env()?,
            geocoder: GeocoderConfig::from_env(),
            session: SessionConfig::from_env()?,
            swagger: SwaggerConfig::from_env(),
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    // Conservative pool defaults for a village-scale deployment
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Option<Self>, String> {
        let url = match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => return Ok(None),
        };

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Some(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        }))
    }
}

impl LocalStoreConfig {
    pub fn from_env() -> Self {
        let path = env::var("MARKER_STORE_PATH").unwrap_or_else(|_| "data/reports.json".to_string());
        Self {
            path: PathBuf::from(path),
        }
    }
}

impl GeofenceConfig {
    pub fn from_env() -> Result<Self, String> {
        let center_lat = env::var("VILLAGE_CENTER_LAT")
            .unwrap_or_else(|_| DEFAULT_CENTER_LAT.to_string())
            .parse::<f64>()
            .map_err(|_| "VILLAGE_CENTER_LAT must be a valid number".to_string())?;

        let center_lng = env::var("VILLAGE_CENTER_LNG")
            .unwrap_or_else(|_| DEFAULT_CENTER_LNG.to_string())
            .parse::<f64>()
            .map_err(|_| "VILLAGE_CENTER_LNG must be a valid number".to_string())?;

        let radius_km = env::var("GEOFENCE_RADIUS_KM")
            .unwrap_or_else(|_| DEFAULT_RADIUS_KM.to_string())
            .parse::<f64>()
            .map_err(|_| "GEOFENCE_RADIUS_KM must be a valid number".to_string())?;

        if radius_km <= 0.0 {
            return Err("GEOFENCE_RADIUS_KM must be positive".to_string());
        }

        let default_zoom = env::var("MAP_DEFAULT_ZOOM")
            .unwrap_or_else(|_| DEFAULT_MAP_ZOOM.to_string())
            .parse::<u8>()
            .map_err(|_| "MAP_DEFAULT_ZOOM must be a valid number".to_string())?;

        let tile_url = env::var("MAP_TILE_URL").unwrap_or_else(|_| DEFAULT_TILE_URL.to_string());

        Ok(Self {
            center_lat,
            center_lng,
            radius_km,
            default_zoom,
            tile_url,
            tile_max_zoom: TILE_MAX_ZOOM,
        })
    }
}

impl GeocoderConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("NOMINATIM_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());

        let language = env::var("NOMINATIM_LANGUAGE").unwrap_or_else(|_| "bg".to_string());

        let user_agent = env::var("NOMINATIM_USER_AGENT")
            .unwrap_or_else(|_| "SvetnichkiCore/0.1 (street-light outage reports)".to_string());

        Self {
            base_url,
            language,
            user_agent,
        }
    }
}

impl SessionConfig {
    const DEFAULT_IDLE_TTL_SECS: u64 = 1800; // 30 minutes
    const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300; // 5 minutes

    pub fn from_env() -> Result<Self, String> {
        let idle_ttl_secs = env::var("SESSION_IDLE_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_IDLE_TTL_SECS must be a valid number".to_string())?;

        let sweep_interval_secs = env::var("SESSION_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SWEEP_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "SESSION_SWEEP_INTERVAL_SECS must be a valid number".to_string())?;

        Ok(Self {
            idle_ttl_secs,
            sweep_interval_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Self {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Svetnichki API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Street-light outage reports for Chepintsi village".to_string()
        });

        Self {
            username,
            password,
            title,
            version,
            description,
        }
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}
