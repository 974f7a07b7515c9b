use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_LOG_DIR: &str = "./logs";
pub const LOG_FILE_PREFIX: &str = "neuroai-backend.log";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Daily rolling file output next to stdout, off unless `ENABLE_FILE_LOGS` is set.
    pub enable_file_logs: bool,
    pub log_dir: PathBuf,
    pub log_file_prefix: String,
    pub database_url: String,
    pub jwt_secret: Option<String>,
    pub phoneme_api_url: Option<String>,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let enable_file_logs = non_empty_env("ENABLE_FILE_LOGS")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);
        let log_dir = non_empty_env("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        let database_url = non_empty_env("DATABASE_URL").unwrap_or_else(default_database_url);

        let cors_origins = non_empty_env("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host,
            port,
            log_level,
            enable_file_logs,
            log_dir,
            log_file_prefix: LOG_FILE_PREFIX.to_string(),
            database_url,
            jwt_secret: non_empty_env("JWT_SECRET"),
            phoneme_api_url: non_empty_env("PHONEME_API_URL")
                .map(|url| url.trim_end_matches('/').to_string()),
            cors_origins,
        }
    }

    /// In-memory database and a fixed secret, for tests and local tooling.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            log_level: "info".to_string(),
            enable_file_logs: false,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_file_prefix: LOG_FILE_PREFIX.to_string(),
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: Some(jwt_secret.into()),
            phoneme_api_url: None,
            cors_origins: Vec::new(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true") || raw == "1"
}

pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("neuroai")
        .join("neuroai.db")
}

fn default_database_url() -> String {
    format!("sqlite:{}?mode=rwc", default_database_path().display())
}
