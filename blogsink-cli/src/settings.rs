use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: String,
    pub session_ttl_seconds: i64,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("BLOGSINK_DATA_DIR").unwrap_or_else(|_| "./data".to_string());
        let session_ttl_seconds: i64 = std::env::var("BLOGSINK_SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("Failed to parse BLOGSINK_SESSION_TTL_SECONDS, expecting integer")?;
        if session_ttl_seconds <= 0 {
            return Err(anyhow!("BLOGSINK_SESSION_TTL_SECONDS must be > 0"));
        }

        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            data_dir,
            session_ttl_seconds,
            log_level,
        })
    }
}
