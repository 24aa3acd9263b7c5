#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Default row count for the recent-visits query when the request does
    /// not pass `?limit=`. Always clamped to 100 server-side.
    pub recent_default_limit: usize,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("BADGETRACK_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            recent_default_limit: std::env::var("BADGETRACK_RECENT_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            cors_origins: std::env::var("BADGETRACK_CORS_ORIGINS")
                .map(|v| v.split(',').map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}
