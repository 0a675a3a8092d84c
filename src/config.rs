use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Buffer size of the push broadcast channel. Slow SSE subscribers that
    /// lag more than this many events get dropped by the stream.
    pub notifier_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(5000);
        let notifier_capacity = env::var("NOTIFIER_CAPACITY")
            .ok()
            .and_then(|p| p.parse::<usize>().ok())
            .unwrap_or(256);
        Ok(Self {
            port,
            database_url,
            host,
            notifier_capacity,
        })
    }
}
