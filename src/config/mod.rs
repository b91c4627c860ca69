use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnv {
    Production,
    Development,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Production writes to the analytics sink; anything else only traces
    /// the assembled record and its encoded/decoded views.
    pub environment: RuntimeEnv,
    /// When set, access events with a bot verdict are not recorded.
    /// Create events are always recorded.
    pub disable_bot_access_logs: bool,
    /// Honor X-Forwarded-For for client IP extraction. Only enable behind a
    /// proxy that strips the header from untrusted clients.
    pub trust_forwarded_for: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            environment: RuntimeEnv::Development,
            disable_bot_access_logs: false,
            trust_forwarded_for: false,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()?;

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./slink.db".to_string());
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let environment = match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => RuntimeEnv::Production,
            "development" | "dev" => RuntimeEnv::Development,
            other => {
                tracing::warn!(
                    "Unknown APP_ENV '{other}', falling back to 'development'. \
                     Supported values: production, development"
                );
                RuntimeEnv::Development
            }
        };

        Ok(Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            telemetry: TelemetryConfig {
                environment,
                disable_bot_access_logs: env_flag("DISABLE_BOT_ACCESS_LOGS"),
                trust_forwarded_for: env_flag("TRUST_FORWARDED_FOR"),
            },
        })
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}
