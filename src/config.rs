use std::net::IpAddr;

use ipnet::IpNet;

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendConfig,
    pub admin_key: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub rate_limit: u32,
    pub rate_limit_window_secs: u64,
    pub trusted_proxies: Vec<IpNet>,
    pub honeypot_field: Option<String>,
    pub redirect_url: Option<String>,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendConfig {
    Postgres { url: String },
    Mongo { uri: String, database: String },
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let backend = match env_or("CONTACTBOX_BACKEND", "postgres").as_str() {
            "postgres" | "postgresql" => BackendConfig::Postgres {
                url: match lookup("DATABASE_URL") {
                    Some(url) => url,
                    None => postgres_url(&lookup)?,
                },
            },
            "mongo" | "mongodb" => BackendConfig::Mongo {
                uri: env_or("MONGODB_URI", "mongodb://localhost:27017"),
                database: env_or("MONGODB_DATABASE", "contactbox"),
            },
            other => return Err(format!("Invalid CONTACTBOX_BACKEND: {other}")),
        };

        let admin_key = lookup("ADMIN_KEY")
            .filter(|key| !key.is_empty())
            .ok_or_else(|| "Missing required environment variable: ADMIN_KEY".to_string())?;

        let host: IpAddr = env_or("CONTACTBOX_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid CONTACTBOX_HOST: {e}"))?;

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PORT: {e}"))?;

        let max_body_size: usize = env_or("CONTACTBOX_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid CONTACTBOX_MAX_BODY_SIZE: {e}"))?;

        let rate_limit: u32 = env_or("CONTACTBOX_RATE_LIMIT", "5")
            .parse()
            .map_err(|e| format!("Invalid CONTACTBOX_RATE_LIMIT: {e}"))?;

        let rate_limit_window_secs: u64 = env_or("CONTACTBOX_RATE_LIMIT_WINDOW_SECS", "60")
            .parse()
            .map_err(|e| format!("Invalid CONTACTBOX_RATE_LIMIT_WINDOW_SECS: {e}"))?;
        if rate_limit_window_secs == 0 {
            return Err("Invalid CONTACTBOX_RATE_LIMIT_WINDOW_SECS: must be at least 1".to_string());
        }

        let trusted_proxies: Vec<IpNet> = env_or("CONTACTBOX_TRUSTED_PROXIES", "")
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse()
                    .map_err(|e| format!("Invalid CONTACTBOX_TRUSTED_PROXIES entry '{s}': {e}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let honeypot_field = Some(env_or("CONTACTBOX_HONEYPOT_FIELD", "website"))
            .filter(|field| !field.trim().is_empty());

        let redirect_url = lookup("CONTACTBOX_REDIRECT_URL").filter(|url| !url.trim().is_empty());

        let log_level = env_or("CONTACTBOX_LOG_LEVEL", "info");

        Ok(Config {
            backend,
            admin_key,
            host,
            port,
            max_body_size,
            rate_limit,
            rate_limit_window_secs,
            trusted_proxies,
            honeypot_field,
            redirect_url,
            log_level,
        })
    }
}

/// Assemble a Postgres URL from the individual `DB_*` variables.
fn postgres_url<F>(lookup: &F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port: u16 = lookup("DB_PORT")
        .unwrap_or_else(|| "5432".to_string())
        .parse()
        .map_err(|e| format!("Invalid DB_PORT: {e}"))?;
    let user = lookup("DB_USER").unwrap_or_else(|| "postgres".to_string());
    let password = lookup("DB_PASSWORD").unwrap_or_default();
    let name = lookup("DB_NAME").unwrap_or_else(|| "contactbox".to_string());
    let ssl = matches!(
        lookup("DB_SSL").unwrap_or_default().to_lowercase().as_str(),
        "true" | "1" | "yes" | "require"
    );

    let credentials = if password.is_empty() {
        encode(&user)
    } else {
        format!("{}:{}", encode(&user), encode(&password))
    };
    let sslmode = if ssl { "require" } else { "prefer" };

    Ok(format!(
        "postgres://{credentials}@{host}:{port}/{name}?sslmode={sslmode}"
    ))
}

fn encode(component: &str) -> String {
    form_urlencoded::byte_serialize(component.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
