use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Without a database URL the service keeps everything in memory.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub bind_addr: String,
    pub cors_origin: String,
    pub user_cache_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| "JWT_SECRET must be set".to_string())?;

        let jwt_issuer = lookup("JWT_ISSUER").unwrap_or_else(|| "shift-radar".to_string());
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let cors_origin = lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        let user_cache_ttl = match lookup("USER_CACHE_TTL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| format!("USER_CACHE_TTL_SECS must be a number of seconds, got {}", raw))?,
            None => Duration::from_secs(300),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_issuer,
            bind_addr,
            cors_origin,
            user_cache_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.jwt_issuer, "shift-radar");
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.user_cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_secret_required() {
        assert!(config(&[("DATABASE_URL", "postgres://localhost/radar")]).is_err());
    }

    #[test]
    fn test_bad_ttl() {
        assert!(config(&[("JWT_SECRET", "s3cret"), ("USER_CACHE_TTL_SECS", "soon")]).is_err());
    }
}
