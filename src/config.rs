use std::{env, net::IpAddr, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Context};
use axum_session_middleware::AxumSessionConfig;
use chrono::Duration;

use crate::{
    handlers::register::RegistrationRules,
    store::{RegistryVariant, StoreConfig},
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host_ip: IpAddr,
    pub port: u16,
    pub frontend_origin: Option<String>,
    pub session_idle_minutes: i64,
    pub cookie_name: String,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub store: StoreConfig,
    pub rules: RegistrationRules,
}

impl AppConfig {
    /// Reads `PORTAL_*` variables. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<AppConfig, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<AppConfig, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host_ip: IpAddr = parse(&var("PORTAL_HOST_IP", "127.0.0.1"), "PORTAL_HOST_IP")?;
        let port: u16 = parse(&var("PORTAL_PORT", "3000"), "PORTAL_PORT")?;
        let session_idle_minutes: i64 = parse(
            &var("PORTAL_SESSION_IDLE_MINUTES", "30"),
            "PORTAL_SESSION_IDLE_MINUTES",
        )?;
        if session_idle_minutes <= 0 {
            return Err(anyhow!("PORTAL_SESSION_IDLE_MINUTES must be positive"));
        }

        let variant = var("PORTAL_REGISTRY", "derived")
            .parse::<RegistryVariant>()
            .map_err(|e| anyhow!("PORTAL_REGISTRY: {}", e))?;
        let strict_id_format: bool = parse(
            &var("PORTAL_STRICT_ID_FORMAT", "true"),
            "PORTAL_STRICT_ID_FORMAT",
        )?;

        let cookie_name = var("PORTAL_COOKIE_NAME", "sid");
        if cookie_name.is_empty() || !cookie_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(anyhow!("PORTAL_COOKIE_NAME has an invalid value `{}`", cookie_name));
        }
        let cookie_secure: bool = parse(&var("PORTAL_COOKIE_SECURE", "false"), "PORTAL_COOKIE_SECURE")?;

        Ok(AppConfig {
            host_ip,
            port,
            frontend_origin: lookup("PORTAL_FRONTEND_ORIGIN").filter(|o| !o.is_empty()),
            session_idle_minutes,
            cookie_name,
            cookie_domain: lookup("PORTAL_COOKIE_DOMAIN").filter(|d| !d.is_empty()),
            cookie_secure,
            store: StoreConfig {
                workbook: PathBuf::from(var("PORTAL_WORKBOOK", "TransJakarta_FP.xlsx")),
                trip_sheet: var("PORTAL_TRIP_SHEET", "TransJakarta"),
                users_sheet: var("PORTAL_USERS_SHEET", "Users"),
                variant,
            },
            rules: RegistrationRules { strict_id_format },
        })
    }

    /// Session cookie settings and idle timeout for the session layer.
    pub fn session_config(&self) -> AxumSessionConfig {
        let config = AxumSessionConfig::default()
            .with_idle_timeout(Duration::minutes(self.session_idle_minutes))
            .with_cookie_name(self.cookie_name.clone())
            .with_cookie_secure(self.cookie_secure);

        match &self.cookie_domain {
            Some(domain) => config.with_cookie_domain(domain.clone()),
            None => config,
        }
    }
}

fn parse<T>(value: &str, key: &str) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("{} has an invalid value `{}`", key, value))
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, anyhow::Error> {
        let vars = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.host_ip.to_string(), "127.0.0.1");
        assert_eq!(config.store.trip_sheet, "TransJakarta");
        assert_eq!(config.store.users_sheet, "Users");
        assert_eq!(config.store.variant, RegistryVariant::Derived);
        assert!(config.rules.strict_id_format);
        assert!(config.frontend_origin.is_none());
        assert_eq!(config.cookie_name, "sid");
        assert!(!config.cookie_secure);
        assert!(config.cookie_domain.is_none());
    }

    #[test]
    fn session_config_carries_cookie_settings() {
        let config = config_from(&[
            ("PORTAL_SESSION_IDLE_MINUTES", "5"),
            ("PORTAL_COOKIE_NAME", "portal_sid"),
            ("PORTAL_COOKIE_SECURE", "true"),
            ("PORTAL_COOKIE_DOMAIN", "portal.example.id"),
        ])
        .unwrap();

        let session = config.session_config();

        assert_eq!(session.cookie_name(), "portal_sid");
        let debug = format!("{:?}", session);
        assert!(debug.contains("cookie_secure: true"));
        assert!(debug.contains("portal.example.id"));
        assert!(debug.contains("idle_timeout"));
    }

    #[test]
    fn variables_override_defaults() {
        let config = config_from(&[
            ("PORTAL_PORT", "8080"),
            ("PORTAL_REGISTRY", "persisted"),
            ("PORTAL_STRICT_ID_FORMAT", "false"),
            ("PORTAL_WORKBOOK", "/data/tj.xlsx"),
            ("PORTAL_FRONTEND_ORIGIN", "http://localhost:5173"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.store.variant, RegistryVariant::Persisted);
        assert!(!config.rules.strict_id_format);
        assert_eq!(config.store.workbook, PathBuf::from("/data/tj.xlsx"));
        assert_eq!(config.frontend_origin.as_deref(), Some("http://localhost:5173"));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(config_from(&[("PORTAL_PORT", "http")]).is_err());
        assert!(config_from(&[("PORTAL_REGISTRY", "sqlite")]).is_err());
        assert!(config_from(&[("PORTAL_SESSION_IDLE_MINUTES", "0")]).is_err());
        assert!(config_from(&[("PORTAL_COOKIE_NAME", "s id;")]).is_err());
    }
}
