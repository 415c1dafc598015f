use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub identity: IdentityConfig,
    pub gemini: GeminiConfig,
    pub users: UsersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    pub database_url: String,
    /// Secret for the private cookie jar. At least 32 bytes; a random key is
    /// generated when unset, which invalidates cookies on restart.
    pub cookie_secret: Option<String>,
    /// Drop the `Secure` attribute from cookies (plain-http development).
    pub insecure_cookie: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct IdentityConfig {
    pub publishable_key: Option<String>,
    /// Overrides the Frontend API origin derived from the publishable key.
    pub frontend_api: Option<Url>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Url,
    pub default_model: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct UsersConfig {
    pub require_name: bool,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            database_url: "sqlite://projectx.db".to_string(),
            cookie_secret: None,
            insecure_cookie: false,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Url::parse("https://generativelanguage.googleapis.com")
                .expect("static gemini url is valid"),
            default_model: "gemini-1.5-flash".to_string(),
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    /// Load `.env`, then defaults < `config.toml` < environment.
    pub fn load() -> Result<Self, figment::Error> {
        dotenvy::dotenv().ok();
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(DEFAULT_CONFIG_FILE))
            .merge(Env::prefixed("PROJECTX_").split("__"))
            // Names the hosted services document for their keys.
            .merge(Env::raw().filter_map(|key| {
                match key.as_str().to_ascii_uppercase().as_str() {
                    "DATABASE_URL" => Some("basic.database_url".into()),
                    "LOGLEVEL" => Some("basic.loglevel".into()),
                    "CLERK_PUBLISHABLE_KEY" | "NEXT_PUBLIC_CLERK_PUBLISHABLE_KEY" => {
                        Some("identity.publishable_key".into())
                    }
                    "GEMINI_API_KEY" | "NEXT_PUBLIC_GEMINI_API_KEY" => {
                        Some("gemini.api_key".into())
                    }
                    _ => None,
                }
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.gemini.default_model, "gemini-1.5-flash");
            assert!(!cfg.users.require_name);
            Ok(())
        });
    }

    #[test]
    fn env_aliases_and_prefixed_keys() {
        Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "sqlite::memory:");
            jail.set_env("GEMINI_API_KEY", "g-key");
            jail.set_env("NEXT_PUBLIC_CLERK_PUBLISHABLE_KEY", "pk_test_abc");
            jail.set_env("PROJECTX_USERS__REQUIRE_NAME", "true");
            jail.set_env("PROJECTX_GEMINI__MAX_RETRIES", "0");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.basic.database_url, "sqlite::memory:");
            assert_eq!(cfg.gemini.api_key.as_deref(), Some("g-key"));
            assert_eq!(cfg.identity.publishable_key.as_deref(), Some("pk_test_abc"));
            assert!(cfg.users.require_name);
            assert_eq!(cfg.gemini.max_retries, 0);
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_overridden_by_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [basic]
                listen_addr = "127.0.0.1:9000"
                loglevel = "debug"
                "#,
            )?;
            jail.set_env("LOGLEVEL", "warn");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.basic.listen_addr, "127.0.0.1:9000");
            assert_eq!(cfg.basic.loglevel, "warn");
            Ok(())
        });
    }
}
