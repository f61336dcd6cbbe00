use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct VorbaConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub recommendations: RecommendationConfig,
    #[serde(default)]
    pub imagery: ImageryConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

/// Which `ProverbStore` implementation backs the service.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub default_limit: u32,
    pub max_limit: u32,
    pub min_query_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            min_query_chars: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationConfig {
    pub default_limit: u32,
    pub feed_limit: u32,
    pub max_limit: u32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            feed_limit: 20,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageryConfig {
    pub base_url: String,
    pub width: u32,
    pub height: u32,
    pub model: String,
    pub nologo: bool,
    pub enhance: bool,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pollinations.ai/p".to_string(),
            width: 800,
            height: 600,
            model: "flux".to_string(),
            nologo: true,
            enhance: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    /// Shared secret expected in the `x-admin-token` header. Empty disables the check.
    #[serde(default)]
    pub token: Option<String>,
}

impl AdminConfig {
    pub fn required_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

impl VorbaConfig {
    /// Load from a TOML file, with `VORBABUNA__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("VORBABUNA").separator("__"))
            .build()?;
        s.try_deserialize()
    }

    /// In-memory configuration used by tests and by `--memory` runs.
    pub fn in_memory() -> Self {
        Self {
            service: ServiceConfig {
                log_level: "info".to_string(),
            },
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                url: String::new(),
                max_connections: 1,
            },
            http: HttpConfig::default(),
            search: SearchConfig::default(),
            recommendations: RecommendationConfig::default(),
            imagery: ImageryConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_minimal_file_uses_section_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[service]
log_level = "debug"

[database]
url = "postgresql://localhost/vorbabuna"
max_connections = 4
"#
        )
        .unwrap();

        let config = VorbaConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.service.log_level, "debug");
        assert_eq!(config.database.backend, StoreBackend::Postgres);
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.http.port, 8787);
        assert_eq!(config.search.max_limit, 100);
        assert_eq!(config.imagery.model, "flux");
        assert!(config.admin.required_token().is_none());
    }

    #[test]
    fn test_memory_backend_parses() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[service]
log_level = "info"

[database]
backend = "memory"
url = ""
max_connections = 1

[admin]
token = "s3cret"
"#
        )
        .unwrap();

        let config = VorbaConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.admin.required_token(), Some("s3cret"));
    }

    #[test]
    fn test_empty_admin_token_disables_check() {
        let admin = AdminConfig {
            token: Some(String::new()),
        };
        assert!(admin.required_token().is_none());
    }
}
