use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub mongodb: MongoDbConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub mongodb_uri: String,
    #[serde(default)]
    pub mistral_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDbConfig {
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Override for self-hosted or proxy deployments; the Mistral cloud
    /// endpoint is used when unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (CAREWISE__ prefix, `__` separator)
    ///
    /// Secrets never live in the TOML files; they are read from plain
    /// environment variables afterwards.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut config: Config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("CAREWISE").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Ok(uri) = std::env::var("MONGODB_URI") {
            config.mongodb_uri = uri;
        }
        if let Ok(key) = std::env::var("MISTRAL_API_KEY") {
            config.mistral_api_key = key;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            cors: CorsConfig {
                enabled: true,
                origins: vec!["*".to_string()],
            },
            mongodb: MongoDbConfig {
                database: "carewise".to_string(),
            },
            llm: LlmConfig {
                model: carewise_llm::config::DEFAULT_MODEL.to_string(),
                temperature: carewise_llm::config::DEFAULT_TEMPERATURE,
                max_tokens: carewise_llm::config::DEFAULT_MAX_TOKENS,
                base_url: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
            mongodb_uri: String::new(),
            mistral_api_key: String::new(),
        }
    }
}
