//! Application configuration loading and validation

mod app_config;

pub use app_config::{
    AppConfig, ArchitectureConfig, ComparisonConfig, IndexBackend, IndexConfig,
    InferenceServerConfig, LogFormat, LoggingConfig, RedisConfig, ServerConfig,
};
