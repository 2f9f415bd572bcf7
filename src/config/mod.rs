//! Application configuration

mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, AuthSettings, EmailSettings, Environment, GeocoderSettings,
    LogFormat, LoggingConfig, ServerConfig, StorageSettings, UploadSettings,
};
