//! Infrastructure layer for codechat: configuration file and log locations.

pub mod config_service;
pub mod paths;

pub use config_service::ConfigService;
pub use paths::CodechatPaths;
