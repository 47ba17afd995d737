//! Process configuration, resolved once at startup.

use std::path::PathBuf;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TEMPLATE: &str = "template.pptx";

/// Runtime settings for the server binary.
///
/// Read from the environment (after `.env` loading) at startup; request
/// handlers never consult the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address, from `DECK_ADDR`.
    pub bind_addr: String,
    /// Template document path, from `DECK_TEMPLATE`.
    pub template_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            template_path: PathBuf::from(DEFAULT_TEMPLATE),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("DECK_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.into()),
            template_path: std::env::var("DECK_TEMPLATE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TEMPLATE)),
        }
    }
}
