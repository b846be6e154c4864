//! Configuration
//!
//! Initialization and per-call options. Wire names stay camelCase so the
//! hand-off body of a detached client deserializes directly.

use serde::{Deserialize, Serialize};

/// Default companion endpoint port.
pub const DEFAULT_SERVER_PORT: u16 = 5001;

/// Default output artifact path.
pub const DEFAULT_OUTPUT_FILE: &str = "error-context.json";

/// Options for [`crate::Contextualizer::initialize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitOptions {
    /// Record a companion endpoint base URL for detached hand-off.
    pub enable_server: bool,
    /// Port of the companion endpoint.
    pub server_port: u16,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            enable_server: true,
            server_port: DEFAULT_SERVER_PORT,
        }
    }
}

impl InitOptions {
    /// Base URL of the companion endpoint, when enabled.
    #[must_use]
    pub fn server_url(&self) -> Option<String> {
        self.enable_server.then(|| format!("http://localhost:{}", self.server_port))
    }
}

/// Options for a single contextualization call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextualizeOptions {
    /// Path the JSON artifact is written to. Overwritten if present.
    pub output_file: String,
}

impl Default for ContextualizeOptions {
    fn default() -> Self {
        Self {
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}
