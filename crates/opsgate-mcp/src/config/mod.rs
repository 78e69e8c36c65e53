//! Configuration loading and resolution.
//!
//! Sources, lowest to highest precedence: built-in defaults, a TOML config
//! file (`opsgate.toml` in the working directory unless a path is given),
//! environment variables, CLI flags. Credentials come from the file or the
//! environment, never from flags.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use opsgate_client::UpstreamConfig;

const DEFAULT_CONFIG_FILE: &str = "opsgate.toml";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CALL_DEADLINE_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream management API credentials and endpoints.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Tool call deadline in seconds.
    pub call_deadline_secs: u64,

    /// Accept requests for session ids the registry has never seen.
    pub permissive_sessions: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            call_deadline_secs: DEFAULT_CALL_DEADLINE_SECS,
            permissive_sessions: false,
        }
    }
}

impl GatewayConfig {
    /// Load from an explicit path, or from `opsgate.toml` when present, then
    /// apply environment overrides. A missing default file is not an error;
    /// a missing explicit file is.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))
    }

    /// Environment overrides. `PORT` and `DEBUG` are kept for parity with
    /// existing deployments; the `OPSGATE_*` names are the documented ones.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("OPSGATE_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("OPSGATE_PORT").or_else(|_| std::env::var("PORT")) {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(deadline) = std::env::var("OPSGATE_CALL_DEADLINE_SECS") {
            if let Ok(deadline) = deadline.parse() {
                self.server.call_deadline_secs = deadline;
            }
        }
        if let Ok(debug) = std::env::var("DEBUG") {
            self.server.permissive_sessions = matches!(debug.as_str(), "true" | "1" | "yes");
        }

        if let Ok(url) = std::env::var("OPSGATE_TENANT_URL") {
            self.upstream.tenant_url = url;
        }
        if let Ok(url) = std::env::var("OPSGATE_AUTH_URL") {
            self.upstream.auth_url = url;
        }
        if let Ok(key) = std::env::var("OPSGATE_AUTH_KEY") {
            self.upstream.auth_key = key;
        }
        if let Ok(secret) = std::env::var("OPSGATE_AUTH_SECRET") {
            self.upstream.auth_secret = secret;
        }
        if let Ok(tenant) = std::env::var("OPSGATE_TENANT_ID") {
            self.upstream.tenant_id = tenant;
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether upstream credentials are present. The gateway still serves
    /// the protocol surface without them; tool calls will fail upstream.
    pub fn has_upstream_credentials(&self) -> bool {
        !self.upstream.auth_key.is_empty() && !self.upstream.auth_secret.is_empty()
    }
}
