use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use latchkey_core::{ApiKey, Credentials, LocalKeyId, LockSecret};

use crate::error::{RootError, RootResult};

/// Configuration for the inbound webhook receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Address the receiver binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port the receiver binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Disable the replay window on inbound deliveries. Only useful while
    /// registering, when the bridge sends test deliveries with arbitrary
    /// timestamps; leave off in normal operation.
    #[serde(default)]
    pub allow_any_timestamp: bool,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            allow_any_timestamp: false,
        }
    }
}

/// Top-level configuration for the latchkey binary.
///
/// Loaded from a TOML file (typically `~/.latchkey/config.toml`). The
/// credential fields hold the base64 forms handed out by the bridge's
/// setup flow; they are decoded per use and validated up front so a typo
/// fails before any network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatchkeyConfig {
    /// Bridge host (and optional port) on the local network.
    pub bridge_address: String,

    /// Base64 webhook API key.
    pub api_key: String,

    /// Pre-shared key slot on the lock (must fit in one byte).
    pub local_key_id: u64,

    /// Base64 HMAC secret for the key slot.
    pub lock_secret: String,

    /// Externally reachable base URL the bridge calls back on
    /// (e.g. `http://192.0.2.10:8080`).
    #[serde(default)]
    pub callback_base_url: String,

    /// Random path token for the callback endpoint, generated by `init`.
    /// Stable across restarts so reconciliation stays idempotent.
    #[serde(default)]
    pub webhook_token: String,

    /// Per-request bound for lock and webhook-management calls, seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    #[serde(default)]
    pub receiver: ReceiverConfig,
}

fn default_command_timeout() -> u64 {
    300
}

impl LatchkeyConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> RootResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(RootError::Io)?;
        let config: LatchkeyConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> RootResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RootError::Config(format!("TOML serialize error: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(RootError::Io)?;
        }
        std::fs::write(path, contents).map_err(RootError::Io)?;
        Ok(())
    }

    /// Validate configuration values, including that every credential
    /// decodes. Runs before any network traffic.
    pub fn validate(&self) -> RootResult<()> {
        if self.bridge_address.trim().is_empty() {
            return Err(RootError::Config("bridge_address must be set".into()));
        }
        ApiKey::from_base64(&self.api_key)
            .map_err(|_| RootError::Config("api_key is not valid base64".into()))?;
        LockSecret::from_base64(&self.lock_secret)
            .map_err(|_| RootError::Config("lock_secret is not valid base64".into()))?;
        LocalKeyId::try_from(self.local_key_id)
            .map_err(|_| RootError::Config("local_key_id must be 0-255".into()))?;
        if self.command_timeout_secs == 0 {
            return Err(RootError::Config("command_timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// Build the immutable credential set. `validate()` must have
    /// accepted this config, but decoding is still fallible by contract.
    pub fn credentials(&self) -> RootResult<Credentials> {
        Ok(Credentials::new(
            self.api_key()?,
            LocalKeyId::try_from(self.local_key_id)?,
            LockSecret::from_base64(&self.lock_secret)?,
        ))
    }

    pub fn api_key(&self) -> RootResult<ApiKey> {
        Ok(ApiKey::from_base64(&self.api_key)?)
    }

    /// The exact callback URL registered on the bridge. Reconciliation
    /// matches this string verbatim, so it is normalized here and nowhere
    /// else.
    pub fn callback_url(&self) -> String {
        format!(
            "{}/webhook/{}",
            self.callback_base_url.trim_end_matches('/'),
            self.webhook_token
        )
    }

    /// Generate the random callback path token written by `init`.
    pub fn generate_webhook_token() -> String {
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        use base64::Engine;
        use rand::RngCore;

        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Return the path to the default config file location.
    pub fn default_config_path() -> PathBuf {
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".latchkey/config.toml"))
            .unwrap_or_else(|_| PathBuf::from(".latchkey/config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> LatchkeyConfig {
        LatchkeyConfig {
            bridge_address: "192.0.2.7".into(),
            api_key: "YWJj".into(),
            local_key_id: 1,
            lock_secret: "c2VjcmV0".into(),
            callback_base_url: "http://192.0.2.10:8080".into(),
            webhook_token: "abcd1234".into(),
            command_timeout_secs: 300,
            receiver: ReceiverConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_from_toml_with_defaults() {
        let toml_str = r#"
bridge_address = "192.0.2.7"
api_key = "YWJj"
local_key_id = 2
lock_secret = "c2VjcmV0"
"#;
        let config: LatchkeyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.command_timeout_secs, 300);
        assert_eq!(config.receiver.bind, "0.0.0.0");
        assert_eq!(config.receiver.port, 8080);
        assert!(!config.receiver.allow_any_timestamp);
    }

    #[test]
    fn test_malformed_api_key_fails_validation() {
        let mut config = valid_config();
        config.api_key = "!!!".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_key_id_fails_validation() {
        let mut config = valid_config();
        config.local_key_id = 300;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_bridge_address_fails_validation() {
        let mut config = valid_config();
        config.bridge_address = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_credentials_roundtrip() {
        let creds = valid_config().credentials().unwrap();
        assert_eq!(creds.local_key_id.as_byte(), 1);
        assert_eq!(creds.lock_secret.as_bytes(), b"secret");
        assert_eq!(creds.api_key.as_bytes(), b"abc");
    }

    #[test]
    fn test_callback_url_normalizes_trailing_slash() {
        let mut config = valid_config();
        config.callback_base_url = "http://192.0.2.10:8080/".into();
        assert_eq!(
            config.callback_url(),
            "http://192.0.2.10:8080/webhook/abcd1234"
        );
    }

    #[test]
    fn test_generated_tokens_are_unique_and_url_safe() {
        let a = LatchkeyConfig::generate_webhook_token();
        let b = LatchkeyConfig::generate_webhook_token();
        assert_ne!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join("latchkey-test-config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.toml");

        let config = valid_config();
        config.save(&path).unwrap();
        let loaded = LatchkeyConfig::load(&path).unwrap();

        assert_eq!(loaded.bridge_address, config.bridge_address);
        assert_eq!(loaded.webhook_token, config.webhook_token);
        assert_eq!(loaded.local_key_id, config.local_key_id);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_never_serializes_decoded_secrets() {
        let rendered = toml::to_string_pretty(&valid_config()).unwrap();
        // Base64 transport forms are stored; decoded bytes never are.
        assert!(rendered.contains("c2VjcmV0"));
        assert!(!rendered.contains("secret = \"secret\""));
    }
}
