use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::info;
use serde::Deserialize;
use uuid::Uuid;

use crate::error_handling::types::ConfigError;
use crate::screenshot_channel::DEFAULT_CAPACITY;

/// Default number of screenshots rendered by the gallery.
pub const DEFAULT_GALLERY_SIZE: usize = 12;
/// Default request body limit for screenshot uploads (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Runtime configuration of the handoff server.
///
/// Values come from the command line, from environment variables for the
/// fields that declare one (`.env` files are loaded beforehand by the
/// binary), and finally from an optional TOML file given with `--config`.
/// Keys present in the file win over the command line.
///
/// # Fields Overview
///
/// - `secret_key`: the shared credential. When absent a random one is
///   generated at startup, see [`Configuration::resolve_secret`]
/// - `bind_address` / `port`: where the HTTP server listens
/// - `screenshot_capacity`: how many uploaded screenshots are retained
/// - `gallery_size`: how many screenshots the gallery shows by default
/// - `max_upload_bytes`: body size limit for screenshot uploads
#[derive(Parser, Debug, Clone)]
#[command(name = "handoff")]
#[command(version)]
#[command(about = "Handoff queue with explicit acknowledgement locking")]
pub struct Configuration {
    /// Shared secret required by every operation.
    ///
    /// # Command Line
    /// Use `--secret-key <KEY>` or the `SECRET_KEY` environment variable
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// IP address the HTTP server binds to.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind_address: String,

    /// TCP port of the HTTP server.
    ///
    /// # Command Line
    /// Use `--port <PORT>` or the `PORT` environment variable
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Maximum number of screenshots kept in memory. The oldest one is
    /// dropped when a new upload arrives at capacity.
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub screenshot_capacity: usize,

    /// Number of screenshots shown by the gallery when no limit is given.
    #[arg(long, default_value_t = DEFAULT_GALLERY_SIZE)]
    pub gallery_size: usize,

    /// Largest accepted screenshot upload body, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: u64,

    /// Optional TOML file overriding the values above.
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,
}

/// Where the active secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretSource {
    Configured,
    Generated,
}

/// Keys accepted in the TOML configuration file. All are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfiguration {
    secret_key: Option<String>,
    bind_address: Option<String>,
    port: Option<u16>,
    screenshot_capacity: Option<usize>,
    gallery_size: Option<usize>,
    max_upload_bytes: Option<u64>,
}

impl Configuration {
    /// Parses the process arguments, applies the `--config` file if any and
    /// validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        Self::finish(Configuration::parse())
    }

    /// Same as [`Configuration::load`] with explicit arguments.
    pub fn load_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Configuration::try_parse_from(args)
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        Self::finish(config)
    }

    fn finish(mut config: Configuration) -> Result<Self, ConfigError> {
        if let Some(path) = config.config_file.clone() {
            config.apply_file(&path)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Overlays the keys present in the TOML file at `path`.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = fs::read_to_string(path)?;
        let file: FileConfiguration =
            toml::from_str(&content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        info!("Applying configuration file {}", path.display());

        if let Some(secret_key) = file.secret_key {
            self.secret_key = Some(secret_key);
        }
        if let Some(bind_address) = file.bind_address {
            self.bind_address = bind_address;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(capacity) = file.screenshot_capacity {
            self.screenshot_capacity = capacity;
        }
        if let Some(gallery_size) = file.gallery_size {
            self.gallery_size = gallery_size;
        }
        if let Some(max_upload_bytes) = file.max_upload_bytes {
            self.max_upload_bytes = max_upload_bytes;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screenshot_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "screenshot_capacity must be at least 1".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue(
                "max_upload_bytes must be at least 1".to_string(),
            ));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.bind_address.trim().parse().map_err(|_| {
            ConfigError::InvalidValue(format!("bad bind address '{}'", self.bind_address))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Returns the configured secret, or a freshly generated one when none
    /// (or a blank one) was provided.
    ///
    /// A configured secret is used byte for byte; surrounding whitespace is
    /// part of the key.
    pub fn resolve_secret(&self) -> (String, SecretSource) {
        match self.secret_key.as_deref() {
            Some(key) if !key.trim().is_empty() => (key.to_string(), SecretSource::Configured),
            _ => (Uuid::new_v4().simple().to_string(), SecretSource::Generated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn clear_env() {
        std::env::remove_var("SECRET_KEY");
        std::env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Configuration::load_from(["handoff"]).unwrap_or_else(|e| panic!("{}", e));

        assert_eq!(config.secret_key, None);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.screenshot_capacity, DEFAULT_CAPACITY);
        assert_eq!(config.gallery_size, DEFAULT_GALLERY_SIZE);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    #[serial]
    fn test_from_args() {
        clear_env();
        let config = Configuration::load_from([
            "handoff",
            "--secret-key",
            "abc",
            "--bind-address",
            "127.0.0.1",
            "--port",
            "8080",
            "--screenshot-capacity",
            "3",
        ])
        .unwrap_or_else(|e| panic!("{}", e));

        assert_eq!(config.secret_key.as_deref(), Some("abc"));
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.screenshot_capacity, 3);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        std::env::set_var("SECRET_KEY", "from-env");
        std::env::set_var("PORT", "7000");
        let config = Configuration::load_from(["handoff"]);
        clear_env();

        let config = config.unwrap_or_else(|e| panic!("{}", e));
        assert_eq!(config.secret_key.as_deref(), Some("from-env"));
        assert_eq!(config.port, 7000);
        assert_eq!(config.resolve_secret().1, SecretSource::Configured);
    }

    #[test]
    #[serial]
    fn test_file_overrides_args() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "secret_key = \"file-secret\"").unwrap();
        writeln!(file, "port = 9001").unwrap();
        writeln!(file, "gallery_size = 4").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = Configuration::load_from([
            "handoff",
            "--port",
            "8080",
            "--secret-key",
            "cli",
            "--config",
            path.as_str(),
        ])
        .unwrap_or_else(|e| panic!("{}", e));

        assert_eq!(config.secret_key.as_deref(), Some("file-secret"));
        assert_eq!(config.port, 9001);
        assert_eq!(config.gallery_size, 4);
        assert_eq!(config.bind_address, "0.0.0.0");
    }

    #[test]
    #[serial]
    fn test_file_with_unknown_key_is_rejected() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sekret = \"typo\"").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let result = Configuration::load_from(["handoff", "--config", path.as_str()]);
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    #[serial]
    fn test_missing_file_is_io_error() {
        clear_env();
        let result =
            Configuration::load_from(["handoff", "--config", "/nonexistent/handoff.toml"]);
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    #[serial]
    fn test_validation_rejects_bad_values() {
        clear_env();
        let result = Configuration::load_from(["handoff", "--screenshot-capacity", "0"]);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));

        let result = Configuration::load_from(["handoff", "--bind-address", "localhost:80"]);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    #[serial]
    fn test_resolve_secret_generates_when_blank() {
        clear_env();
        let config = Configuration::load_from(["handoff", "--secret-key", "  "]).unwrap();
        let (secret, source) = config.resolve_secret();
        assert_eq!(source, SecretSource::Generated);
        assert_eq!(secret.len(), 32);

        let (other, _) = config.resolve_secret();
        assert_ne!(secret, other);
    }

    #[test]
    #[serial]
    fn test_resolve_secret_keeps_surrounding_whitespace() {
        clear_env();
        let config = Configuration::load_from(["handoff", "--secret-key", " abc "]).unwrap();
        let (secret, source) = config.resolve_secret();
        assert_eq!(source, SecretSource::Configured);
        assert_eq!(secret, " abc ");
    }
}
