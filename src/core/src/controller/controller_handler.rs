use std::net::SocketAddr;
use std::sync::Arc;

use log::{info, warn};

use crate::auth_gate::AuthGate;
use crate::configuration::config::{Configuration, SecretSource};
use crate::error_handling::types::*;
use crate::screenshot_channel::ScreenshotChannel;
use crate::web_interface::WebServer;
use crate::work_queue::AckHandshake;

/// Wires the core objects together and runs the HTTP boundary.
///
/// All shared state is created here and handed to the web server; there
/// are no process-wide singletons.
pub struct Controller {
    pub secret_source: SecretSource,
    queue: Arc<AckHandshake>,
    screenshots: Arc<ScreenshotChannel>,
    web_server: WebServer,
    addr: SocketAddr,
}

impl Controller {
    pub fn new(config: Configuration) -> Result<Self, ControllerError> {
        config.validate()?;
        let addr = config.socket_addr()?;

        let (secret, secret_source) = config.resolve_secret();
        match secret_source {
            SecretSource::Configured => info!("Secret key loaded: Yes"),
            // Shown once so the operator can use it; never logged otherwise.
            SecretSource::Generated => warn!("No secret key configured, generated: {}", secret),
        }
        let auth = AuthGate::with_secret(secret)
            .map_err(|e| ControllerError::InitializationFailed(e.to_string()))?;

        let queue = Arc::new(AckHandshake::new());
        let screenshots = Arc::new(ScreenshotChannel::new(config.screenshot_capacity));
        let web_server = WebServer::new(
            auth,
            queue.clone(),
            screenshots.clone(),
            config.gallery_size,
            config.max_upload_bytes,
        );

        Ok(Self {
            secret_source,
            queue,
            screenshots,
            web_server,
            addr,
        })
    }

    pub fn queue(&self) -> &Arc<AckHandshake> {
        &self.queue
    }

    pub fn screenshots(&self) -> &Arc<ScreenshotChannel> {
        &self.screenshots
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves requests until the process is stopped.
    pub async fn run(&self) -> Result<(), ControllerError> {
        info!(
            "Starting handoff server (screenshot capacity {})",
            self.screenshots.capacity()
        );
        self.web_server.start(self.addr).await?;
        info!("Web server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::work_queue::HandshakeState;
    use serial_test::serial;

    fn config(extra: &[&str]) -> Configuration {
        let mut args = vec!["handoff", "--bind-address", "127.0.0.1", "--port", "0"];
        args.extend_from_slice(extra);
        Configuration::load_from(args).unwrap_or_else(|e| panic!("{}", e))
    }

    #[test]
    #[serial]
    fn test_new_with_configured_secret() {
        let controller = Controller::new(config(&["--secret-key", "abc"])).unwrap();
        assert_eq!(controller.secret_source, SecretSource::Configured);
        assert_eq!(controller.addr(), "127.0.0.1:0".parse::<SocketAddr>().unwrap());
        assert_eq!(controller.queue().handshake_state(), HandshakeState::Unlocked);
        assert!(controller.screenshots().is_empty());
    }

    #[test]
    #[serial]
    fn test_new_generates_secret_when_blank() {
        let controller = Controller::new(config(&["--secret-key", ""])).unwrap();
        assert_eq!(controller.secret_source, SecretSource::Generated);
    }

    #[test]
    #[serial]
    fn test_new_rejects_invalid_config() {
        let mut bad = config(&["--secret-key", "abc"]);
        bad.screenshot_capacity = 0;
        assert!(matches!(
            Controller::new(bad),
            Err(ControllerError::ConfigurationError(_))
        ));
    }
}
