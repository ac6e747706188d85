use handoff::configuration::config::Configuration;
use handoff::controller::controller_handler::Controller;
use log::{error, info};

#[tokio::main]
async fn main() {
    // Before the logger, so RUST_LOG may come from .env as well.
    let dotenv = dotenvy::dotenv();

    // Level defaults to Info; RUST_LOG overrides it.
    // https://docs.rs/env_logger/latest/env_logger/
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_target(false)
        .init();

    println!(
        "
==============================================================================
                    handoff v{} - acknowledged work handoff
==============================================================================
",
        env!("CARGO_PKG_VERSION")
    );

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => error!("Unable to read .env file: {}", e),
    }

    info!("Importing configuration");

    let config = match Configuration::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Unable to import configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration imported successfully");

    let controller = match Controller::new(config) {
        Ok(controller) => controller,
        Err(e) => {
            error!("Unable to create a controller instance: {}, exiting...", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = controller.run().await {
        error!("Error occured in the controller process: {}, exiting...", e);
        std::process::exit(1);
    }
}
