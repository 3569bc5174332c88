//! meshchat - interactive custom-channel chat over a serial mesh radio

use clap::Parser;
use tracing::{error, info, warn};

use meshchat_cli::{
    cli::Cli,
    config::AppConfig,
    error::Result,
    terminal::{StdinLineSource, StdoutSink},
};
use meshchat_core::run_session;
use meshchat_serial::SerialDevice;

#[tokio::main]
async fn main() {
    // A missing or malformed argument is a usage failure, exit code 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };

    // Initialize logging
    setup_logging(cli.verbose);

    // Load configuration
    let config = match load_configuration(&cli) {
        Ok(config) => config,
        Err(err) => {
            error!("Failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };

    // Open the serial connection; failure here is fatal.
    let port = cli.port.trim().to_string();
    println!("Attempting to connect to mesh device at serial port: {port}");
    let (device, events) =
        match SerialDevice::open(&port, config.session.event_queue_capacity).await {
            Ok(pair) => pair,
            Err(err) => {
                error!("Failed to initialize serial connection: {}", err);
                eprintln!("Error initializing serial connection: {err}");
                std::process::exit(1);
            }
        };
    println!("Connected to mesh device over serial!");

    println!(
        "Setting custom channel {} config ({} + custom PSK)...",
        config.channel.index, config.channel.name
    );
    banner();

    // Run the chat session until Ctrl+C or end of input.
    let options = config.session_options();
    let outcome = run_session(
        device,
        events,
        StdoutSink,
        StdinLineSource,
        shutdown_signal(),
        options,
    )
    .await;

    println!("\nExiting...");
    if let Err(err) = outcome {
        error!("Session ended with an error: {}", err);
        std::process::exit(1);
    }
    info!("meshchat exited successfully");
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // Logs go to stderr; stdout belongs to the chat transcript.
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults
fn load_configuration(cli: &Cli) -> Result<AppConfig> {
    if let Some(config_path) = &cli.config {
        info!("Loading configuration from: {}", config_path);
        AppConfig::load_from_file(config_path)
    } else {
        info!("Using default configuration");
        Ok(AppConfig::default())
    }
}

fn banner() {
    println!();
    println!(
        "Serial Interactive Mesh Custom Channel Chat Client {}",
        env!("CARGO_PKG_VERSION")
    );
    println!("--------------------------------------------------------------");
    println!("Type your message and press Enter to send.");
    println!("Press Ctrl+C to exit...\n");
}

/// Resolves when the user interrupts the session.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        // Without a signal handler the session can still end via EOF.
        warn!("Failed to listen for Ctrl+C: {}", err);
        std::future::pending::<()>().await;
    }
}
