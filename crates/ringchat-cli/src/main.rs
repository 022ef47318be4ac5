//! Ringchat CLI entry point

use clap::Parser;
use tracing::info;

use ringchat_cli::{cli::Cli, config::AppConfig, error::Result};
use ringchat_core::{ChatLog, RingNode};
use ringchat_runtime::{FaultInjector, FileLogStore, NodeRuntime, UdpMulticastTransport};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let mut config = load_configuration(&cli)?;
    config.apply_overrides(&cli);

    let name = config.node_name();
    info!(node = %name, "initializing");

    // Staggered starts let a designated bootstrap node form the network
    // before the others ask to join it.
    let delay = config.startup_delay();
    if !delay.is_zero() {
        info!(?delay, "delaying startup");
        tokio::time::sleep(delay).await;
    }

    let store = FileLogStore::open(config.log_path(&name))?;
    let log = ChatLog::open(Box::new(store));
    info!(messages = log.len(), "loaded durable chat log");

    let node = RingNode::new(name, config.protocol_config(), log);

    // Failure to acquire the transport is the one startup error that
    // terminates the process.
    let transport =
        UdpMulticastTransport::open(config.network.multicast_group, config.network.port).await?;

    let faults = FaultInjector::new(config.faults.drop_probability, config.max_fault_delay());

    let (runtime, handle) = NodeRuntime::new(node, transport, faults);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.shutdown().await;
        }
    });

    let node = runtime.run().await?;
    info!(messages = node.log().len(), "node stopped");
    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
}

/// Load configuration from file or use defaults
fn load_configuration(cli: &Cli) -> Result<AppConfig> {
    if let Some(config_path) = &cli.config {
        info!(path = %config_path.display(), "loading configuration");
        AppConfig::load_from_file(config_path)
    } else {
        Ok(AppConfig::default())
    }
}
