#![forbid(unsafe_code)]

use ironchain::api;
use ironchain::config::load_config;
use ironchain::crypto::KeyPair;
use ironchain::node::Node;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut config = load_config()?;
    if config.miner.blockchain_address.is_empty() {
        let keypair = KeyPair::generate();
        info!(address = %keypair.address(), "generated ephemeral mining reward address");
        config.miner.blockchain_address = keypair.address();
    }

    let port = config.network.port;
    info!(port, address = %config.miner.blockchain_address, "starting ironchain node");

    let node = Node::new(config)?;
    node.run().await;
    api::run_api_server(node, port).await?;
    Ok(())
}
