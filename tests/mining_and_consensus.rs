//! End-to-end mining, gossip, and fork-resolution tests across real nodes.

use ironchain::api::build_router;
use ironchain::blockchain::Blockchain;
use ironchain::config::Config;
use ironchain::crypto::KeyPair;
use ironchain::node::Node;
use ironchain::transaction::{Transaction, TransactionRequest};
use std::sync::Arc;

fn test_node(reward_address: &str) -> Arc<Node> {
    let mut config = Config::default();
    config.miner.blockchain_address = reward_address.to_string();
    config.miner.enabled = false;
    Node::new(config).expect("node construction")
}

/// Serves a node's router on an ephemeral port and returns its `host:port`.
async fn serve(node: Arc<Node>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, build_router(node))
            .await
            .expect("serve");
    });
    format!("127.0.0.1:{}", addr.port())
}

fn signed_request(keypair: &KeyPair, recipient: &str, value: f32) -> TransactionRequest {
    let transaction = Transaction::new(&keypair.address(), recipient, value);
    let signature = keypair.sign(&transaction.canonical_bytes());
    TransactionRequest {
        sender_blockchain_address: transaction.sender_blockchain_address,
        recipient_blockchain_address: transaction.recipient_blockchain_address,
        sender_public_key: keypair.public_key_hex(),
        value,
        signature: signature.to_hex(),
    }
}

#[tokio::test]
async fn test_mine_broadcast_reaches_no_one_without_neighbors() {
    let node = test_node("0xA");
    let sealed = node.mine().await;

    assert!(sealed.hash_hex().starts_with("000"));
    let blockchain = node.blockchain().lock().await;
    assert_eq!(blockchain.chain().len(), 2);
    assert_eq!(blockchain.calculate_total_amount("0xA"), 1.0);
}

#[tokio::test]
async fn test_resolve_conflicts_adopts_strictly_longer_chain() {
    let local = test_node("local");
    local.mine().await;

    let remote = test_node("remote");
    remote.mine().await;
    remote.mine().await;
    let remote_chain = remote.blockchain().lock().await.chain().to_vec();

    let peer = serve(remote).await;
    local.set_neighbors(vec![peer]).await;

    assert!(local.resolve_conflicts().await);
    let blockchain = local.blockchain().lock().await;
    assert_eq!(blockchain.chain().len(), 3);
    assert_eq!(blockchain.chain(), &remote_chain[..]);
}

#[tokio::test]
async fn test_resolve_conflicts_keeps_chain_on_tie() {
    let local = test_node("local");
    local.mine().await;
    let before = local.blockchain().lock().await.chain().to_vec();

    let remote = test_node("remote");
    remote.mine().await;

    let peer = serve(remote).await;
    local.set_neighbors(vec![peer]).await;

    assert!(!local.resolve_conflicts().await);
    let blockchain = local.blockchain().lock().await;
    assert_eq!(blockchain.chain(), &before[..]);
}

#[tokio::test]
async fn test_resolve_conflicts_never_shrinks_chain() {
    let local = test_node("local");
    local.mine().await;
    local.mine().await;

    let peer = serve(test_node("remote")).await;
    local.set_neighbors(vec![peer]).await;

    assert!(!local.resolve_conflicts().await);
    assert_eq!(local.blockchain().lock().await.chain().len(), 3);
}

#[tokio::test]
async fn test_unreachable_peer_is_skipped() {
    let local = test_node("local");
    local
        .set_neighbors(vec!["127.0.0.1:1".to_string()])
        .await;

    assert!(!local.resolve_conflicts().await);
    assert_eq!(local.blockchain().lock().await.chain().len(), 1);
}

#[tokio::test]
async fn test_transaction_gossip_and_post_mint_broadcasts() {
    let keypair = KeyPair::generate();

    // Node A mints the sender's funds; node B starts from genesis.
    let node_a = test_node(&keypair.address());
    let node_b = test_node("0xB-miner");
    node_a.mine().await;

    let addr_a = serve(Arc::clone(&node_a)).await;
    let addr_b = serve(Arc::clone(&node_b)).await;
    node_a.set_neighbors(vec![addr_b]).await;
    node_b.set_neighbors(vec![addr_a]).await;

    // B aligns with A's chain so it can price the sender's balance.
    assert!(node_b.resolve_conflicts().await);
    assert_eq!(node_b.blockchain().lock().await.chain().len(), 2);

    // A wallet-originated create on A lands in B's pool through gossip.
    node_a
        .create_transaction(signed_request(&keypair, "0xRecipient", 0.5))
        .await
        .expect("funded transfer accepted");
    assert_eq!(node_a.blockchain().lock().await.transaction_pool().len(), 1);
    assert_eq!(node_b.blockchain().lock().await.transaction_pool().len(), 1);

    // A's next mint clears B's pool and drives B's consensus round.
    node_a.mine().await;

    let blockchain_b = node_b.blockchain().lock().await;
    assert!(blockchain_b.transaction_pool().is_empty());
    assert_eq!(blockchain_b.chain().len(), 3);
    assert_eq!(blockchain_b.calculate_total_amount("0xRecipient"), 0.5);
    drop(blockchain_b);

    let blockchain_a = node_a.blockchain().lock().await;
    assert_eq!(blockchain_a.chain().len(), 3);
    assert!(Blockchain::valid_chain(blockchain_a.chain()));
}

#[tokio::test]
async fn test_start_mining_twice_reports_already_running() {
    let node = test_node("0xA");
    assert!(node.start_mining().is_ok());
    assert!(matches!(
        node.start_mining(),
        Err(ironchain::error::ChainError::MiningAlreadyRunning)
    ));
}
