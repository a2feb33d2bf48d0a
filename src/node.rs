//! Node orchestration: locks, timer tasks, gossip fan-out and consensus.
//!
//! Two disjoint locks per node: the chain/pool mutex, held for the whole of
//! a mint, and the neighbors lock, touched only by discovery refreshes and
//! gossip fan-outs. Timer tasks reschedule themselves after each completed
//! run, so only one instance of each is ever live.

use crate::block::Block;
use crate::blockchain::Blockchain;
use crate::config::Config;
use crate::discovery;
use crate::error::ChainError;
use crate::network::PeerClient;
use crate::transaction::{TransactionRequest, COINBASE_SENDER};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

/// Minimum seconds between the starts of consecutive mints.
pub const MINING_INTERVAL_SECS: u64 = 20;
/// Minimum seconds between neighbor list refreshes.
pub const NEIGHBOR_SYNC_INTERVAL_SECS: u64 = 20;

pub struct Node {
    config: Config,
    blockchain: Arc<Mutex<Blockchain>>,
    neighbors: Arc<RwLock<Vec<String>>>,
    peers: PeerClient,
    is_mining: AtomicBool,
}

impl Node {
    pub fn new(config: Config) -> Result<Arc<Self>, ChainError> {
        let blockchain = Blockchain::new(config.miner.blockchain_address.clone());
        Ok(Arc::new(Node {
            blockchain: Arc::new(Mutex::new(blockchain)),
            neighbors: Arc::new(RwLock::new(Vec::new())),
            peers: PeerClient::new()?,
            is_mining: AtomicBool::new(false),
            config,
        }))
    }

    pub fn blockchain(&self) -> &Arc<Mutex<Blockchain>> {
        &self.blockchain
    }

    pub async fn neighbors(&self) -> Vec<String> {
        self.neighbors.read().await.clone()
    }

    /// Replaces the neighbor list. Discovery calls this; tests may too.
    pub async fn set_neighbors(&self, neighbors: Vec<String>) {
        info!(?neighbors, "neighbor list refreshed");
        let mut guard = self.neighbors.write().await;
        *guard = neighbors;
    }

    /// One discovery round: scan the configured LAN ranges and install the
    /// result.
    pub async fn sync_neighbors(&self) {
        let network = &self.config.network;
        let found = discovery::find_neighbors(
            &network.host,
            network.port,
            (network.neighbor_ip_range_start, network.neighbor_ip_range_end),
            (
                network.neighbor_port_range_start,
                network.neighbor_port_range_end,
            ),
        )
        .await;
        self.set_neighbors(found).await;
    }

    /// Schedules the periodic neighbor refresh. The caller is expected to
    /// have run `sync_neighbors` once already; this loop waits a full
    /// interval before its first pass.
    pub fn start_neighbor_sync(self: &Arc<Self>) {
        let node = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                sleep(Duration::from_secs(NEIGHBOR_SYNC_INTERVAL_SECS)).await;
                node.sync_neighbors().await;
            }
        });
    }

    /// Peer-originated add: validate and pool, no further gossip.
    pub async fn add_transaction(&self, request: &TransactionRequest) -> Result<(), ChainError> {
        if request.sender_blockchain_address == COINBASE_SENDER {
            return Err(ChainError::InvalidTransaction(
                "coinbase transactions are minted locally".to_string(),
            ));
        }
        let public_key = request.sender_public_key()?;
        let signature = request.parse_signature()?;
        let transaction = request.transaction();

        let mut blockchain = self.blockchain.lock().await;
        blockchain.add_transaction(transaction, Some(&public_key), Some(&signature))
    }

    /// Wallet-originated create: add locally, then gossip the envelope to
    /// every known neighbor.
    pub async fn create_transaction(&self, request: TransactionRequest) -> Result<(), ChainError> {
        self.add_transaction(&request).await?;
        for neighbor in self.neighbors().await {
            self.peers.share_transaction(&neighbor, &request).await;
        }
        Ok(())
    }

    pub async fn clear_transaction_pool(&self) {
        self.blockchain.lock().await.clear_transaction_pool();
    }

    /// One mint under the chain lock, then fire-and-forget notifications:
    /// peers drop their pools and run their own consensus round.
    pub async fn mine(&self) -> Block {
        let sealed = {
            let mut blockchain = self.blockchain.lock().await;
            blockchain.mining()
        };
        info!(
            nonce = sealed.nonce,
            hash = %sealed.hash_hex(),
            "action=mining status=success"
        );

        for neighbor in self.neighbors().await {
            self.peers.clear_transaction_pool(&neighbor).await;
            self.peers.request_consensus(&neighbor).await;
        }
        sealed
    }

    /// Begins the periodic mining loop. Only one loop is ever live; a second
    /// start reports `MiningAlreadyRunning`.
    pub fn start_mining(self: &Arc<Self>) -> Result<(), ChainError> {
        if self
            .is_mining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ChainError::MiningAlreadyRunning);
        }

        let node = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                node.mine().await;
                sleep(Duration::from_secs(MINING_INTERVAL_SECS)).await;
            }
        });
        Ok(())
    }

    /// Longest-valid-chain fork resolution. Every peer chain is fetched
    /// without the lock; the lock is then taken once to compare lengths,
    /// validate, and install the winner. Equal length keeps the local chain.
    pub async fn resolve_conflicts(&self) -> bool {
        let mut candidates = Vec::new();
        for neighbor in self.neighbors().await {
            if let Some(chain) = self.peers.fetch_chain(&neighbor).await {
                candidates.push(chain);
            }
        }
        candidates.sort_unstable_by_key(|chain| Reverse(chain.len()));

        let mut blockchain = self.blockchain.lock().await;
        let replaced = candidates
            .into_iter()
            .any(|candidate| blockchain.replace_chain(candidate));
        drop(blockchain);

        if replaced {
            info!("resolve conflicts: replaced");
        } else {
            info!("resolve conflicts: not replaced");
        }
        replaced
    }

    /// Bootstrap order: one synchronous neighbor scan, the periodic refresh,
    /// one consensus round to align with the network, then mining.
    pub async fn run(self: &Arc<Self>) {
        self.sync_neighbors().await;
        self.start_neighbor_sync();
        self.resolve_conflicts().await;

        if self.config.miner.enabled {
            if let Err(e) = self.start_mining() {
                warn!(error = %e, "mining loop not started");
            }
        }
    }
}
