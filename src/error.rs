//! Error types for ironchain

use std::fmt;

#[derive(Debug, Clone)]
pub enum ChainError {
    InvalidSignature,
    InsufficientBalance { balance: f32, value: f32 },
    InvalidTransaction(String),
    InvalidChain(String),
    CryptoError(String),
    NetworkError(String),
    ConfigError(String),
    MiningAlreadyRunning,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::InvalidSignature => write!(f, "Transaction signature verification failed"),
            ChainError::InsufficientBalance { balance, value } => {
                write!(f, "Not enough balance in a wallet: {} < {}", balance, value)
            }
            ChainError::InvalidTransaction(msg) => write!(f, "Invalid transaction: {}", msg),
            ChainError::InvalidChain(msg) => write!(f, "Invalid chain: {}", msg),
            ChainError::CryptoError(msg) => write!(f, "Cryptographic error: {}", msg),
            ChainError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::MiningAlreadyRunning => write!(f, "Mining is already running"),
        }
    }
}

impl std::error::Error for ChainError {}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
