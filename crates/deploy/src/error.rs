//! Error taxonomy for a deployment run.

use std::path::PathBuf;

use alloy_core::primitives::Address;

pub type Result<T, E = DeployError> = std::result::Result<T, E>;

/// Every failure a run can end with. None of them is recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Registry, artifact or credential missing or malformed.
    #[error("configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The operator picked an ordinal that does not name a network.
    #[error("invalid {role} network selection {ordinal}: expected a number between 1 and {max}")]
    Selection {
        role: String,
        ordinal: i64,
        max: usize,
    },

    /// The prompt could not produce an ordinal at all.
    #[error("no {role} network selected: {reason}")]
    NoSelection { role: String, reason: String },

    /// RPC, signing or on-chain failure while deploying one contract.
    #[error("failed to deploy {contract} on {network} (chain {chain_id}): {source:#}")]
    Deployment {
        contract: String,
        network: String,
        chain_id: u64,
        #[source]
        source: anyhow::Error,
    },

    /// The ledger file exists but is not a well-formed ledger.
    #[error("deployment ledger {} is corrupt: {source}", path.display())]
    LedgerCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The ledger could not be read or written.
    #[error("failed to persist deployment ledger {}: {source:#}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The sender is live on-chain but the receiver failed, so the run
    /// records nothing.
    #[error(
        "sender deployed but NOT recorded, record it manually: \
         sender {sender} on chain {sender_chain_id}: {source}"
    )]
    Orphaned {
        sender: Address,
        sender_chain_id: u64,
        #[source]
        source: Box<DeployError>,
    },

    /// Both contracts are live on-chain but their addresses could not be recorded.
    #[error(
        "contracts deployed but NOT recorded, record them manually: \
         sender {sender} on chain {sender_chain_id}, receiver {receiver} on chain {receiver_chain_id}: {source}"
    )]
    Unrecorded {
        sender: Address,
        sender_chain_id: u64,
        receiver: Address,
        receiver_chain_id: u64,
        #[source]
        source: Box<DeployError>,
    },
}

impl DeployError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_with(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}
