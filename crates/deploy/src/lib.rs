//! xchain-deploy - Deployment library for paired cross-chain contracts.
//!
//! This crate deploys a sender contract on a source network and a receiver
//! contract on a target network, and records both addresses in a JSON ledger
//! keyed by chain id.

mod artifact;
pub use artifact::{BuildArtifact, ContractKind, DEFAULT_ARTIFACTS_DIR};

mod builder;
pub use builder::OrchestratorBuilder;

mod deployer;
pub use deployer::{ContractDeployer, PRIVATE_KEY_ENV, RpcDeployer, signer_from_key};

mod error;
pub use error::{DeployError, Result};

mod ledger;
pub use ledger::{
    DEFAULT_LEDGER_PATH, DeploymentLedger, DeploymentRecord, LedgerStore, PartialRecord,
    format_timestamp,
};

mod orchestrator;
pub use orchestrator::{Clock, Deployment, Orchestrator, RunState, RunSummary, SystemClock};

mod registry;
pub use registry::{DEFAULT_CONFIG_PATH, NetworkConfig, load_networks, parse_networks};

mod selector;
pub use selector::{LinePrompt, Prompt, Role, resolve_selection, select_network};
