//! Builder module for creating an [`Orchestrator`].
//!
//! The builder resolves file locations and loads the static inputs of a run
//! (network registry and both build artifacts), so that any configuration
//! problem is reported before the operator is prompted or a network is
//! contacted.

use std::path::PathBuf;

use crate::{
    artifact::{BuildArtifact, ContractKind, DEFAULT_ARTIFACTS_DIR},
    deployer::ContractDeployer,
    error::Result,
    ledger::{DEFAULT_LEDGER_PATH, LedgerStore},
    orchestrator::Orchestrator,
    registry::{DEFAULT_CONFIG_PATH, load_networks},
    selector::Prompt,
};

/// Builder for creating an [`Orchestrator`].
///
/// # Example
///
/// ```no_run
/// use xchain_deploy::{LinePrompt, OrchestratorBuilder, RpcDeployer, signer_from_key};
///
/// # async fn example() -> anyhow::Result<()> {
/// let deployer = RpcDeployer::new(signer_from_key(&std::env::var("PRIVATE_KEY")?)?);
/// let mut orchestrator = OrchestratorBuilder::new()
///     .config_path("deploy-config/config.json")
///     .artifacts_dir("out")
///     .ledger_path("deploy-config/contracts.json")
///     .build(deployer, LinePrompt::stdio())?;
/// orchestrator.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OrchestratorBuilder {
    /// Path to the network registry.
    config_path: PathBuf,
    /// Compiler output directory holding both artifacts.
    artifacts_dir: PathBuf,
    /// Path to the deployment ledger.
    ledger_path: PathBuf,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestratorBuilder {
    /// Create a builder pointing at the default locations.
    pub fn new() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
        }
    }

    /// Set the network registry path.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Set the compiler output directory.
    pub fn artifacts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = path.into();
        self
    }

    /// Set the ledger path.
    pub fn ledger_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ledger_path = path.into();
        self
    }

    /// Load the registry and both artifacts, and assemble the orchestrator.
    pub fn build<D, P>(self, deployer: D, prompt: P) -> Result<Orchestrator<D, P>>
    where
        D: ContractDeployer,
        P: Prompt,
    {
        let networks = load_networks(&self.config_path)?;
        let sender = BuildArtifact::load(ContractKind::Sender, &self.artifacts_dir)?;
        let receiver = BuildArtifact::load(ContractKind::Receiver, &self.artifacts_dir)?;

        tracing::debug!(
            config_path = %self.config_path.display(),
            artifacts_dir = %self.artifacts_dir.display(),
            ledger_path = %self.ledger_path.display(),
            "Orchestrator configured"
        );

        Ok(Orchestrator::new(
            networks,
            sender,
            receiver,
            LedgerStore::new(self.ledger_path),
            deployer,
            prompt,
        ))
    }
}
