//! Sequencing of a full run: select both networks, deploy the sender on the
//! source, deploy the receiver on the target, then record both addresses.
//!
//! A run moves linearly through [`RunState`]. Any failure ends it in
//! [`RunState::Failed`], and the ledger is written only after both
//! deployments succeeded, so a failed run never leaves half of its records
//! behind.

use alloy_core::primitives::Address;
use chrono::{DateTime, Utc};

use crate::{
    artifact::{BuildArtifact, ContractKind},
    deployer::ContractDeployer,
    error::{DeployError, Result},
    ledger::{DeploymentLedger, LedgerStore, PartialRecord, format_timestamp},
    registry::NetworkConfig,
    selector::{Prompt, Role, select_network},
};

/// Source of deployment timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum RunState {
    Start,
    NetworksSelected,
    SenderDeployed,
    ReceiverDeployed,
    LedgerPersisted,
    Done,
    Failed,
}

/// One confirmed deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub role: Role,
    pub kind: ContractKind,
    pub network: NetworkConfig,
    pub address: Address,
    pub deployed_at: String,
}

impl Deployment {
    fn partial_record(&self) -> PartialRecord {
        PartialRecord {
            network_name: self.network.description.clone(),
            kind: self.kind,
            address: self.address,
            deployed_at: self.deployed_at.clone(),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub sender: Deployment,
    pub receiver: Deployment,
    /// The ledger as written at the end of the run.
    pub ledger: DeploymentLedger,
}

/// Drives one run against a registry, two artifacts and a ledger.
pub struct Orchestrator<D, P, C = SystemClock> {
    networks: Vec<NetworkConfig>,
    sender_artifact: BuildArtifact,
    receiver_artifact: BuildArtifact,
    store: LedgerStore,
    deployer: D,
    prompt: P,
    clock: C,
    state: RunState,
}

impl<D, P> Orchestrator<D, P, SystemClock>
where
    D: ContractDeployer,
    P: Prompt,
{
    pub fn new(
        networks: Vec<NetworkConfig>,
        sender_artifact: BuildArtifact,
        receiver_artifact: BuildArtifact,
        store: LedgerStore,
        deployer: D,
        prompt: P,
    ) -> Self {
        Self {
            networks,
            sender_artifact,
            receiver_artifact,
            store,
            deployer,
            prompt,
            clock: SystemClock,
            state: RunState::Start,
        }
    }
}

impl<D, P, C> Orchestrator<D, P, C>
where
    D: ContractDeployer,
    P: Prompt,
    C: Clock,
{
    /// Replace the timestamp source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Orchestrator<D, P, C2> {
        Orchestrator {
            networks: self.networks,
            sender_artifact: self.sender_artifact,
            receiver_artifact: self.receiver_artifact,
            store: self.store,
            deployer: self.deployer,
            prompt: self.prompt,
            clock,
            state: self.state,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute the run to completion.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let result = self.execute().await;

        if let Err(e) = &result {
            tracing::error!(state = %self.state, error = %e, "Deployment run failed");
            self.transition(RunState::Failed);
        }

        result
    }

    async fn execute(&mut self) -> Result<RunSummary> {
        // Refuse to spend gas if the results could not be recorded afterwards.
        self.store.load()?;

        let source = select_network(&self.networks, Role::Source, &mut self.prompt)?;
        let target = select_network(&self.networks, Role::Target, &mut self.prompt)?;
        if source.chain_id == target.chain_id {
            tracing::warn!(
                chain_id = source.chain_id,
                "Source and target are the same chain, both contracts will be deployed there"
            );
        }
        self.transition(RunState::NetworksSelected);

        let sender = self
            .deploy(Role::Source, source, ContractKind::Sender)
            .await?;
        self.transition(RunState::SenderDeployed);

        let receiver = self
            .deploy(Role::Target, target, ContractKind::Receiver)
            .await
            .map_err(|source| DeployError::Orphaned {
                sender: sender.address,
                sender_chain_id: sender.network.chain_id,
                source: Box::new(source),
            })?;
        self.transition(RunState::ReceiverDeployed);

        let ledger = self
            .record(&sender, &receiver)
            .map_err(|source| DeployError::Unrecorded {
                sender: sender.address,
                sender_chain_id: sender.network.chain_id,
                receiver: receiver.address,
                receiver_chain_id: receiver.network.chain_id,
                source: Box::new(source),
            })?;
        self.transition(RunState::LedgerPersisted);

        self.transition(RunState::Done);
        Ok(RunSummary {
            sender,
            receiver,
            ledger,
        })
    }

    async fn deploy(
        &self,
        role: Role,
        network: NetworkConfig,
        kind: ContractKind,
    ) -> Result<Deployment> {
        let artifact = match kind {
            ContractKind::Sender => &self.sender_artifact,
            ContractKind::Receiver => &self.receiver_artifact,
        };

        let address = self
            .deployer
            .deploy(&network, artifact, &network.constructor_args())
            .await?;
        let deployed_at = format_timestamp(self.clock.now());

        tracing::info!(
            contract = kind.contract_name(),
            network = %network.description,
            address = %address,
            "{} deployed on {} at: {}",
            kind.contract_name(),
            network.description,
            address
        );

        Ok(Deployment {
            role,
            kind,
            network,
            address,
            deployed_at,
        })
    }

    /// Merge both deployments into the current ledger and persist it.
    fn record(&self, sender: &Deployment, receiver: &Deployment) -> Result<DeploymentLedger> {
        let ledger = self
            .store
            .load()?
            .merge(sender.network.chain_id, sender.partial_record())
            .merge(receiver.network.chain_id, receiver.partial_record());

        self.store.save(&ledger)?;
        Ok(ledger)
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "Run state changed");
        self.state = next;
    }
}
