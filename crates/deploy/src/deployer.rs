//! Contract deployment against a single network.

use std::{future::Future, time::Duration};

use alloy::{
    network::{EthereumWallet, ReceiptResponse, TransactionBuilder},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
};
use alloy_core::primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use anyhow::Context;
use tokio::time::timeout;
use url::Url;

use crate::{
    artifact::BuildArtifact,
    error::{DeployError, Result},
    registry::NetworkConfig,
};

/// Environment variable holding the deployer's signing key.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Bound on the chain id preflight. The deployment itself is not bounded.
const CHAIN_ID_TIMEOUT: Duration = Duration::from_secs(30);

/// Deploys one artifact on one network and returns the new contract address.
pub trait ContractDeployer {
    fn deploy(
        &self,
        network: &NetworkConfig,
        artifact: &BuildArtifact,
        constructor_args: &[Address],
    ) -> impl Future<Output = Result<Address>>;
}

/// Parse the signing credential. The key itself never appears in errors.
pub fn signer_from_key(key: &str) -> Result<PrivateKeySigner> {
    let key = key.trim();
    if key.is_empty() {
        return Err(DeployError::config(format!("{PRIVATE_KEY_ENV} is empty")));
    }

    key.parse::<PrivateKeySigner>().map_err(|_| {
        DeployError::config(format!(
            "{PRIVATE_KEY_ENV} is not a valid secp256k1 private key"
        ))
    })
}

/// Deployer that submits contract-creation transactions over HTTP JSON-RPC.
#[derive(Debug, Clone)]
pub struct RpcDeployer {
    signer: PrivateKeySigner,
}

impl RpcDeployer {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Address that pays for and owns the deployments.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    async fn submit(
        &self,
        network: &NetworkConfig,
        artifact: &BuildArtifact,
        constructor_args: &[Address],
    ) -> anyhow::Result<Address> {
        let code = artifact.creation_code(constructor_args)?;
        let url: Url = network
            .rpc_endpoint
            .parse()
            .with_context(|| format!("Invalid RPC endpoint: {}", network.rpc_endpoint))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.signer.clone()))
            .connect_http(url);

        let served_chain_id = timeout(CHAIN_ID_TIMEOUT, provider.get_chain_id())
            .await
            .context("Timed out querying chain id")?
            .context("Failed to query chain id")?;
        if served_chain_id != network.chain_id {
            anyhow::bail!(
                "RPC endpoint serves chain {} but the registry expects {}",
                served_chain_id,
                network.chain_id
            );
        }

        let tx = TransactionRequest::default()
            .with_from(self.signer.address())
            .with_deploy_code(code);

        let pending = provider
            .send_transaction(tx)
            .await
            .context("Failed to submit contract creation transaction")?;
        let tx_hash = *pending.tx_hash();
        tracing::info!(
            tx_hash = %tx_hash,
            contract = artifact.kind.contract_name(),
            network = %network.description,
            "Contract creation submitted, waiting for confirmation..."
        );

        let receipt = pending
            .get_receipt()
            .await
            .with_context(|| format!("Failed to confirm transaction {}", tx_hash))?;

        if !receipt.status() {
            anyhow::bail!("Contract creation reverted in transaction {}", tx_hash);
        }

        receipt
            .contract_address()
            .with_context(|| format!("Receipt for {} carries no contract address", tx_hash))
    }
}

impl ContractDeployer for RpcDeployer {
    async fn deploy(
        &self,
        network: &NetworkConfig,
        artifact: &BuildArtifact,
        constructor_args: &[Address],
    ) -> Result<Address> {
        tracing::info!(
            contract = artifact.kind.contract_name(),
            network = %network.description,
            chain_id = network.chain_id,
            deployer = %self.address(),
            "Deploying contract..."
        );

        self.submit(network, artifact, constructor_args)
            .await
            .map_err(|source| DeployError::Deployment {
                contract: artifact.kind.contract_name().to_string(),
                network: network.description.clone(),
                chain_id: network.chain_id,
                source,
            })
    }
}
