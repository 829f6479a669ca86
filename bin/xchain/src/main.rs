//! xchain deploys a cross-chain sender/receiver contract pair on two networks
//! picked interactively, and records their addresses in a ledger.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::Table;

use cli::Cli;
use xchain_deploy::{
    DeployError, Deployment, LinePrompt, OrchestratorBuilder, PRIVATE_KEY_ENV, RpcDeployer,
    RunSummary, signer_from_key,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    // The credential is checked before anything else is touched.
    let deployer = deployer_from_cli(&cli)?;

    tracing::info!(
        config = %cli.config,
        artifacts = %cli.artifacts,
        ledger = %cli.ledger,
        deployer = %deployer.address(),
        "Starting deployment run..."
    );

    let mut orchestrator = OrchestratorBuilder::new()
        .config_path(&cli.config)
        .artifacts_dir(&cli.artifacts)
        .ledger_path(&cli.ledger)
        .build(deployer, LinePrompt::stdio())
        .context("Failed to prepare deployment")?;

    let summary = orchestrator.run().await?;

    println!("\n{}", summary_table(&summary));
    tracing::info!(
        ledger = %cli.ledger,
        records = summary.ledger.len(),
        "✓ Deployment complete!"
    );

    Ok(())
}

/// Build the deployer from the signing key passed on the command line or in
/// the environment.
fn deployer_from_cli(cli: &Cli) -> xchain_deploy::Result<RpcDeployer> {
    let private_key = cli
        .private_key
        .as_deref()
        .ok_or_else(|| DeployError::config(format!("{PRIVATE_KEY_ENV} is not set")))?;
    Ok(RpcDeployer::new(signer_from_key(private_key)?))
}

/// Render the two deployments of a run.
fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Role",
        "Contract",
        "Network",
        "Chain ID",
        "Address",
        "Deployed at",
    ]);

    for deployment in [&summary.sender, &summary.receiver] {
        table.add_row(summary_row(deployment));
    }

    table
}

fn summary_row(deployment: &Deployment) -> Vec<String> {
    vec![
        deployment.role.to_string(),
        deployment.kind.contract_name().to_string(),
        deployment.network.description.clone(),
        deployment.network.chain_id.to_string(),
        deployment.address.to_string(),
        deployment.deployed_at.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use xchain_deploy::{ContractKind, DeploymentLedger, NetworkConfig, Role};

    fn deployment(role: Role, kind: ContractKind, chain_id: u64, name: &str) -> Deployment {
        Deployment {
            role,
            kind,
            network: network(chain_id, name),
            address: Default::default(),
            deployed_at: "2024-03-01T10:00:00.000Z".to_string(),
        }
    }

    fn network(chain_id: u64, name: &str) -> NetworkConfig {
        xchain_deploy::parse_networks(&format!(
            r#"{{"chains": [{{
                "description": "{name}",
                "chainId": {chain_id},
                "rpc": "http://localhost:8545",
                "tokenBridge": "0x0000000000000000000000000000000000000001",
                "wormholeRelayer": "0x0000000000000000000000000000000000000002",
                "wormhole": "0x0000000000000000000000000000000000000003"
            }}]}}"#
        ))
        .unwrap()
        .remove(0)
    }

    #[test]
    fn test_missing_private_key_is_config_error() {
        let mut cli = Cli::try_parse_from(["xchain"]).unwrap();
        // PRIVATE_KEY may be exported in the test environment.
        cli.private_key = None;

        let err = deployer_from_cli(&cli).unwrap_err();
        assert!(matches!(err, DeployError::Config { .. }));
        assert!(err.to_string().contains("PRIVATE_KEY is not set"));
    }

    #[test]
    fn test_private_key_flag() {
        let cli = Cli::try_parse_from([
            "xchain",
            "--private-key",
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ])
        .unwrap();
        let deployer = deployer_from_cli(&cli).unwrap();
        assert_eq!(
            deployer.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );

        let cli = Cli::try_parse_from(["xchain", "--private-key", "0x1234"]).unwrap();
        assert!(matches!(
            deployer_from_cli(&cli),
            Err(DeployError::Config { .. })
        ));
    }

    #[test]
    fn test_summary_table() {
        let summary = RunSummary {
            sender: deployment(Role::Source, ContractKind::Sender, 6, "Avalanche testnet fuji"),
            receiver: deployment(Role::Target, ContractKind::Receiver, 14, "Celo Testnet"),
            ledger: DeploymentLedger::default(),
        };

        let rendered = summary_table(&summary).to_string();
        assert!(rendered.contains("CrossChainSender"));
        assert!(rendered.contains("CrossChainReceiver"));
        assert!(rendered.contains("Avalanche testnet fuji"));
        assert!(rendered.contains("source"));
        assert!(rendered.contains("14"));
    }
}
