use clap::Parser;
use tracing::level_filters::LevelFilter;
use xchain_deploy::{DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIG_PATH, DEFAULT_LEDGER_PATH};

#[derive(Parser)]
#[command(name = "xchain")]
#[command(
    author,
    version,
    about = "Deploy a cross-chain sender/receiver contract pair and record their addresses"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "XCHAIN_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to the network registry listing the selectable chains.
    #[arg(long, alias = "conf", env = "XCHAIN_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Compiler output directory containing the CrossChainSender and
    /// CrossChainReceiver build artifacts.
    #[arg(long, alias = "out", env = "XCHAIN_ARTIFACTS", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: String,

    /// Path to the deployment ledger. Created on the first successful run.
    #[arg(long, env = "XCHAIN_LEDGER", default_value = DEFAULT_LEDGER_PATH)]
    pub ledger: String,

    /// Private key of the deploying account.
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["xchain"]).unwrap();
        assert_eq!(cli.verbosity, LevelFilter::INFO);
        assert_eq!(cli.config, "deploy-config/config.json");
        assert_eq!(cli.artifacts, "out");
        assert_eq!(cli.ledger, "deploy-config/contracts.json");
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "xchain",
            "--config",
            "chains.json",
            "--out",
            "build",
            "--ledger",
            "ledger.json",
            "-v",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.config, "chains.json");
        assert_eq!(cli.artifacts, "build");
        assert_eq!(cli.ledger, "ledger.json");
        assert_eq!(cli.verbosity, LevelFilter::DEBUG);
    }
}
