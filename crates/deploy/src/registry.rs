//! Network registry: the fixed list of networks an operator can deploy to.

use std::{collections::HashSet, path::Path};

use alloy_core::primitives::Address;
use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};

/// Default location of the registry document.
pub const DEFAULT_CONFIG_PATH: &str = "deploy-config/config.json";

/// One deployable network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Human-readable label shown in the selection menu.
    pub description: String,
    /// Numeric chain identifier, also the ledger key.
    pub chain_id: u64,
    /// JSON-RPC endpoint.
    #[serde(rename = "rpc")]
    pub rpc_endpoint: String,
    /// Token bridge contract on this network.
    pub token_bridge: Address,
    /// Relayer contract on this network.
    pub wormhole_relayer: Address,
    /// Core messaging contract on this network.
    pub wormhole: Address,
}

impl NetworkConfig {
    /// Constructor arguments shared by the sender and receiver contracts.
    pub fn constructor_args(&self) -> [Address; 3] {
        [self.wormhole_relayer, self.token_bridge, self.wormhole]
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    chains: Vec<NetworkConfig>,
}

/// Parse a registry document, keeping the order of its entries.
pub fn parse_networks(content: &str) -> Result<Vec<NetworkConfig>> {
    let registry: RegistryFile = serde_json::from_str(content)
        .map_err(|e| DeployError::config_with("network registry is not well-formed", e))?;

    if registry.chains.is_empty() {
        return Err(DeployError::config("network registry lists no chains"));
    }

    let mut seen = HashSet::new();
    for network in &registry.chains {
        if !seen.insert(network.chain_id) {
            tracing::warn!(
                chain_id = network.chain_id,
                description = %network.description,
                "Chain id appears more than once in the registry"
            );
        }
    }

    Ok(registry.chains)
}

/// Load the registry from disk.
pub fn load_networks(path: &Path) -> Result<Vec<NetworkConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
        .map_err(|e| DeployError::config_with("network registry is unreadable", e))?;

    let networks = parse_networks(&content)?;
    tracing::info!(path = %path.display(), count = networks.len(), "Network registry loaded");
    Ok(networks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn registry_json() -> String {
        serde_json::json!({
            "chains": [
                {
                    "description": "Avalanche testnet fuji",
                    "chainId": 6,
                    "rpc": "https://api.avax-test.network/ext/bc/C/rpc",
                    "tokenBridge": "0x61E44E506Ca5659E6c0bba9b678586fA2d729756",
                    "wormholeRelayer": "0xA3cF45939bD6260bcFe3D66bc73d60f19e49a8BB",
                    "wormhole": "0x7bbcE28e64B3F8b84d876Ab298393c38ad7aac4C"
                },
                {
                    "description": "Celo Testnet",
                    "chainId": 14,
                    "rpc": "https://alfajores-forno.celo-testnet.org",
                    "tokenBridge": "0x05ca6037eC51F8b712eD2E6Fa72219FEaE74E153",
                    "wormholeRelayer": "0x306B68267Deb7c5DfCDa3619E22E9Ca39C374f84",
                    "wormhole": "0x88505117CA88e7dd2eC6EA1E13f0948db2D50D56"
                }
            ]
        })
        .to_string()
    }

    #[test]
    fn test_parse_preserves_order() {
        let networks = parse_networks(&registry_json()).unwrap();
        assert_eq!(networks.len(), 2);
        assert_eq!(networks[0].chain_id, 6);
        assert_eq!(networks[0].description, "Avalanche testnet fuji");
        assert_eq!(networks[1].chain_id, 14);
        assert_eq!(
            networks[1].rpc_endpoint,
            "https://alfajores-forno.celo-testnet.org"
        );
    }

    #[test]
    fn test_constructor_args_order() {
        let networks = parse_networks(&registry_json()).unwrap();
        let fuji = &networks[0];
        assert_eq!(
            fuji.constructor_args(),
            [fuji.wormhole_relayer, fuji.token_bridge, fuji.wormhole]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            parse_networks("{ not json"),
            Err(DeployError::Config { .. })
        ));
        assert!(matches!(
            parse_networks(r#"{"chains": []}"#),
            Err(DeployError::Config { .. })
        ));
        assert!(matches!(
            parse_networks(r#"{"networks": []}"#),
            Err(DeployError::Config { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_address() {
        let json = serde_json::json!({
            "chains": [{
                "description": "Broken",
                "chainId": 1,
                "rpc": "http://localhost:8545",
                "tokenBridge": "0x1234",
                "wormholeRelayer": "0x306B68267Deb7c5DfCDa3619E22E9Ca39C374f84",
                "wormhole": "0x88505117CA88e7dd2eC6EA1E13f0948db2D50D56"
            }]
        });
        assert!(matches!(
            parse_networks(&json.to_string()),
            Err(DeployError::Config { .. })
        ));
    }

    #[test]
    fn test_duplicate_chain_ids_are_kept() {
        let mut json: serde_json::Value = serde_json::from_str(&registry_json()).unwrap();
        json["chains"][1]["chainId"] = serde_json::json!(6);
        let networks = parse_networks(&json.to_string()).unwrap();
        assert_eq!(networks.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new("xchain-registry").unwrap();
        let result = load_networks(&dir.path().join("config.json"));
        assert!(matches!(result, Err(DeployError::Config { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new("xchain-registry").unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, registry_json()).unwrap();

        let networks = load_networks(&path).unwrap();
        assert_eq!(networks.len(), 2);
    }
}
