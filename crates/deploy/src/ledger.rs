//! Persisted ledger of deployed contract addresses, keyed by chain id.
//!
//! The ledger is a JSON object that operators and other tools may edit by
//! hand. Records are held as ordered maps of raw JSON values, so a record the
//! merge does not target is written back with the keys, key order and values
//! it was read with. Merging only ever touches the fields written by a
//! deployment.

use std::path::{Path, PathBuf};

use alloy_core::primitives::Address;
use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::{
    artifact::ContractKind,
    error::{DeployError, Result},
};

/// Default location of the ledger file.
pub const DEFAULT_LEDGER_PATH: &str = "deploy-config/contracts.json";

const NETWORK_NAME: &str = "networkName";
const DEPLOYED_AT: &str = "deployedAt";

/// Format a timestamp the way the ledger stores it (`2024-05-01T12:00:00.000Z`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Keys a contract address may be stored under, current key first.
fn address_keys(kind: ContractKind) -> [&'static str; 2] {
    match kind {
        ContractKind::Sender => ["senderAddress", "CrossChainSender"],
        ContractKind::Receiver => ["receiverAddress", "CrossChainReceiver"],
    }
}

/// A record value: kept exactly as read, or written by a merge.
#[derive(Debug, Clone)]
enum FieldValue {
    Raw(Box<RawValue>),
    Text(String),
}

impl FieldValue {
    fn as_string(&self) -> Option<String> {
        match self {
            Self::Raw(raw) => serde_json::from_str(raw.get()).ok(),
            Self::Text(text) => Some(text.clone()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Raw(raw) => raw.serialize(serializer),
            Self::Text(text) => text.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Box::<RawValue>::deserialize(deserializer).map(Self::Raw)
    }
}

/// Deployments recorded for one chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentRecord {
    fields: IndexMap<String, FieldValue>,
}

impl DeploymentRecord {
    pub fn network_name(&self) -> Option<String> {
        self.string(NETWORK_NAME)
    }

    pub fn deployed_at(&self) -> Option<String> {
        self.string(DEPLOYED_AT)
    }

    /// Address recorded for `kind`. The legacy `CrossChainSender` and
    /// `CrossChainReceiver` keys are read when the current key is absent.
    pub fn address(&self, kind: ContractKind) -> Option<String> {
        address_keys(kind).into_iter().find_map(|key| self.string(key))
    }

    fn string(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(FieldValue::as_string)
    }

    fn set(&mut self, key: &str, value: String) {
        self.fields.insert(key.to_string(), FieldValue::Text(value));
    }

    /// Write `partial` over this record. The address replaces every spelling
    /// already present, or lands under the current key if there is none.
    fn overlay(&mut self, partial: PartialRecord) {
        self.set(NETWORK_NAME, partial.network_name);

        let address = partial.address.to_string();
        let keys = address_keys(partial.kind);
        let present: Vec<&str> = keys
            .into_iter()
            .filter(|key| self.fields.contains_key(*key))
            .collect();
        if present.is_empty() {
            self.set(keys[0], address);
        } else {
            for key in present {
                self.set(key, address.clone());
            }
        }

        self.set(DEPLOYED_AT, partial.deployed_at);
    }
}

/// The fields one deployment contributes to a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRecord {
    pub network_name: String,
    pub kind: ContractKind,
    pub address: Address,
    pub deployed_at: String,
}

/// Chain id to deployment record, in file order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeploymentLedger {
    records: IndexMap<u64, DeploymentRecord>,
}

impl DeploymentLedger {
    pub fn get(&self, chain_id: u64) -> Option<&DeploymentRecord> {
        self.records.get(&chain_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Overlay `partial` onto the record for `chain_id`, inserting it if absent.
    ///
    /// Only the network name, the address of `partial.kind` and the timestamp
    /// are written.
    pub fn merge(mut self, chain_id: u64, partial: PartialRecord) -> Self {
        self.records.entry(chain_id).or_default().overlay(partial);
        self
    }

    /// Parse a ledger document. Errors are reported against `path`.
    ///
    /// A well-formed ledger is an object keyed by chain id whose values are
    /// objects. Field contents are not validated.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|source| DeployError::LedgerCorrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize as pretty-printed JSON with two-space indentation.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// File-backed storage for the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger. A missing file is an empty ledger.
    pub fn load(&self) -> Result<DeploymentLedger> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No ledger yet, starting empty");
            return Ok(DeploymentLedger::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))
            .map_err(|source| DeployError::Persistence {
                path: self.path.clone(),
                source,
            })?;

        let ledger = DeploymentLedger::parse(&self.path, &content)?;
        tracing::debug!(path = %self.path.display(), records = ledger.len(), "Ledger loaded");
        Ok(ledger)
    }

    /// Write the full ledger. The previous file is replaced only once the new
    /// content is completely on disk.
    pub fn save(&self, ledger: &DeploymentLedger) -> Result<()> {
        self.write(ledger).map_err(|source| DeployError::Persistence {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), records = ledger.len(), "Ledger saved");
        Ok(())
    }

    fn write(&self, ledger: &DeploymentLedger) -> anyhow::Result<()> {
        let content = ledger
            .to_json_pretty()
            .context("Failed to serialize deployment ledger")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;

        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e).with_context(|| format!("Failed to replace {}", self.path.display()));
        }

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
