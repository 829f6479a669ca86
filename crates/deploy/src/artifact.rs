//! Compiler build artifacts for the two contract kinds.

use std::path::{Path, PathBuf};

use alloy_core::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::{Address, Bytes},
};
use anyhow::Context;
use serde::Deserialize;

use crate::error::{DeployError, Result};

/// Default compiler output directory.
pub const DEFAULT_ARTIFACTS_DIR: &str = "out";

/// The two contracts deployed by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ContractKind {
    Sender,
    Receiver,
}

impl ContractKind {
    /// Contract name as emitted by the compiler.
    pub fn contract_name(&self) -> &'static str {
        match self {
            ContractKind::Sender => "CrossChainSender",
            ContractKind::Receiver => "CrossChainReceiver",
        }
    }

    /// Path of the artifact inside the compiler output directory.
    pub fn artifact_path(&self, artifacts_dir: &Path) -> PathBuf {
        let name = self.contract_name();
        artifacts_dir
            .join(format!("{name}.sol"))
            .join(format!("{name}.json"))
    }
}

/// ABI and creation bytecode of one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    pub kind: ContractKind,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

/// Bytecode is either a bare hex string or foundry's `{ "object": "0x.." }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Hex(Bytes),
    Object { object: Bytes },
}

#[derive(Debug, Deserialize)]
struct ArtifactFile {
    abi: JsonAbi,
    bytecode: BytecodeField,
}

impl BuildArtifact {
    /// Parse an artifact document.
    pub fn parse(kind: ContractKind, content: &str) -> Result<Self> {
        let file: ArtifactFile = serde_json::from_str(content).map_err(|e| {
            DeployError::config_with(format!("{} artifact is not well-formed", kind.contract_name()), e)
        })?;

        let bytecode = match file.bytecode {
            BytecodeField::Hex(bytes) | BytecodeField::Object { object: bytes } => bytes,
        };

        if bytecode.is_empty() {
            return Err(DeployError::config(format!(
                "{} artifact has empty bytecode",
                kind.contract_name()
            )));
        }

        Ok(Self {
            kind,
            abi: file.abi,
            bytecode,
        })
    }

    /// Load the artifact for `kind` from the compiler output directory.
    pub fn load(kind: ContractKind, artifacts_dir: &Path) -> Result<Self> {
        let path = kind.artifact_path(artifacts_dir);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .map_err(|e| {
                DeployError::config_with(format!("{} artifact is unreadable", kind.contract_name()), e)
            })?;

        let artifact = Self::parse(kind, &content)?;
        tracing::debug!(
            path = %path.display(),
            bytecode_len = artifact.bytecode.len(),
            "Build artifact loaded"
        );
        Ok(artifact)
    }

    /// Creation code: the bytecode followed by the ABI-encoded constructor arguments.
    pub fn creation_code(&self, args: &[Address]) -> anyhow::Result<Bytes> {
        let encoded_args = match &self.abi.constructor {
            Some(constructor) => {
                let values: Vec<DynSolValue> =
                    args.iter().copied().map(DynSolValue::Address).collect();
                constructor.abi_encode_input(&values).with_context(|| {
                    format!(
                        "Constructor of {} does not accept {} address arguments",
                        self.kind.contract_name(),
                        args.len()
                    )
                })?
            }
            None if args.is_empty() => Vec::new(),
            None => anyhow::bail!(
                "{} declares no constructor but {} arguments were given",
                self.kind.contract_name(),
                args.len()
            ),
        };

        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&encoded_args);
        Ok(code.into())
    }
}
