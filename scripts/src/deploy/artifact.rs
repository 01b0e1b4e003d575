//! Loading of Hardhat compilation artifacts and constructor argument encoding

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
    json_abi::JsonAbi,
    primitives::{hex, Bytes},
};
use serde::Deserialize;
use serde_json::Value;
use walkdir::WalkDir;

use crate::{constants::LIBRARY_PLACEHOLDER, errors::ScriptError, types::ConstructorArg};

/// The per-contract JSON file Hardhat writes under `artifacts/contracts`
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    /// Name of the contract
    contract_name: String,
    /// Source file, relative to the project root
    source_name: String,
    /// ABI of the contract
    abi: JsonAbi,
    /// Hex creation bytecode, possibly with link placeholders
    bytecode: String,
}

/// The `.dbg.json` file next to each artifact, pointing at its build info
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugFile {
    /// Path of the build info, relative to the debug file
    build_info: String,
}

/// The compiler invocation a contract came out of
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Full solc version, e.g. `0.8.19+commit.7dd6d404`
    pub solc_long_version: String,
    /// Standard JSON input given to solc
    pub input: Value,
}

/// A compiled contract, ready to be deployed
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    /// Name of the contract
    pub contract_name: String,
    /// Source file the contract is defined in
    pub source_name: String,
    /// ABI of the contract
    pub abi: JsonAbi,
    /// Creation bytecode
    pub bytecode: Bytes,
    /// Build info, needed for verification only
    pub build_info: Option<BuildInfo>,
}

impl ContractArtifact {
    /// Loads the artifact of `contract_name` from a Hardhat artifacts directory.
    ///
    /// The name is either a bare contract name, which must be unique across the
    /// sources, or a fully qualified `<source>:<name>`.
    pub fn load(artifacts_dir: &Path, contract_name: &str) -> Result<Self, ScriptError> {
        let artifact_path = match contract_name.split_once(':') {
            Some((source_name, name)) => {
                let path = artifacts_dir.join(source_name).join(format!("{}.json", name));
                path.is_file().then_some(path)
            }
            None => find_artifact(&artifacts_dir.join("contracts"), contract_name)?,
        }
        .ok_or_else(|| {
            ScriptError::ArtifactParsing(format!(
                "no artifact for `{}` under {}, did you compile the contracts?",
                contract_name,
                artifacts_dir.display()
            ))
        })?;

        let raw = fs::read_to_string(&artifact_path)
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
        let artifact: HardhatArtifact =
            serde_json::from_str(&raw).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

        let bytecode = parse_bytecode(&artifact.contract_name, &artifact.bytecode)?;
        let build_info = load_build_info(&artifact_path.with_extension("dbg.json"))?;

        Ok(ContractArtifact {
            contract_name: artifact.contract_name,
            source_name: artifact.source_name,
            abi: artifact.abi,
            bytecode,
            build_info,
        })
    }

    /// The `<source>:<name>` form explorers expect
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// ABI-encodes the given constructor arguments against the contract's constructor
    pub fn encode_constructor_args(&self, args: &[ConstructorArg]) -> Result<Bytes, ScriptError> {
        let Some(constructor) = &self.abi.constructor else {
            if !args.is_empty() {
                return Err(ScriptError::ArgumentEncoding(format!(
                    "`{}` has no constructor but {} arguments were given",
                    self.contract_name,
                    args.len()
                )));
            }
            return Ok(Bytes::new());
        };

        if constructor.inputs.len() != args.len() {
            return Err(ScriptError::ArgumentEncoding(format!(
                "`{}` expects {} constructor arguments, got {}",
                self.contract_name,
                constructor.inputs.len(),
                args.len()
            )));
        }

        let values = constructor
            .inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                let ty = param
                    .resolve()
                    .map_err(|e| ScriptError::ArgumentEncoding(e.to_string()))?;
                ty.coerce_str(&arg.to_string()).map_err(|e| {
                    ScriptError::ArgumentEncoding(format!("`{}` ({}): {}", param.name, param.ty, e))
                })
            })
            .collect::<Result<Vec<DynSolValue>, _>>()?;

        constructor
            .abi_encode_input(&values)
            .map(Bytes::from)
            .map_err(|e| ScriptError::ArgumentEncoding(e.to_string()))
    }

    /// Creation bytecode followed by the encoded constructor arguments
    pub fn init_code(&self, encoded_args: &Bytes) -> Bytes {
        [&self.bytecode[..], &encoded_args[..]].concat().into()
    }
}

/// Walks `dir` looking for `<contract_name>.json`, failing when several sources define it
fn find_artifact(dir: &Path, contract_name: &str) -> Result<Option<PathBuf>, ScriptError> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let file_name = format!("{}.json", contract_name);
    let mut matches = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
        if entry.file_type().is_file() && entry.file_name() == file_name.as_str() {
            matches.push(entry.into_path());
        }
    }

    if matches.len() > 1 {
        let found = matches
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(ScriptError::ArtifactParsing(format!(
            "`{}` is defined by several sources ({}), use `<source>:{}`",
            contract_name, found, contract_name
        )));
    }

    Ok(matches.pop())
}

/// Decodes the artifact bytecode, rejecting abstract and unlinked contracts
fn parse_bytecode(contract_name: &str, bytecode: &str) -> Result<Bytes, ScriptError> {
    if bytecode.contains(LIBRARY_PLACEHOLDER) {
        return Err(ScriptError::ArtifactParsing(format!(
            "`{}` references libraries that need linking",
            contract_name
        )));
    }

    let bytes = hex::decode(bytecode).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ScriptError::ArtifactParsing(format!(
            "`{}` has no bytecode, is it abstract or an interface?",
            contract_name
        )));
    }

    Ok(bytes.into())
}

/// Follows the debug file to the build info, if both exist
fn load_build_info(dbg_path: &Path) -> Result<Option<BuildInfo>, ScriptError> {
    if !dbg_path.exists() {
        return Ok(None);
    }

    let raw =
        fs::read_to_string(dbg_path).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    let dbg: DebugFile =
        serde_json::from_str(&raw).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;

    let build_info_path = dbg_path
        .parent()
        .map(|dir| dir.join(&dbg.build_info))
        .unwrap_or_else(|| PathBuf::from(&dbg.build_info));
    if !build_info_path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(&build_info_path)
        .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))
}
