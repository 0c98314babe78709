//! Loading of Hardhat compilation artifacts & link-time library resolution

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::Address;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::{
    constants::{ARTIFACT_EXTENSION, BUILD_INFO_DIR, DEBUG_ARTIFACT_SUFFIX, NUM_HEX_CHARS_ADDRESS},
    errors::ScriptError,
};

/// Source file -> library name -> placeholder positions
pub type LinkReferences = BTreeMap<String, BTreeMap<String, Vec<LinkOffset>>>;

/// A compiled contract, as emitted by Hardhat under `artifacts/`
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// The contract's name
    pub contract_name: String,
    /// The path of the source file the contract is defined in
    pub source_name: String,
    /// The hex creation code, with `__$…$__` placeholders for unlinked libraries
    pub bytecode: String,
    /// Where each library address must be spliced into the creation code
    #[serde(default)]
    pub link_references: LinkReferences,
}

/// The position of a library placeholder, in bytes
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct LinkOffset {
    /// Byte offset of the placeholder
    pub start: usize,
    /// Byte length of the placeholder, always that of an address
    pub length: usize,
}

impl Artifact {
    /// The creation code with every library placeholder replaced by its address
    ///
    /// Fails if any referenced library has no address; the contract cannot be
    /// deployed before all of its libraries are.
    pub fn link(&self, libraries: &BTreeMap<String, Address>) -> Result<Vec<u8>, ScriptError> {
        let mut code = self.bytecode.trim_start_matches("0x").to_string();

        for (source, source_libraries) in &self.link_references {
            for (library, offsets) in source_libraries {
                let address = libraries.get(library).ok_or_else(|| {
                    ScriptError::Linking(format!(
                        "{} links against {source}:{library}, which has no address",
                        self.contract_name
                    ))
                })?;
                let address_hex = hex::encode(address.as_slice());

                for offset in offsets {
                    let from = offset.start * 2;
                    let to = from + offset.length * 2;
                    if offset.length * 2 != NUM_HEX_CHARS_ADDRESS || to > code.len() {
                        return Err(ScriptError::Linking(format!(
                            "{}: malformed link reference for {library} at byte {}",
                            self.contract_name, offset.start
                        )));
                    }

                    code.replace_range(from..to, &address_hex);
                }
            }
        }

        hex::decode(&code).map_err(|e| {
            ScriptError::ArtifactParsing(format!("{}: {e}", self.contract_name))
        })
    }

    /// The linked libraries grouped by the source file defining them, in the
    /// shape of the compiler's `settings.libraries`
    pub fn library_settings(
        &self,
        libraries: &BTreeMap<String, Address>,
    ) -> BTreeMap<String, BTreeMap<String, Address>> {
        self.link_references
            .iter()
            .map(|(source, source_libraries)| {
                let linked = source_libraries
                    .keys()
                    .filter_map(|name| libraries.get(name).map(|addr| (name.clone(), *addr)))
                    .collect();
                (source.clone(), linked)
            })
            .collect()
    }
}

/// The compiler invocation a set of artifacts came out of
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// The full compiler version, e.g. `0.8.16+commit.07a7930e`
    pub solc_long_version: String,
    /// The standard-JSON compiler input
    pub input: Value,
}

/// The `<Name>.dbg.json` file Hardhat writes next to each artifact
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DebugArtifact {
    /// Path of the build info, relative to the debug file
    build_info: String,
}

/// Resolves artifact names to compiled artifacts
#[derive(Clone, Debug, Default)]
pub struct ArtifactStore {
    /// The Hardhat `artifacts/` directory, if reading from disk
    root: Option<PathBuf>,
    /// Artifacts provided up front, consulted before the directory
    preloaded: BTreeMap<String, Artifact>,
}

impl ArtifactStore {
    /// A store reading from a Hardhat `artifacts/` directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            preloaded: BTreeMap::new(),
        }
    }

    /// A store holding exactly the given artifacts
    pub fn in_memory(artifacts: impl IntoIterator<Item = Artifact>) -> Self {
        Self {
            root: None,
            preloaded: artifacts
                .into_iter()
                .map(|artifact| (artifact.contract_name.clone(), artifact))
                .collect(),
        }
    }

    /// Look up an artifact by contract name
    pub fn artifact(&self, name: &str) -> Result<Artifact, ScriptError> {
        if let Some(artifact) = self.preloaded.get(name) {
            return Ok(artifact.clone());
        }

        let path = self.locate(&format!("{name}.{ARTIFACT_EXTENSION}"))?;
        read_json(&path)
    }

    /// Look up the build info a contract was compiled in
    pub fn build_info(&self, name: &str) -> Result<BuildInfo, ScriptError> {
        let debug_path = self.locate(&format!("{name}{DEBUG_ARTIFACT_SUFFIX}"))?;
        let debug: DebugArtifact = read_json(&debug_path)?;

        let dir = debug_path.parent().unwrap_or_else(|| Path::new("."));
        read_json(&dir.join(debug.build_info))
    }

    /// Find a file anywhere below the artifacts directory
    fn locate(&self, file_name: &str) -> Result<PathBuf, ScriptError> {
        let root = self.root.as_ref().ok_or_else(|| {
            ScriptError::ArtifactParsing(format!("no artifact directory to find {file_name} in"))
        })?;

        find_file(root, file_name)?.ok_or_else(|| {
            ScriptError::ArtifactParsing(format!("{file_name} not found under {}", root.display()))
        })
    }
}

/// Depth-first search for `file_name` below `dir`, skipping the build-info directory
fn find_file(dir: &Path, file_name: &str) -> Result<Option<PathBuf>, ScriptError> {
    let entries = fs::read_dir(dir).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .path();

        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == BUILD_INFO_DIR) {
                continue;
            }
            if let Some(found) = find_file(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name().is_some_and(|n| n == file_name) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}

/// Read & deserialize a JSON file
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))
}
