//! Model persistence for saving and loading trained networks
//!
//! A saved model is two files next to each other:
//! - `<path>.mpk` - network weights (Burn named MessagePack record)
//! - `<path>.meta.json` - [`ModelMetadata`] as JSON
//!
//! Saving overwrites both files; the previous best is not kept.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

use super::config::AgentConfig;
use super::model::Checkpoint;
use super::network::{QNetwork, QNetworkConfig};

/// Metadata saved with the model
///
/// Carries the hyperparameters needed to rebuild the network before its
/// weights are loaded, plus the episode that produced the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Agent configuration used during training
    pub agent_config: AgentConfig,

    /// Episodes completed when the model was saved
    pub episode: usize,

    /// Score of the episode that triggered the save
    pub score: u32,

    /// Crate version that wrote the files
    pub version: String,
}

impl ModelMetadata {
    pub fn new(agent_config: AgentConfig, checkpoint: &Checkpoint) -> Self {
        Self {
            agent_config,
            episode: checkpoint.episode,
            score: checkpoint.score,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Path of the metadata file belonging to the model at `path`
pub fn metadata_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".meta.json");
    PathBuf::from(name)
}

/// Path of the weights file belonging to the model at `path`
pub fn weights_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".mpk");
    PathBuf::from(name)
}

/// Save network weights and metadata, creating parent directories as needed
pub fn save_network<B: Backend>(
    network: &QNetwork<B>,
    path: &Path,
    metadata: &ModelMetadata,
) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PersistenceError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(network.clone().into_record(), weights_path(path))
        .map_err(|err| PersistenceError::Save {
            path: path.to_path_buf(),
            reason: format!("{err:?}"),
        })?;

    let meta_path = metadata_path(path);
    let meta_json = serde_json::to_string_pretty(metadata)?;
    std::fs::write(&meta_path, meta_json).map_err(|source| PersistenceError::MetadataWrite {
        path: meta_path,
        source,
    })?;

    Ok(())
}

/// Read only the metadata of a saved model
pub fn load_metadata(path: &Path) -> Result<ModelMetadata, PersistenceError> {
    let meta_path = metadata_path(path);
    let meta_json =
        std::fs::read_to_string(&meta_path).map_err(|source| PersistenceError::MetadataRead {
            path: meta_path.clone(),
            source,
        })?;

    serde_json::from_str(&meta_json).map_err(|source| PersistenceError::MetadataParse {
        path: meta_path,
        source,
    })
}

/// Rebuild a saved network onto `device`
///
/// The metadata is read first so the network can be shaped before its
/// weights are loaded into it.
pub fn load_network<B: Backend>(
    path: &Path,
    device: &B::Device,
) -> Result<(QNetwork<B>, ModelMetadata), PersistenceError> {
    let metadata = load_metadata(path)?;

    let network = QNetworkConfig::new(metadata.agent_config.hidden_size).init::<B>(device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(weights_path(path), device)
        .map_err(|err| PersistenceError::Load {
            path: path.to_path_buf(),
            reason: format!("{err:?}"),
        })?;

    Ok((network.load_record(record), metadata))
}
