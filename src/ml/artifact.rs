//! Binary artifact files for fitted models.
//!
//! Every artifact uses the same little-endian envelope:
//!
//! ```text
//! magic (4 bytes) | version (u32) | payload length (u64) | payload (bincode) | crc32 (u32)
//! ```
//!
//! The CRC covers the payload only. Files are written to a temporary sibling
//! and renamed into place, so a reader never observes a half-written artifact.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, VerityError};
use crate::ml::classifier::{ClassifierFamily, LabelConvention, LinearModel};
use crate::ml::training::EvaluationMetrics;

/// Current envelope format version.
pub const FORMAT_VERSION: u32 = 1;

/// Magic bytes of the vectorizer artifact.
pub const VECTORIZER_MAGIC: [u8; 4] = *b"VTZR";

/// Magic bytes of the classifier artifact.
pub const CLASSIFIER_MAGIC: [u8; 4] = *b"VCLF";

pub const VECTORIZER_FILE: &str = "vectorizer.bin";
pub const CLASSIFIER_FILE: &str = "classifier.bin";
pub const MANIFEST_FILE: &str = "model.json";

/// Classifier payload: the fitted model plus the label convention it was trained with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub convention: LabelConvention,
    pub model: LinearModel,
}

/// Human-readable description of a model directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub model_id: Uuid,
    pub trained_at: DateTime<Utc>,
    pub family: ClassifierFamily,
    pub vocabulary_size: usize,
    pub min_token_length: usize,
    pub training_documents: usize,
    pub seed: Option<u64>,
    pub metrics: Option<EvaluationMetrics>,
    pub format_version: u32,
}

/// Paths of the files making up a model directory.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub classifier: PathBuf,
    pub manifest: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        ArtifactPaths {
            vectorizer: dir.join(VECTORIZER_FILE),
            classifier: dir.join(CLASSIFIER_FILE),
            manifest: dir.join(MANIFEST_FILE),
        }
    }
}

/// Serialize `value` into an enveloped artifact at `path`.
pub fn write_artifact<T: Serialize>(path: &Path, magic: [u8; 4], value: &T) -> Result<()> {
    let payload = bincode::serialize(value)?;
    let checksum = crc32fast::hash(&payload);

    let tmp_path = tmp_sibling(path);
    {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        writer.write_all(&magic)?;
        writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
        writer.write_u64::<LittleEndian>(payload.len() as u64)?;
        writer.write_all(&payload)?;
        writer.write_u32::<LittleEndian>(checksum)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Read and verify an enveloped artifact from `path`.
pub fn read_artifact<T: DeserializeOwned>(path: &Path, magic: [u8; 4]) -> Result<T> {
    let file = File::open(path).map_err(|e| {
        VerityError::artifact(format!("Cannot open {}: {e}", path.display()))
    })?;
    let file_size = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    let mut found_magic = [0u8; 4];
    reader
        .read_exact(&mut found_magic)
        .map_err(|_| VerityError::artifact(format!("{} is truncated", path.display())))?;
    if found_magic != magic {
        return Err(VerityError::artifact(format!(
            "{} is not a {} artifact",
            path.display(),
            String::from_utf8_lossy(&magic)
        )));
    }

    let version = reader.read_u32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(VerityError::artifact(format!(
            "Unsupported artifact version {version} in {} (expected {FORMAT_VERSION})",
            path.display()
        )));
    }

    let length = reader.read_u64::<LittleEndian>()?;
    // magic + version + length + checksum
    let overhead = 4 + 4 + 8 + 4;
    if length.saturating_add(overhead) != file_size {
        return Err(VerityError::artifact(format!(
            "{} declares a {length}-byte payload but the file is {file_size} bytes",
            path.display()
        )));
    }

    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload)?;
    let checksum = reader.read_u32::<LittleEndian>()?;
    if crc32fast::hash(&payload) != checksum {
        return Err(VerityError::artifact(format!(
            "Checksum mismatch in {}",
            path.display()
        )));
    }

    Ok(bincode::deserialize(&payload)?)
}

pub fn write_manifest(path: &Path, manifest: &ModelManifest) -> Result<()> {
    let tmp_path = tmp_sibling(path);
    fs::write(&tmp_path, serde_json::to_vec_pretty(manifest)?)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<ModelManifest> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
