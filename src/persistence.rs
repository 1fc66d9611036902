// src/persistence.rs
//! Feature tensor persistence
//!
//! Preprocessed feature batches are cached on disk as named dense tensors
//! in a SafeTensors-style container:
//!
//! ```text
//! [8-byte header: u64 metadata length (little-endian)]
//! [JSON metadata: tensor names, dtypes, shapes, data_offsets]
//! [Raw tensor data: F64 values in little-endian]
//! ```
//!
//! Values are stored bit-for-bit, so loading a cached blob is exactly
//! equivalent to recomputing it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array4;
use serde::{Deserialize, Serialize};

use crate::error::QuanvError;

/// Metadata for a single tensor in the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorMetadata {
    /// Data type of the tensor; this crate always writes "F64".
    pub dtype: String,
    /// Shape of the tensor.
    pub shape: Vec<usize>,
    /// Data offsets `[start, end]` in the raw data section.
    pub data_offsets: [usize; 2],
}

/// Complete container metadata.
/// Uses `BTreeMap` for deterministic JSON serialization (sorted keys).
pub type TensorIndex = BTreeMap<String, TensorMetadata>;

/// Saves named f64 tensors to a container file.
pub fn save_tensors<P: AsRef<Path>>(
    path: P,
    tensors: &BTreeMap<String, (Vec<f64>, Vec<usize>)>,
) -> Result<(), QuanvError> {
    let mut metadata = TensorIndex::new();
    let mut raw_data = Vec::new();
    let mut current_offset = 0;

    // BTreeMap already provides sorted iteration
    for (name, (data, shape)) in tensors {
        let start_offset = current_offset;
        let data_size = data.len() * 8; // F64 = 8 bytes
        let end_offset = current_offset + data_size;

        metadata.insert(
            name.clone(),
            TensorMetadata {
                dtype: "F64".to_string(),
                shape: shape.clone(),
                data_offsets: [start_offset, end_offset],
            },
        );

        // Raw little-endian F64 payload
        for &value in data {
            raw_data.extend_from_slice(&value.to_le_bytes());
        }

        current_offset = end_offset;
    }

    let metadata_json = serde_json::to_string(&metadata)?;
    let metadata_bytes = metadata_json.as_bytes();
    let metadata_len = metadata_bytes.len() as u64;

    let mut output = Vec::new();
    output.extend_from_slice(&metadata_len.to_le_bytes());
    output.extend_from_slice(metadata_bytes);
    output.extend_from_slice(&raw_data);

    fs::write(path, output)?;
    Ok(())
}

/// Loads all named tensors from a container file.
pub fn load_tensors<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeMap<String, (Vec<f64>, Vec<usize>)>, QuanvError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    let malformed = |reason: &str| QuanvError::MalformedTensorFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if bytes.len() < 8 {
        return Err(malformed("file shorter than the 8-byte header"));
    }

    let mut header = [0u8; 8];
    header.copy_from_slice(&bytes[..8]);
    let metadata_len = u64::from_le_bytes(header) as usize;

    if bytes.len() < 8 + metadata_len {
        return Err(malformed("metadata length exceeds file size"));
    }

    let metadata: TensorIndex = serde_json::from_slice(&bytes[8..8 + metadata_len])?;
    let payload = &bytes[8 + metadata_len..];

    let mut tensors = BTreeMap::new();
    for (name, meta) in metadata {
        if meta.dtype != "F64" {
            return Err(malformed(&format!(
                "tensor '{}' has unsupported dtype {}",
                name, meta.dtype
            )));
        }

        let [start, end] = meta.data_offsets;
        if start > end || end > payload.len() || (end - start) % 8 != 0 {
            return Err(malformed(&format!(
                "tensor '{}' has inconsistent data offsets",
                name
            )));
        }

        let element_count: usize = meta.shape.iter().product();
        if element_count * 8 != end - start {
            return Err(malformed(&format!(
                "tensor '{}' shape does not match its payload size",
                name
            )));
        }

        let mut data = Vec::with_capacity(element_count);
        for chunk in payload[start..end].chunks_exact(8) {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            data.push(f64::from_le_bytes(buf));
        }

        tensors.insert(name, (data, meta.shape));
    }

    Ok(tensors)
}

/// Cache of preprocessed feature batches, one container file per name.
#[derive(Debug, Clone)]
pub struct FeatureCache {
    dir: PathBuf,
}

impl FeatureCache {
    /// Create a cache rooted at `dir`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, QuanvError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(FeatureCache { dir })
    }

    /// Path of the container file for a named blob.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.st", name))
    }

    /// Whether a named blob exists.
    pub fn contains(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Persist a feature batch under the given name.
    pub fn save(&self, name: &str, features: &Array4<f64>) -> Result<(), QuanvError> {
        let shape = features.shape().to_vec();
        // Standard layout guarantees the raw vector is in row-major order
        let data = features
            .as_standard_layout()
            .iter()
            .copied()
            .collect::<Vec<f64>>();

        let mut tensors = BTreeMap::new();
        tensors.insert(name.to_string(), (data, shape));
        save_tensors(self.path_for(name), &tensors)
    }

    /// Load a feature batch by name.
    ///
    /// A missing blob is reported as a cache miss telling the caller to
    /// re-run preprocessing; it is never silently replaced by an empty
    /// tensor.
    pub fn load(&self, name: &str) -> Result<Array4<f64>, QuanvError> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(QuanvError::CacheMiss { path });
        }

        let mut tensors = load_tensors(&path)?;
        let (data, shape) = tensors.remove(name).ok_or_else(|| {
            QuanvError::MalformedTensorFile {
                path: path.clone(),
                reason: format!("tensor '{}' missing from container", name),
            }
        })?;

        if shape.len() != 4 {
            return Err(QuanvError::MalformedTensorFile {
                path,
                reason: format!("expected a rank-4 tensor, got rank {}", shape.len()),
            });
        }

        Array4::from_shape_vec((shape[0], shape[1], shape[2], shape[3]), data).map_err(|e| {
            QuanvError::MalformedTensorFile {
                path,
                reason: e.to_string(),
            }
        })
    }
}
