//! MNIST dataset loading
//!
//! Reads images and labels from the standard IDX files and normalizes pixel
//! intensities into f64 values in [0, 1]. Normalization divides by 255.0 in
//! double precision: every u8 value converts exactly, so the only rounding
//! is the single IEEE division.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ndarray::{Array1, Array2, Array3, Array4, Axis};

use crate::error::QuanvError;

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;

fn read_u32_be<R: Read>(reader: &mut R) -> Result<u32, QuanvError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Load raw u8 images from an IDX file of magic 2051, shape (n, rows, cols).
pub fn load_idx_images<P: AsRef<Path>>(path: P) -> Result<Array3<u8>, QuanvError> {
    let path = path.as_ref();
    let invalid = |reason: String| QuanvError::InvalidIdx {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = BufReader::new(File::open(path)?);

    let magic = read_u32_be(&mut reader)?;
    if magic != IMAGES_MAGIC {
        return Err(invalid(format!(
            "expected image magic {}, got {}",
            IMAGES_MAGIC, magic
        )));
    }

    let count = read_u32_be(&mut reader)? as usize;
    let rows = read_u32_be(&mut reader)? as usize;
    let cols = read_u32_be(&mut reader)? as usize;

    let mut pixels = vec![0u8; count * rows * cols];
    reader.read_exact(&mut pixels).map_err(|_| {
        invalid(format!(
            "truncated payload: expected {} pixels",
            count * rows * cols
        ))
    })?;

    Array3::from_shape_vec((count, rows, cols), pixels)
        .map_err(|e| invalid(e.to_string()))
}

/// Load labels from an IDX file of magic 2049.
pub fn load_idx_labels<P: AsRef<Path>>(path: P) -> Result<Array1<u8>, QuanvError> {
    let path = path.as_ref();
    let invalid = |reason: String| QuanvError::InvalidIdx {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = BufReader::new(File::open(path)?);

    let magic = read_u32_be(&mut reader)?;
    if magic != LABELS_MAGIC {
        return Err(invalid(format!(
            "expected label magic {}, got {}",
            LABELS_MAGIC, magic
        )));
    }

    let count = read_u32_be(&mut reader)? as usize;

    let mut labels = vec![0u8; count];
    reader
        .read_exact(&mut labels)
        .map_err(|_| invalid(format!("truncated payload: expected {} labels", count)))?;

    Ok(Array1::from(labels))
}

/// Normalize raw u8 images to f64 in [0, 1] and append the channel axis,
/// producing shape (n, rows, cols, 1).
pub fn normalize_images(raw: &Array3<u8>) -> Array4<f64> {
    raw.mapv(|v| f64::from(v) / 255.0).insert_axis(Axis(3))
}

/// Flatten a batch of images or feature tensors into one row per sample.
pub fn flatten_batch(batch: &Array4<f64>) -> Array2<f64> {
    let (n, a, b, c) = batch.dim();
    let data: Vec<f64> = batch.as_standard_layout().iter().copied().collect();
    Array2::from_shape_vec((n, a * b * c), data)
        .unwrap_or_else(|_| unreachable!("element count is preserved by flattening"))
}

/// A labeled image dataset with normalized pixel values
#[derive(Debug, Clone)]
pub struct MnistDataset {
    /// Images of shape (n, rows, cols, 1), values in [0, 1]
    pub images: Array4<f64>,
    /// Class labels, one per image
    pub labels: Array1<u8>,
}

impl MnistDataset {
    /// Load and normalize a dataset from an IDX image/label file pair.
    pub fn from_idx<P: AsRef<Path>>(images_path: P, labels_path: P) -> Result<Self, QuanvError> {
        let raw = load_idx_images(&images_path)?;
        let labels = load_idx_labels(&labels_path)?;

        if raw.dim().0 != labels.len() {
            return Err(QuanvError::InvalidIdx {
                path: images_path.as_ref().to_path_buf(),
                reason: format!(
                    "image count {} does not match label count {}",
                    raw.dim().0,
                    labels.len()
                ),
            });
        }

        Ok(MnistDataset {
            images: normalize_images(&raw),
            labels,
        })
    }

    /// Get the number of samples in the dataset
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the first `n` samples as a new dataset.
    pub fn take(&self, n: usize) -> Result<Self, QuanvError> {
        if n > self.len() {
            return Err(QuanvError::Config(format!(
                "requested {} samples, but the dataset has only {}",
                n,
                self.len()
            )));
        }

        Ok(MnistDataset {
            images: self.images.slice(ndarray::s![..n, .., .., ..]).to_owned(),
            labels: self.labels.slice(ndarray::s![..n]).to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_endpoints_exact() {
        let raw = Array3::from_shape_vec((1, 1, 3), vec![0u8, 128, 255]).unwrap();
        let normalized = normalize_images(&raw);

        assert_eq!(normalized.dim(), (1, 1, 3, 1));
        assert_eq!(normalized[[0, 0, 0, 0]], 0.0);
        assert_eq!(normalized[[0, 0, 1, 0]], 128.0 / 255.0);
        assert_eq!(normalized[[0, 0, 2, 0]], 1.0);
    }

    #[test]
    fn test_flatten_batch_row_major() {
        let batch = Array4::from_shape_fn((2, 2, 2, 1), |(n, a, b, _)| {
            (n * 4 + a * 2 + b) as f64
        });
        let flat = flatten_batch(&batch);

        assert_eq!(flat.dim(), (2, 4));
        assert_eq!(flat.row(0).to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(flat.row(1).to_vec(), vec![4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_take_rejects_oversized_request() {
        let dataset = MnistDataset {
            images: Array4::zeros((3, 2, 2, 1)),
            labels: Array1::zeros(3),
        };
        assert!(dataset.take(4).is_err());
        assert_eq!(dataset.take(2).unwrap().len(), 2);
    }
}
