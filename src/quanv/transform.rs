// src/quanv/transform.rs
//! Patch-wise quantum convolution over images
//!
//! Slides the kernel over every non-overlapping 2x2 patch of an image,
//! halving the spatial resolution and producing 4 output channels per
//! pixel. Each output cell depends only on its own patch, so batches are
//! mapped in parallel across images.

use ndarray::{Array3, Array4, Axis};
use rayon::prelude::*;
use tracing::debug;

use crate::error::QuanvError;
use crate::quanv::kernel::QuanvKernel;
use crate::quanv::{PATCH_SIZE, WIRES};

/// Lazy sequence of top-left patch coordinates, row-major, stepping by the
/// patch size. Restartable: each call yields a fresh iterator.
pub fn patch_origins(height: usize, width: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..height)
        .step_by(PATCH_SIZE)
        .flat_map(move |j| (0..width).step_by(PATCH_SIZE).map(move |k| (j, k)))
}

/// Applies the quanvolution kernel to every patch of an image
pub struct PatchQuantumTransform {
    kernel: QuanvKernel,
}

impl PatchQuantumTransform {
    pub fn new(kernel: QuanvKernel) -> Self {
        PatchQuantumTransform { kernel }
    }

    /// The kernel this transform applies
    pub fn kernel(&self) -> &QuanvKernel {
        &self.kernel
    }

    /// Transform one image of shape (H, W, 1) into features of shape
    /// (H/2, W/2, 4).
    ///
    /// The four pixels of each patch are fed to the kernel in the fixed
    /// order (0,0), (0,1), (1,0), (1,1) relative to the patch origin; the
    /// kernel's output c becomes channel c of the output pixel. The input
    /// image is never mutated.
    pub fn transform(&self, image: &Array3<f64>) -> Result<Array3<f64>, QuanvError> {
        let (height, width, channels) = image.dim();
        Self::check_shape(height, width, channels)?;

        let mut out = Array3::zeros((height / PATCH_SIZE, width / PATCH_SIZE, WIRES));

        for (j, k) in patch_origins(height, width) {
            // Pixel order within the patch is load-bearing: it decides
            // which scalar feeds which encoding rotation
            let phi = [
                image[[j, k, 0]],
                image[[j, k + 1, 0]],
                image[[j + 1, k, 0]],
                image[[j + 1, k + 1, 0]],
            ];

            let expectations = self.kernel.evaluate(&phi).map_err(|source| QuanvError::Patch {
                row: j,
                col: k,
                source: Box::new(source),
            })?;

            for (channel, &value) in expectations.iter().enumerate() {
                out[[j / PATCH_SIZE, k / PATCH_SIZE, channel]] = value;
            }
        }

        Ok(out)
    }

    /// Transform a batch of images (N, H, W, 1) into (N, H/2, W/2, 4).
    ///
    /// Images are processed in parallel; the kernel is shared read-only, so
    /// the result is identical to a sequential map.
    pub fn transform_batch(&self, images: &Array4<f64>) -> Result<Array4<f64>, QuanvError> {
        let (count, height, width, channels) = images.dim();
        Self::check_shape(height, width, channels)?;

        debug!(images = count, "applying quanvolution to batch");

        let owned: Vec<Array3<f64>> = images
            .axis_iter(Axis(0))
            .map(|image| image.to_owned())
            .collect();

        let features: Vec<Array3<f64>> = owned
            .par_iter()
            .map(|image| self.transform(image))
            .collect::<Result<_, _>>()?;

        let mut out = Array4::zeros((count, height / PATCH_SIZE, width / PATCH_SIZE, WIRES));
        for (index, feature) in features.iter().enumerate() {
            out.index_axis_mut(Axis(0), index).assign(feature);
        }

        Ok(out)
    }

    fn check_shape(height: usize, width: usize, channels: usize) -> Result<(), QuanvError> {
        let even = |n: usize| n >= PATCH_SIZE && n % PATCH_SIZE == 0;
        if channels != 1 || !even(height) || !even(width) {
            return Err(QuanvError::InvalidImageShape {
                height,
                width,
                channels,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_origins_cover_image_exactly() {
        let origins: Vec<_> = patch_origins(4, 6).collect();
        assert_eq!(origins.len(), 2 * 3);
        assert_eq!(origins[0], (0, 0));
        assert_eq!(origins[1], (0, 2));
        assert_eq!(*origins.last().unwrap(), (2, 4));
    }

    #[test]
    fn test_patch_origins_restartable() {
        let first: Vec<_> = patch_origins(4, 4).collect();
        let second: Vec<_> = patch_origins(4, 4).collect();
        assert_eq!(first, second);
    }
}
