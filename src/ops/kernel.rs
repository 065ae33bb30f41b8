// ============================================================================
// CONVOLUTION — 3×3 kernel filtering with clamp-to-edge padding
// ============================================================================

use rayon::prelude::*;

use crate::buffer::{BYTES_PER_PIXEL, PixelBuffer};

/// A 3×3 convolution kernel of signed weights, row-major.
///
/// The convolution applies the weights exactly as given — there is no
/// normalization by the kernel sum. The smoothing presets therefore carry
/// already-normalized weights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kernel(pub [[f64; 3]; 3]);

impl Kernel {
    /// Passes every pixel through unchanged.
    pub const IDENTITY: Kernel = Kernel([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]);

    /// Classic 4-neighbor sharpen.
    pub const SHARPEN: Kernel = Kernel([[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]]);

    /// 3×3 gaussian approximation (1-2-1 outer product, weights sum to 1).
    pub const GAUSSIAN: Kernel = Kernel([
        [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
        [2.0 / 16.0, 4.0 / 16.0, 2.0 / 16.0],
        [1.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
    ]);

    /// Uniform box blur (weights sum to 1).
    pub const BOX_BLUR: Kernel = Kernel([
        [1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0],
        [1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0],
        [1.0 / 9.0, 1.0 / 9.0, 1.0 / 9.0],
    ]);

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Kernel> {
        match name {
            "identity" => Some(Kernel::IDENTITY),
            "sharpen" => Some(Kernel::SHARPEN),
            "gaussian" => Some(Kernel::GAUSSIAN),
            "box-blur" | "box_blur" | "boxblur" => Some(Kernel::BOX_BLUR),
            _ => None,
        }
    }

    pub fn weights(&self) -> &[[f64; 3]; 3] {
        &self.0
    }
}

/// Convolve the R, G, B channels with a 3×3 kernel; alpha is copied through.
///
/// Out-of-bounds neighbor lookups clamp to the nearest edge pixel, so the
/// identity kernel reproduces the input exactly, border rows included. Each
/// channel sum is rounded and clamped to [0, 255] on write-back.
pub fn convolve(src: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let w = src.width() as usize;
    let h = src.height() as usize;
    if w == 0 || h == 0 {
        return src.clone();
    }

    let k = kernel.0;
    let src_raw = src.as_bytes();
    let stride = src.row_stride();
    let mut dst = vec![0u8; src_raw.len()];

    dst.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            for x in 0..w {
                let mut r = 0.0f64;
                let mut g = 0.0f64;
                let mut b = 0.0f64;
                for (ky, k_row) in k.iter().enumerate() {
                    let sy = (y as isize + ky as isize - 1).clamp(0, h as isize - 1) as usize;
                    for (kx, &kv) in k_row.iter().enumerate() {
                        let sx = (x as isize + kx as isize - 1).clamp(0, w as isize - 1) as usize;
                        let si = sy * stride + sx * BYTES_PER_PIXEL;
                        r += src_raw[si] as f64 * kv;
                        g += src_raw[si + 1] as f64 * kv;
                        b += src_raw[si + 2] as f64 * kv;
                    }
                }
                let di = x * BYTES_PER_PIXEL;
                row_out[di] = r.round().clamp(0.0, 255.0) as u8;
                row_out[di + 1] = g.round().clamp(0.0, 255.0) as u8;
                row_out[di + 2] = b.round().clamp(0.0, 255.0) as u8;
                row_out[di + 3] = src_raw[y * stride + di + 3];
            }
        });

    PixelBuffer::from_raw(src.width(), src.height(), dst).unwrap()
}
