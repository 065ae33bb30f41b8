// ============================================================================
// RESAMPLING — nearest-neighbor scaling between RGBA buffers
// ============================================================================

use rayon::prelude::*;

use super::OpError;
use crate::buffer::{BYTES_PER_PIXEL, PixelBuffer};

/// Scale a buffer by a uniform factor using nearest-neighbor sampling.
///
/// Output dimensions are `floor(src * factor)`. A factor that is not a
/// positive finite number, or one small enough to floor a dimension to zero,
/// is rejected before any pixel work.
pub fn scale_nearest(src: &PixelBuffer, factor: f64) -> Result<PixelBuffer, OpError> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(OpError::InvalidDimension(format!(
            "scale factor must be a positive number, got {}",
            factor
        )));
    }
    let new_w = (src.width() as f64 * factor).floor() as u32;
    let new_h = (src.height() as f64 * factor).floor() as u32;
    resize_nearest(src, new_w, new_h)
}

/// Resample a buffer to explicit target dimensions, nearest-neighbor.
///
/// Each destination pixel (x, y) copies all four channels of the source pixel
/// at `floor((x / new_w) * src_w)`, `floor((y / new_h) * src_h)` — no
/// interpolation, no blending. Deterministic for a fixed input and target.
pub fn resize_nearest(src: &PixelBuffer, new_w: u32, new_h: u32) -> Result<PixelBuffer, OpError> {
    if new_w == 0 || new_h == 0 {
        return Err(OpError::InvalidDimension(format!(
            "target size {}x{} has a zero dimension",
            new_w, new_h
        )));
    }

    let src_w = src.width() as usize;
    let src_h = src.height() as usize;
    let src_raw = src.as_bytes();
    let src_stride = src.row_stride();
    let dst_stride = new_w as usize * BYTES_PER_PIXEL;
    let mut dst = vec![0u8; new_h as usize * dst_stride];

    dst.par_chunks_mut(dst_stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            // .min guards the float product landing exactly on src_h.
            let src_y = ((y as f64 / new_h as f64) * src_h as f64) as usize;
            let src_y = src_y.min(src_h - 1);
            let row_in = &src_raw[src_y * src_stride..(src_y + 1) * src_stride];
            for x in 0..new_w as usize {
                let src_x = ((x as f64 / new_w as f64) * src_w as f64) as usize;
                let src_x = src_x.min(src_w - 1);
                let di = x * BYTES_PER_PIXEL;
                let si = src_x * BYTES_PER_PIXEL;
                row_out[di..di + BYTES_PER_PIXEL].copy_from_slice(&row_in[si..si + BYTES_PER_PIXEL]);
            }
        });

    Ok(PixelBuffer::from_raw(new_w, new_h, dst).unwrap())
}

/// Largest dimensions that fit inside `max_w` × `max_h` while preserving the
/// source aspect ratio (the resize dialog's "keep aspect" option).
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let aspect = src_w as f64 / src_h as f64;
    if max_w as f64 / max_h as f64 > aspect {
        let w = (max_h as f64 * aspect).round() as u32;
        (w.max(1), max_h)
    } else {
        let h = (max_w as f64 / aspect).round() as u32;
        (max_w, h.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(w: u32, h: u32) -> PixelBuffer {
        let mut raw = Vec::with_capacity((w * h * 4) as usize);
        for y in 0..h {
            for x in 0..w {
                let v = if (x + y) % 2 == 0 { 255 } else { 0 };
                raw.extend_from_slice(&[v, v, v, 255]);
            }
        }
        PixelBuffer::from_raw(w, h, raw).unwrap()
    }

    #[test]
    fn unit_factor_is_identity() {
        let src = checkerboard(5, 3);
        let out = scale_nearest(&src, 1.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn deterministic_for_fixed_factor() {
        let src = checkerboard(7, 4);
        let a = scale_nearest(&src, 1.7).unwrap();
        let b = scale_nearest(&src, 1.7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn white_4x4_halves_to_white_2x2() {
        let src = PixelBuffer::new_filled(4, 4, [255, 255, 255, 255]);
        let out = scale_nearest(&src, 0.5).unwrap();
        assert_eq!(out.width(), 2);
        assert_eq!(out.height(), 2);
        assert!(out.as_bytes().iter().all(|&b| b == 255));
    }

    #[test]
    fn dimensions_floor() {
        let src = checkerboard(5, 3);
        let out = scale_nearest(&src, 0.5).unwrap();
        assert_eq!((out.width(), out.height()), (2, 1));
    }

    #[test]
    fn alpha_copied_verbatim() {
        let src = PixelBuffer::new_filled(4, 4, [10, 20, 30, 77]);
        let out = scale_nearest(&src, 2.0).unwrap();
        assert!(out.as_bytes().chunks_exact(4).all(|p| p == [10, 20, 30, 77]));
    }

    #[test]
    fn rejects_bad_factors() {
        let src = checkerboard(4, 4);
        assert!(matches!(
            scale_nearest(&src, 0.0),
            Err(OpError::InvalidDimension(_))
        ));
        assert!(matches!(
            scale_nearest(&src, -1.5),
            Err(OpError::InvalidDimension(_))
        ));
        assert!(matches!(
            scale_nearest(&src, f64::NAN),
            Err(OpError::InvalidDimension(_))
        ));
        // 4 * 0.1 floors to 0.
        assert!(matches!(
            scale_nearest(&src, 0.1),
            Err(OpError::InvalidDimension(_))
        ));
    }

    #[test]
    fn rejects_zero_target() {
        let src = checkerboard(4, 4);
        assert!(resize_nearest(&src, 0, 4).is_err());
        assert!(resize_nearest(&src, 4, 0).is_err());
    }

    #[test]
    fn source_unchanged() {
        let src = checkerboard(6, 6);
        let before = src.clone();
        let _ = scale_nearest(&src, 0.5).unwrap();
        assert_eq!(src, before);
    }

    #[test]
    fn upscale_repeats_source_pixels() {
        // 2x2 distinct pixels doubled: each source pixel becomes a 2x2 block.
        let raw = vec![
            10, 0, 0, 255, 20, 0, 0, 255, //
            30, 0, 0, 255, 40, 0, 0, 255,
        ];
        let src = PixelBuffer::from_raw(2, 2, raw).unwrap();
        let out = resize_nearest(&src, 4, 4).unwrap();
        assert_eq!(out.pixel(0, 0).unwrap()[0], 10);
        assert_eq!(out.pixel(1, 1).unwrap()[0], 10);
        assert_eq!(out.pixel(2, 0).unwrap()[0], 20);
        assert_eq!(out.pixel(1, 2).unwrap()[0], 30);
        assert_eq!(out.pixel(3, 3).unwrap()[0], 40);
    }

    #[test]
    fn fit_preserves_aspect() {
        // 2:1 source into a square box → width-bound.
        assert_eq!(fit_dimensions(200, 100, 80, 80), (80, 40));
        // 1:2 source into a square box → height-bound.
        assert_eq!(fit_dimensions(100, 200, 80, 80), (40, 80));
        // Already matching aspect.
        assert_eq!(fit_dimensions(400, 300, 40, 30), (40, 30));
        // Never collapses to zero.
        assert_eq!(fit_dimensions(1000, 1, 5, 5), (5, 1));
    }
}
