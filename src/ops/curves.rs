// ============================================================================
// TONE CURVE — two-control-point piecewise-linear LUT correction
// ============================================================================

use rayon::prelude::*;

use super::OpError;
use crate::buffer::PixelBuffer;

/// The two control points of a tone curve, each component an 8-bit level.
/// Invariant: `input1 < input2`, enforced by [`CurvePoints::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurvePoints {
    input1: u8,
    output1: u8,
    input2: u8,
    output2: u8,
}

impl CurvePoints {
    pub fn new(input1: u8, output1: u8, input2: u8, output2: u8) -> Result<Self, OpError> {
        if input1 >= input2 {
            return Err(OpError::InvalidCurveParams(format!(
                "first input level ({}) must be below the second ({})",
                input1, input2
            )));
        }
        Ok(CurvePoints {
            input1,
            output1,
            input2,
            output2,
        })
    }
}

/// Build the 256-entry lookup table for a curve.
///
/// Three linear segments: origin → point 1, point 1 → point 2, and
/// point 2 → (255, 255). Values are rounded then clamped to [0, 255].
pub fn build_lut(points: &CurvePoints) -> [u8; 256] {
    let in1 = points.input1 as f64;
    let out1 = points.output1 as f64;
    let in2 = points.input2 as f64;
    let out2 = points.output2 as f64;

    let mut lut = [0u8; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let x = i as f64;
        let v = if x <= in1 {
            if points.input1 == 0 {
                // Only level 0 lands here and the origin segment has no
                // extent; hold the first output level instead of dividing.
                out1
            } else {
                (out1 / in1) * x
            }
        } else if x <= in2 {
            out1 + ((out2 - out1) / (in2 - in1)) * (x - in1)
        } else {
            // Unreachable when input2 == 255 (every x <= 255 matches above),
            // so the divisor is never zero.
            out2 + ((255.0 - out2) / (255.0 - in2)) * (x - in2)
        };
        *slot = v.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Map every R, G, B byte through the table; alpha is copied through.
pub fn apply_lut(src: &PixelBuffer, lut: &[u8; 256]) -> PixelBuffer {
    let stride = src.row_stride();
    let src_raw = src.as_bytes();
    let mut dst = vec![0u8; src_raw.len()];

    dst.par_chunks_mut(stride.max(1))
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &src_raw[y * stride..y * stride + row_out.len()];
            for (px_out, px_in) in row_out.chunks_exact_mut(4).zip(row_in.chunks_exact(4)) {
                px_out[0] = lut[px_in[0] as usize];
                px_out[1] = lut[px_in[1] as usize];
                px_out[2] = lut[px_in[2] as usize];
                px_out[3] = px_in[3];
            }
        });

    PixelBuffer::from_raw(src.width(), src.height(), dst).unwrap()
}
