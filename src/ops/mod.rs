// ============================================================================
// PIXEL OPERATIONS — pure transforms over PixelBuffer values
// ============================================================================
//
// Every operation reads one buffer and allocates its output; inputs are never
// mutated. Validation happens before any pixel work, so a returned error
// means no buffer was produced.

pub mod curves;
pub mod histogram;
pub mod kernel;
pub mod resample;

/// Validation failure for a requested pixel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    /// A resample target dimension was zero, or the scale factor was not a
    /// positive finite number.
    InvalidDimension(String),
    /// Tone-curve control points out of order (`input1 >= input2`).
    InvalidCurveParams(String),
}

impl std::fmt::Display for OpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpError::InvalidDimension(msg) => write!(f, "invalid dimension: {}", msg),
            OpError::InvalidCurveParams(msg) => write!(f, "invalid curve parameters: {}", msg),
        }
    }
}
