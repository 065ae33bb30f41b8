// ============================================================================
// EDITOR SESSION — current buffer + original snapshot
// ============================================================================

use std::path::Path;

use crate::buffer::PixelBuffer;
use crate::io::{self, LoadError};
use crate::log_info;
use crate::ops::OpError;
use crate::ops::curves::{self, CurvePoints};
use crate::ops::histogram::Histogram;
use crate::ops::kernel::{self, Kernel};
use crate::ops::resample;

/// Editing state for one loaded image.
///
/// `original` is captured once per load and never changes until the next
/// load; every operation replaces `current` with a freshly produced buffer.
/// A failed operation leaves `current` untouched — validation happens before
/// any pixel work.
pub struct EditorSession {
    original: PixelBuffer,
    current: PixelBuffer,
}

impl EditorSession {
    /// Start a session from an already-decoded buffer, capturing it as the
    /// original snapshot.
    pub fn from_buffer(buf: PixelBuffer) -> Self {
        EditorSession {
            current: buf.clone(),
            original: buf,
        }
    }

    /// Decode an image file and start a session on it.
    pub fn load_from_path(path: &Path) -> Result<Self, LoadError> {
        let buf = io::load_buffer(path)?;
        log_info!(
            "loaded {} ({}x{})",
            path.display(),
            buf.width(),
            buf.height()
        );
        Ok(Self::from_buffer(buf))
    }

    pub fn current(&self) -> &PixelBuffer {
        &self.current
    }

    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    /// Nearest-neighbor scale by a uniform factor.
    pub fn scale(&mut self, factor: f64) -> Result<(), OpError> {
        let out = resample::scale_nearest(&self.current, factor)?;
        log_info!("scaled by {} -> {}x{}", factor, out.width(), out.height());
        self.current = out;
        Ok(())
    }

    /// Nearest-neighbor resize to explicit dimensions.
    pub fn resize(&mut self, new_w: u32, new_h: u32) -> Result<(), OpError> {
        let out = resample::resize_nearest(&self.current, new_w, new_h)?;
        log_info!("resized to {}x{}", out.width(), out.height());
        self.current = out;
        Ok(())
    }

    /// Apply a tone curve. The points were validated at construction, so this
    /// cannot fail.
    pub fn curve(&mut self, points: &CurvePoints) {
        let lut = curves::build_lut(points);
        self.current = curves::apply_lut(&self.current, &lut);
        log_info!("applied tone curve {:?}", points);
    }

    /// Apply a 3×3 convolution kernel.
    pub fn kernel(&mut self, kernel: &Kernel) {
        self.current = kernel::convolve(&self.current, kernel);
        log_info!("applied kernel {:?}", kernel.weights());
    }

    /// Histogram of the current buffer.
    pub fn histogram(&self) -> Histogram {
        Histogram::build(&self.current)
    }

    /// Eyedropper: sample the current buffer at (x, y).
    pub fn sample(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.current.pixel(x, y)
    }

    /// Restore the original snapshot byte-for-byte. Not a curve inverse —
    /// the untouched load-time pixels come back regardless of what was
    /// applied since.
    pub fn reset(&mut self) {
        self.current = self.original.clone();
        log_info!("reset to original {}x{}", self.current.width(), self.current.height());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_4x4() -> EditorSession {
        let mut raw = Vec::new();
        for i in 0..16u32 {
            raw.extend_from_slice(&[(i * 16) as u8, (255 - i * 16) as u8, 128, 255]);
        }
        EditorSession::from_buffer(PixelBuffer::from_raw(4, 4, raw).unwrap())
    }

    #[test]
    fn reset_restores_bytes_after_op_sequence() {
        let mut session = session_4x4();
        let original = session.original().clone();

        session.scale(0.5).unwrap();
        session
            .curve(&CurvePoints::new(64, 0, 192, 255).unwrap());
        session.kernel(&Kernel::SHARPEN);
        assert_ne!(session.current(), &original);

        session.reset();
        assert_eq!(session.current(), &original);
        assert_eq!(
            session.current().as_bytes(),
            original.as_bytes()
        );
    }

    #[test]
    fn failed_scale_leaves_current_untouched() {
        let mut session = session_4x4();
        let before = session.current().clone();
        assert!(session.scale(0.0).is_err());
        assert!(session.scale(0.01).is_err());
        assert_eq!(session.current(), &before);
    }

    #[test]
    fn operations_replace_current_not_original() {
        let mut session = session_4x4();
        let original = session.original().clone();
        session.scale(2.0).unwrap();
        assert_eq!(session.current().width(), 8);
        assert_eq!(session.original(), &original);
    }

    #[test]
    fn sample_reads_current_buffer() {
        let mut session = session_4x4();
        let before = session.sample(0, 0).unwrap();
        session.curve(&CurvePoints::new(10, 255, 200, 255).unwrap());
        let after = session.sample(0, 0).unwrap();
        assert_ne!(before, after);
        assert_eq!(session.sample(4, 0), None);
    }
}
