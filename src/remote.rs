//! Boundaries to the remote collaborators: the snap generation function and
//! the history/favorites store.
//!
//! Both are opaque to the pipeline. The generation call is issued once per
//! frame, strictly sequentially; a failed frame is recorded and skipped so
//! the rest of the batch still runs. The batch as a whole only fails when
//! zero frames succeed.

use crate::error::{Error, Result};

/// One frame's generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// First portrait as a data URI.
    pub portrait1: String,
    /// Second portrait as a data URI.
    pub portrait2: String,
    /// Style identifier for the frame sequence.
    pub frame_style: String,
    /// Zero-based index of this frame.
    pub frame_index: u32,
    /// Total frames in the batch.
    pub total_frames: u32,
}

/// A successfully generated frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFrame {
    /// Zero-based frame index.
    pub frame_index: u32,
    /// Where the generated image can be fetched.
    pub image_url: String,
}

/// A frame that failed to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameFailure {
    /// Zero-based frame index.
    pub frame_index: u32,
    /// The collaborator's error message.
    pub message: String,
}

/// Outcome of a full generation batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Frames that generated successfully, in request order.
    pub frames: Vec<GeneratedFrame>,
    /// Frames that failed and were skipped.
    pub failures: Vec<FrameFailure>,
}

/// The external image generation service, one call per frame.
pub trait GenerationService {
    /// Generate a single frame. The error string is the collaborator's
    /// message, surfaced to the user verbatim.
    fn generate(&self, request: &GenerateRequest) -> std::result::Result<GeneratedFrame, String>;
}

/// Run a sequential generation batch over both portraits.
///
/// Per-frame failures are collected into the report and the batch
/// continues with the remaining frames.
///
/// # Errors
///
/// Returns [`Error::GenerationFailed`] if no frame succeeded.
pub fn generate_batch(
    service: &impl GenerationService,
    portrait1: &str,
    portrait2: &str,
    frame_style: &str,
    total_frames: u32,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for frame_index in 0..total_frames {
        let request = GenerateRequest {
            portrait1: portrait1.to_string(),
            portrait2: portrait2.to_string(),
            frame_style: frame_style.to_string(),
            frame_index,
            total_frames,
        };
        match service.generate(&request) {
            Ok(frame) => report.frames.push(frame),
            Err(message) => report.failures.push(FrameFailure {
                frame_index,
                message,
            }),
        }
    }

    if report.frames.is_empty() {
        return Err(Error::GenerationFailed(format!(
            "all {total_frames} frames failed"
        )));
    }
    Ok(report)
}

/// The remote history/favorites store. Success or failure is all the
/// pipeline ever observes.
pub trait SnapStore {
    /// Record a generated image in the user's history.
    fn save_to_history(&mut self, image_url: &str, prompt: &str) -> Result<()>;

    /// Mark a generated image as a favorite.
    fn add_favorite(&mut self, image_url: &str, prompt: &str) -> Result<()>;
}

/// Best-effort: save every generated frame to history.
///
/// Individual save failures are swallowed (history is not worth failing a
/// finished batch over); returns how many frames were recorded.
pub fn record_batch(store: &mut impl SnapStore, report: &BatchReport, prompt: &str) -> usize {
    report
        .frames
        .iter()
        .filter(|frame| store.save_to_history(&frame.image_url, prompt).is_ok())
        .count()
}
