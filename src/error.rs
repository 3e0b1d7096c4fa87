//! Error types for the snapstudio crate.

/// Errors that can occur in the pixel pipeline and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source image failed to decode or is not readable.
    #[error("failed to decode source image: {0}")]
    Decode(image::ImageError),

    /// Raw channel data does not match the declared dimensions.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize {
        /// Expected byte length (`width * height * 4`).
        expected: usize,
        /// Actual byte length supplied.
        actual: usize,
    },

    /// The output drawing surface could not be acquired.
    #[error("cannot acquire a {width}x{height} output surface")]
    SurfaceUnavailable {
        /// Requested surface width in pixels.
        width: u32,
        /// Requested surface height in pixels.
        height: u32,
    },

    /// Failed to serialize the final buffer to an output image format.
    #[error("failed to encode output image: {0}")]
    Encode(image::ImageError),

    /// The supplied font data could not be parsed.
    #[error("invalid font data: {0}")]
    Font(ab_glyph::InvalidFont),

    /// A color string was not of the form `#rrggbb`.
    #[error("invalid color {0:?}: expected #rrggbb")]
    Color(String),

    /// No preset exists with the given identifier.
    #[error("unknown preset: {0:?}")]
    UnknownPreset(String),

    /// Every frame of a generation batch failed.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// Failed to serialize preset data to JSON.
    #[error("failed to serialize presets: {0}")]
    Serialize(#[from] serde_json::Error),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let mismatch = Error::BufferSize {
            expected: 64,
            actual: 60,
        };
        assert!(mismatch.to_string().contains("64"));
        assert!(mismatch.to_string().contains("60"));

        let surface = Error::SurfaceUnavailable {
            width: 0,
            height: 300,
        };
        assert!(surface.to_string().contains("0x300"));

        let unknown = Error::UnknownPreset("mystery".to_string());
        assert!(unknown.to_string().contains("mystery"));
    }
}
