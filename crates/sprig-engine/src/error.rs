use thiserror::Error;

/// Errors raised by the engine's construction-time and I/O paths.
///
/// The frame loop itself never fails; a bad frame is just a bad frame.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A surface was requested with a zero or unrepresentable pixel size.
    #[error("invalid surface size {width}x{height}")]
    InvalidSurfaceSize { width: u32, height: u32 },

    /// Surface lookup by selector found nothing.
    #[error("no surface matches selector `{0}`")]
    SurfaceNotFound(String),

    /// A blend mode name that is not a known composite operation.
    #[error("unknown blend mode `{0}`")]
    UnknownBlendMode(String),

    /// Decoding or encoding an image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
