use thiserror::Error;

#[derive(Debug, Error)]
pub enum RectPackError {
    #[error("Invalid geometry: width {w} and height {h} must both be positive and the far edges must fit the coordinate type")]
    InvalidGeometry { w: String, h: String },
    #[error("Index {index} out of range for {len} free rectangles")]
    OutOfRange { index: usize, len: usize },
    #[error("Free-rectangle invariant violated: {0}")]
    InvariantViolation(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, RectPackError>;
