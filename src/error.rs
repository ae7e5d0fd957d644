/// All error types for the scene mesh core.
///
/// Geometry passes themselves never fail; these cover caller-supplied
/// buffer shapes, explicit validation and configuration.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MeshError {
    #[error("Buffer size error: {buffer} expects {expected} elements, got {actual}")]
    BufferSize {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Index out of range: {what} index {index} >= {count}")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        count: usize,
    },
    #[error("Invalid motion step count: {0} (must be at least 1)")]
    InvalidMotionSteps(u32),
    #[error("Attribute type error: {name} is not {expected} data")]
    AttributeType {
        name: String,
        expected: &'static str,
    },
    #[error("Inconsistent mesh: {0}")]
    Inconsistent(String),
    #[error("Config error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MeshError>;

/// Fail with [`MeshError::BufferSize`] unless `actual == expected`.
pub(crate) fn check_len(buffer: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(MeshError::BufferSize {
            buffer,
            expected,
            actual,
        });
    }
    Ok(())
}
