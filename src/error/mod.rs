#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid kernel size: {0} should be at least 2")]
    InvalidKernelSize(usize),

    #[error("Mismatched shape: {0} should be {1}")]
    MismatchedShape(String, String),

    #[error("Validation Error: {0} should be {1}")]
    Validation(String, String),
}
