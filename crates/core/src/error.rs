#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A required caller input was empty or absent.
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("Validation failed: {0}")]
    Validation(String),
}
