#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read fixture file: {0}")]
    FixtureRead(std::io::Error),
    #[error("fixture schema mismatch at {path}: {message}")]
    FixtureSchema { path: String, message: String },
    #[error("invalid fixture data: {0}")]
    InvalidFixture(String),
    #[error("record not found for {0}")]
    SourceRecordMissing(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
