use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The document was not valid JSON for the expected shape. The store
    /// guarantees prior state stays intact when this is returned.
    #[error("invalid graph JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
