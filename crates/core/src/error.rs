#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Malformed directive: {0}")]
    MalformedDirective(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}
