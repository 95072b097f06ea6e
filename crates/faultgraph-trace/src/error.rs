use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed trace header on line {line}: {message}")]
    Header { line: usize, message: String },

    #[error("malformed test case record on line {line}: {message}")]
    Record { line: usize, message: String },

    #[error("invalid count for `{key}`: `{value}`")]
    InvalidCount { key: String, value: String },

    #[error("invalid test verdict `{0}` (expected `success` or `fail`)")]
    InvalidVerdict(String),

    #[error("invalid node id `{token}`")]
    InvalidNode { token: String },

    #[error("malformed node info on line {line}: {message}")]
    NodeInfo { line: usize, message: String },
}
