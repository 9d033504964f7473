use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("number of dimensions must be between 1 and 3, got {0}")]
    InvalidDimension(u8),
    #[error("{0} must be a positive integer")]
    NotPositive(&'static str),
    #[error("start position has {got} coordinates, expected {expected}")]
    StartMismatch { expected: usize, got: usize },
    #[error("start position must be finite, got {0:?}")]
    NonFiniteStart(Vec<f64>),
    #[error("invalid start position {0:?}")]
    MalformedStart(String),
    #[error("invalid step distribution: {0}")]
    InvalidDistribution(String),
    #[error("invalid file name {0:?}")]
    InvalidName(String),
    #[error("histogram needs at least one value and one bin")]
    EmptyHistogram,
    #[error("failed to read config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to render image: {0}")]
    Render(String),
    #[error("viewer failed: {0}")]
    Viewer(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
