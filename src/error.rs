use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("search bounds must be finite")]
    NonFiniteBounds,

    #[error("searchMax ({max}) must be greater than searchMin ({min})")]
    EmptySearchRange { min: f64, max: f64 },

    #[error("tolerance must be > 0, got {0}")]
    InvalidTolerance(f64),

    #[error("maxIterations must be > 0")]
    NoIterations,

    #[error("maxIterations ({requested}) must not exceed {max}")]
    TooManyIterations { requested: u32, max: u32 },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid request payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("failed to render JSON output: {0}")]
    Render(serde_json::Error),

    #[error(transparent)]
    Solve(#[from] SolveError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
