pub type RisoResult<T> = Result<T, RisoError>;

#[derive(thiserror::Error, Debug)]
pub enum RisoError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RisoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }
}
