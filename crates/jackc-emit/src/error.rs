use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EmitError>;
