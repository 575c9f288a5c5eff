use thiserror::Error;

/// Every failure mode the parser-emitter can hit. All are fatal: there is
/// no recovery, and the first one encountered aborts the compilation unit.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("unexpected token {found:?}, expected {expected}")]
    UnexpectedToken { expected: String, found: String },

    #[error("undefined symbol `{0}`")]
    UndefinedSymbol(String),

    #[error(transparent)]
    Emit(#[from] jackc_emit::EmitError),
}

pub type Result<T> = std::result::Result<T, ParseError>;
