use thiserror::Error;

/// Tokenization is infallible over well-formed Jack source; this enum
/// exists for the narrow set of inputs the scanner refuses to guess about
/// (an unterminated string, a byte that starts no valid lexeme).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal starting with: {0}")]
    UnterminatedString(String),
}

pub type Result<T> = std::result::Result<T, LexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unterminated_string_display() {
        let err = LexError::UnterminatedString("\"abc".to_string());
        assert_eq!(err.to_string(), "unterminated string literal starting with: \"abc");
    }

}
