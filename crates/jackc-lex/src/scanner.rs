use crate::error::{LexError, Result};
use crate::preprocess::strip_comments;
use crate::token::{classify, is_symbol_byte, Token, TokenKind};

/// Tokenize a whole Jack source file.
///
/// Runs the comment-stripping pre-pass first, then walks the flattened
/// buffer byte by byte: a double quote starts a run that swallows
/// everything (including whitespace) up to the next double quote; any
/// other symbol byte ends the current lexeme and is itself emitted as a
/// one-byte token; whitespace ends the current lexeme without being
/// emitted; anything else accumulates.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let flattened = strip_comments(source);
    let bytes = flattened.as_bytes();
    let mut tokens = Vec::new();
    let mut acc = String::new();
    let mut i = 0;

    let flush = |acc: &mut String, tokens: &mut Vec<Token>| {
        if !acc.is_empty() {
            let kind = classify(acc);
            tokens.push(Token::new(kind, std::mem::take(acc)));
        }
    };

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' {
            flush(&mut acc, &mut tokens);
            let start = i;
            let mut j = i + 1;
            loop {
                if j >= bytes.len() {
                    return Err(LexError::UnterminatedString(
                        flattened[start..j].to_string(),
                    ));
                }
                if bytes[j] == b'"' {
                    break;
                }
                j += 1;
            }
            let text = &flattened[start..=j];
            tokens.push(Token::new(TokenKind::StringConst, text));
            i = j + 1;
            continue;
        }
        if is_symbol_byte(b) {
            flush(&mut acc, &mut tokens);
            tokens.push(Token::new(TokenKind::Symbol, (b as char).to_string()));
            i += 1;
            continue;
        }
        if b == b' ' || b == b'\n' || b == b'\t' || b == b'\r' {
            flush(&mut acc, &mut tokens);
            i += 1;
            continue;
        }
        acc.push(b as char);
        i += 1;
    }
    flush(&mut acc, &mut tokens);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn tokenizes_minimal_class() {
        let toks = tokenize("class A {}").unwrap();
        assert_eq!(texts(&toks), vec!["class", "A", "{", "}"]);
        assert_eq!(toks[0].kind, TokenKind::Keyword);
        assert_eq!(toks[1].kind, TokenKind::Identifier);
        assert_eq!(toks[2].kind, TokenKind::Symbol);
    }

    #[test]
    fn tokenizes_string_constant_with_embedded_space() {
        let toks = tokenize("\"hi there\"").unwrap();
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::StringConst);
        assert_eq!(toks[0].string_value(), "hi there");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("\"oops").unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString(_)));
    }

    #[test]
    fn strips_comments_before_scanning() {
        let toks = tokenize("// header\nclass A {} // trailing\n").unwrap();
        assert_eq!(texts(&toks), vec!["class", "A", "{", "}"]);
    }

    #[test]
    fn int_const_is_classified_correctly() {
        let toks = tokenize("let x = 32767;").unwrap();
        let int_tok = toks.iter().find(|t| t.text == "32767").unwrap();
        assert_eq!(int_tok.kind, TokenKind::IntConst);
        assert_eq!(int_tok.int_value(), 32767);
    }
}
