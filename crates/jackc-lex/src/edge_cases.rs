#[cfg(test)]
mod tests {
    use crate::tokenize;
    use crate::token::TokenKind;

    fn lex_all(source: &str) -> Vec<crate::Token> {
        tokenize(source).unwrap()
    }

    #[test]
    fn test_edge_empty_source() {
        assert!(lex_all("").is_empty());
    }

    #[test]
    fn test_edge_source_that_is_all_comments() {
        assert!(lex_all("// just this\n/* and this */\n").is_empty());
    }

    #[test]
    fn test_edge_single_char_identifier() {
        let toks = lex_all("x");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::Identifier);
        assert_eq!(toks[0].text, "x");
    }

    #[test]
    fn test_edge_keyword_prefix_is_not_a_keyword() {
        let toks = lex_all("classroom");
        assert_eq!(toks[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_edge_zero_literal() {
        let toks = lex_all("0");
        assert_eq!(toks[0].kind, TokenKind::IntConst);
        assert_eq!(toks[0].int_value(), 0);
    }

    #[test]
    fn test_edge_max_int_literal() {
        let toks = lex_all("32767");
        assert_eq!(toks[0].int_value(), 32767);
    }

    #[test]
    fn test_edge_empty_string_constant() {
        let toks = lex_all("\"\"");
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].kind, TokenKind::StringConst);
        assert_eq!(toks[0].string_value(), "");
    }

    #[test]
    fn test_edge_adjacent_symbols_are_distinct_tokens() {
        let toks = lex_all("(())");
        assert_eq!(toks.len(), 4);
        assert!(toks.iter().all(|t| t.kind == TokenKind::Symbol));
    }

    #[test]
    fn test_edge_every_reserved_word_is_a_keyword() {
        for kw in crate::KEYWORDS {
            let toks = lex_all(kw);
            assert_eq!(toks.len(), 1, "keyword {kw} should lex to one token");
            assert_eq!(toks[0].kind, TokenKind::Keyword);
        }
    }

    #[test]
    fn test_edge_every_symbol_byte_is_recognized() {
        for &b in crate::SYMBOLS {
            let s = (b as char).to_string();
            let toks = lex_all(&s);
            assert_eq!(toks.len(), 1);
            assert_eq!(toks[0].kind, TokenKind::Symbol);
        }
    }
}
