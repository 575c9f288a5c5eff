//! The XML sink (C4): an indented element emitter for stage A.
//!
//! Two primitives: a *pure tag* (`open`/`close`, each on its own line at
//! 2-space-per-depth indent) for grammatical non-terminals, and a *leaf
//! tag* for tokens (`<kind> text </kind>` on one line). Leaf text is
//! escaped for `< > &`; no other characters need escaping since this is
//! element text, not an attribute value.

use std::io::Write;

use jackc_lex::{Token, TokenKind};

use crate::error::Result;

pub struct XmlWriter<W: Write> {
    out: W,
    depth: usize,
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        XmlWriter { out, depth: 0 }
    }

    fn indent(&mut self) -> Result<()> {
        for _ in 0..self.depth {
            write!(self.out, "  ")?;
        }
        Ok(())
    }

    /// Open a non-terminal element and increase the indent depth for what
    /// follows.
    pub fn open(&mut self, tag: &str) -> Result<()> {
        self.indent()?;
        writeln!(self.out, "<{tag}>")?;
        self.depth += 1;
        Ok(())
    }

    /// Decrease the indent depth and close a non-terminal element opened
    /// with [`open`](Self::open).
    pub fn close(&mut self, tag: &str) -> Result<()> {
        self.depth -= 1;
        self.indent()?;
        writeln!(self.out, "</{tag}>")?;
        Ok(())
    }

    /// Emit a leaf element for a single token.
    ///
    /// A token classified `identifier` whose text is actually one of the
    /// 21 reserved words is re-tagged `keyword` — preserved from the
    /// source system as a byte-identical-output quirk, not a bug worth
    /// fixing: nothing downstream of stage A parses this XML back in.
    pub fn leaf(&mut self, token: &Token) -> Result<()> {
        let tag = match token.kind {
            TokenKind::Identifier if jackc_lex::is_keyword(&token.text) => "keyword",
            other => tag_name(other),
        };
        let text = if token.kind == TokenKind::StringConst {
            token.string_value().to_string()
        } else {
            token.text.clone()
        };
        self.indent()?;
        writeln!(self.out, "<{tag}> {} </{tag}>", escape(&text))?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn tag_name(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Keyword => "keyword",
        TokenKind::Symbol => "symbol",
        TokenKind::IntConst => "integerConstant",
        TokenKind::StringConst => "stringConstant",
        TokenKind::Identifier => "identifier",
    }
}
