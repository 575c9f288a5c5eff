//! The single-pass parser-emitter: a recursive-descent engine driven by
//! one token of lookahead that simultaneously recognizes the Jack grammar,
//! maintains the class/subroutine symbol scopes, and emits either VM
//! instructions ([`vm_compiler`]) or an XML parse tree ([`xml_compiler`]).
//! There is no intermediate syntax tree in either mode — the parse tree is
//! implicit in the recursion stack.

mod context;
mod cursor;
mod error;
mod vm_compiler;
mod xml_compiler;

pub use context::{CompileContext, Flavor};
pub use error::{ParseError, Result};
pub use vm_compiler::VmCompiler;
pub use xml_compiler::XmlCompiler;

use std::io::Write;

use jackc_lex::Token;

/// Compile one already-tokenized class to a VM instruction listing.
pub fn compile_to_vm<W: Write>(tokens: &[Token], out: W) -> Result<W> {
    let mut compiler = VmCompiler::new(tokens, out);
    compiler.compile_class()?;
    Ok(compiler.into_inner())
}

/// Compile one already-tokenized class to an indented XML parse tree.
pub fn compile_to_xml<W: Write>(tokens: &[Token], out: W) -> Result<W> {
    let mut compiler = XmlCompiler::new(tokens, out);
    compiler.compile_class()?;
    Ok(compiler.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jackc_lex::tokenize;

    #[test]
    fn compile_to_vm_returns_the_written_buffer() {
        let toks = tokenize("class A { function void f() { return; } }").unwrap();
        let out = compile_to_vm(&toks, Vec::new()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "function A.f 0\npush constant 0\nreturn\n"
        );
    }

    #[test]
    fn compile_to_xml_returns_the_written_buffer() {
        let toks = tokenize("class A {}").unwrap();
        let out = compile_to_xml(&toks, Vec::new()).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("<class>"));
    }
}
