//! Stage A: the XML-emitting mode of the same traversal.
//!
//! No symbol table is consulted — this mode only recognizes the grammar
//! and echoes every consumed token as a leaf element, wrapped in nested
//! non-terminal elements that mirror the parse.

use std::io::Write;

use jackc_lex::{Token, TokenKind};
use jackc_emit::XmlWriter;

use crate::cursor::TokenCursor;
use crate::error::Result;

pub struct XmlCompiler<'a, W: Write> {
    cursor: TokenCursor<'a>,
    writer: XmlWriter<W>,
}

impl<'a, W: Write> XmlCompiler<'a, W> {
    pub fn new(tokens: &'a [Token], out: W) -> Self {
        XmlCompiler {
            cursor: TokenCursor::new(tokens),
            writer: XmlWriter::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn leaf(&mut self) -> Result<()> {
        let tok = self.cursor.advance()?.clone();
        self.writer.leaf(&tok)?;
        Ok(())
    }

    /// `class = "class" id "{" classVarDec* subroutineDec* "}"`
    pub fn compile_class(&mut self) -> Result<()> {
        self.writer.open("class")?;
        self.leaf()?; // "class"
        self.leaf()?; // class name
        self.leaf()?; // "{"
        loop {
            if self.cursor.is_keyword("static") || self.cursor.is_keyword("field") {
                self.compile_class_var_dec()?;
            } else if self.cursor.is_keyword("constructor")
                || self.cursor.is_keyword("function")
                || self.cursor.is_keyword("method")
            {
                self.compile_subroutine_dec()?;
            } else {
                break;
            }
        }
        self.leaf()?; // "}"
        self.writer.close("class")?;
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<()> {
        self.writer.open("classVarDec")?;
        self.leaf()?; // static|field
        self.leaf()?; // type
        self.leaf()?; // id
        while self.cursor.is_symbol(",") {
            self.leaf()?; // ","
            self.leaf()?; // id
        }
        self.leaf()?; // ";"
        self.writer.close("classVarDec")?;
        Ok(())
    }

    fn compile_subroutine_dec(&mut self) -> Result<()> {
        self.writer.open("subroutineDec")?;
        self.leaf()?; // constructor|function|method
        self.leaf()?; // void|type
        self.leaf()?; // subroutine name
        self.leaf()?; // "("
        self.compile_parameter_list()?;
        self.leaf()?; // ")"
        self.compile_subroutine_body()?;
        self.writer.close("subroutineDec")?;
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> Result<()> {
        self.writer.open("parameterList")?;
        if !self.cursor.is_symbol(")") {
            self.leaf()?; // type
            self.leaf()?; // id
            while self.cursor.is_symbol(",") {
                self.leaf()?; // ","
                self.leaf()?; // type
                self.leaf()?; // id
            }
        }
        self.writer.close("parameterList")?;
        Ok(())
    }

    fn compile_subroutine_body(&mut self) -> Result<()> {
        self.writer.open("subroutineBody")?;
        self.leaf()?; // "{"
        while self.cursor.is_keyword("var") {
            self.compile_var_dec()?;
        }
        self.compile_statements()?;
        self.leaf()?; // "}"
        self.writer.close("subroutineBody")?;
        Ok(())
    }

    fn compile_var_dec(&mut self) -> Result<()> {
        self.writer.open("varDec")?;
        self.leaf()?; // "var"
        self.leaf()?; // type
        self.leaf()?; // id
        while self.cursor.is_symbol(",") {
            self.leaf()?; // ","
            self.leaf()?; // id
        }
        self.leaf()?; // ";"
        self.writer.close("varDec")?;
        Ok(())
    }

    fn compile_statements(&mut self) -> Result<()> {
        self.writer.open("statements")?;
        loop {
            if self.cursor.is_keyword("let") {
                self.compile_let()?;
            } else if self.cursor.is_keyword("if") {
                self.compile_if()?;
            } else if self.cursor.is_keyword("while") {
                self.compile_while()?;
            } else if self.cursor.is_keyword("do") {
                self.compile_do()?;
            } else if self.cursor.is_keyword("return") {
                self.compile_return()?;
            } else {
                break;
            }
        }
        self.writer.close("statements")?;
        Ok(())
    }

    fn compile_let(&mut self) -> Result<()> {
        self.writer.open("letStatement")?;
        self.leaf()?; // "let"
        self.leaf()?; // id
        if self.cursor.is_symbol("[") {
            self.leaf()?; // "["
            self.compile_expression()?;
            self.leaf()?; // "]"
        }
        self.leaf()?; // "="
        self.compile_expression()?;
        self.leaf()?; // ";"
        self.writer.close("letStatement")?;
        Ok(())
    }

    fn compile_if(&mut self) -> Result<()> {
        self.writer.open("ifStatement")?;
        self.leaf()?; // "if"
        self.leaf()?; // "("
        self.compile_expression()?;
        self.leaf()?; // ")"
        self.leaf()?; // "{"
        self.compile_statements()?;
        self.leaf()?; // "}"
        if self.cursor.is_keyword("else") {
            self.leaf()?; // "else"
            self.leaf()?; // "{"
            self.compile_statements()?;
            self.leaf()?; // "}"
        }
        self.writer.close("ifStatement")?;
        Ok(())
    }

    fn compile_while(&mut self) -> Result<()> {
        self.writer.open("whileStatement")?;
        self.leaf()?; // "while"
        self.leaf()?; // "("
        self.compile_expression()?;
        self.leaf()?; // ")"
        self.leaf()?; // "{"
        self.compile_statements()?;
        self.leaf()?; // "}"
        self.writer.close("whileStatement")?;
        Ok(())
    }

    fn compile_do(&mut self) -> Result<()> {
        self.writer.open("doStatement")?;
        self.leaf()?; // "do"
        self.compile_subroutine_call()?;
        self.leaf()?; // ";"
        self.writer.close("doStatement")?;
        Ok(())
    }

    fn compile_return(&mut self) -> Result<()> {
        self.writer.open("returnStatement")?;
        self.leaf()?; // "return"
        if !self.cursor.is_symbol(";") {
            self.compile_expression()?;
        }
        self.leaf()?; // ";"
        self.writer.close("returnStatement")?;
        Ok(())
    }

    fn compile_expression(&mut self) -> Result<()> {
        self.writer.open("expression")?;
        self.compile_term()?;
        while self.peek_is_binary_op() {
            self.leaf()?; // op
            self.compile_term()?;
        }
        self.writer.close("expression")?;
        Ok(())
    }

    fn peek_is_binary_op(&self) -> bool {
        match self.cursor.current() {
            Ok(tok) if tok.kind == TokenKind::Symbol => {
                let c = tok.text.chars().next().unwrap_or('\0');
                "+-*/&|<>=".contains(c)
            }
            _ => false,
        }
    }

    fn compile_term(&mut self) -> Result<()> {
        self.writer.open("term")?;
        let tok = self.cursor.current()?.clone();
        match tok.kind {
            TokenKind::IntConst | TokenKind::StringConst | TokenKind::Keyword => {
                self.leaf()?;
            }
            TokenKind::Symbol if tok.text == "(" => {
                self.leaf()?; // "("
                self.compile_expression()?;
                self.leaf()?; // ")"
            }
            TokenKind::Symbol if tok.text == "-" || tok.text == "~" => {
                self.leaf()?; // unary op
                self.compile_term()?;
            }
            TokenKind::Identifier => {
                self.leaf()?; // the identifier itself
                if self.cursor.is_symbol("[") {
                    self.leaf()?; // "["
                    self.compile_expression()?;
                    self.leaf()?; // "]"
                } else if self.cursor.is_symbol("(") || self.cursor.is_symbol(".") {
                    self.compile_subroutine_call_tail()?;
                }
            }
            _ => {
                return Err(crate::error::ParseError::UnexpectedToken {
                    expected: "term".to_string(),
                    found: tok.text.clone(),
                })
            }
        }
        self.writer.close("term")?;
        Ok(())
    }

    /// `subrCall = id "(" exprList ")" | (id ".") id "(" exprList ")"`,
    /// with the leading identifier already echoed by the caller.
    fn compile_subroutine_call(&mut self) -> Result<()> {
        self.leaf()?; // leading identifier
        self.compile_subroutine_call_tail()
    }

    fn compile_subroutine_call_tail(&mut self) -> Result<()> {
        if self.cursor.is_symbol(".") {
            self.leaf()?; // "."
            self.leaf()?; // member name
        }
        self.leaf()?; // "("
        self.compile_expression_list()?;
        self.leaf()?; // ")"
        Ok(())
    }

    fn compile_expression_list(&mut self) -> Result<()> {
        self.writer.open("expressionList")?;
        if !self.cursor.is_symbol(")") {
            self.compile_expression()?;
            while self.cursor.is_symbol(",") {
                self.leaf()?; // ","
                self.compile_expression()?;
            }
        }
        self.writer.close("expressionList")?;
        Ok(())
    }
}
