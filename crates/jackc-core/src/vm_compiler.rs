//! Stage B: the VM-emitting mode of the parser-emitter.
//!
//! This is a single recursive-descent pass: there is no intermediate
//! syntax tree. Each `compile_*` method both recognizes one grammar
//! production and, at the points the grammar requires it, writes VM
//! instructions or mutates the active symbol scope. The two are
//! interleaved exactly as the language reference orders them (most
//! notably: a subroutine's `function` header is not emitted until every
//! `var` declaration has been seen, since only then is the local count
//! known).

use std::io::Write;

use jackc_lex::{Token, TokenKind};
use jackc_table::{Kind, Segment};
use jackc_emit::{ArithCommand, VmWriter};

use crate::context::{CompileContext, Flavor};
use crate::cursor::TokenCursor;
use crate::error::{ParseError, Result};

pub struct VmCompiler<'a, W: Write> {
    cursor: TokenCursor<'a>,
    writer: VmWriter<W>,
    ctx: CompileContext,
}

impl<'a, W: Write> VmCompiler<'a, W> {
    pub fn new(tokens: &'a [Token], out: W) -> Self {
        VmCompiler {
            cursor: TokenCursor::new(tokens),
            writer: VmWriter::new(out),
            ctx: CompileContext::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    /// `class = "class" id "{" classVarDec* subroutineDec* "}"`
    pub fn compile_class(&mut self) -> Result<()> {
        self.ctx.class_table.reset();
        self.cursor.expect_keyword("class")?;
        self.ctx.class_name = self.cursor.expect_identifier()?.text.clone();
        self.cursor.expect_symbol("{")?;
        loop {
            if self.cursor.is_keyword("static") || self.cursor.is_keyword("field") {
                self.compile_class_var_dec()?;
            } else if self.cursor.is_keyword("constructor")
                || self.cursor.is_keyword("function")
                || self.cursor.is_keyword("method")
            {
                self.compile_subroutine()?;
            } else {
                break;
            }
        }
        self.cursor.expect_symbol("}")?;
        Ok(())
    }

    /// `classVarDec = ("static"|"field") type id ("," id)* ";"`
    fn compile_class_var_dec(&mut self) -> Result<()> {
        let kw = self.cursor.advance()?.text.clone();
        let kind = if kw == "static" { Kind::Static } else { Kind::Field };
        let type_name = self.parse_type()?;
        loop {
            let name = self.cursor.expect_identifier()?.text.clone();
            self.ctx.class_table.define(&name, &type_name, kind);
            if self.cursor.is_symbol(",") {
                self.cursor.advance()?;
                continue;
            }
            break;
        }
        self.cursor.expect_symbol(";")?;
        Ok(())
    }

    fn parse_type(&mut self) -> Result<String> {
        let tok = self.cursor.advance()?;
        match tok.kind {
            TokenKind::Keyword if matches!(tok.text.as_str(), "int" | "char" | "boolean") => {
                Ok(tok.text.clone())
            }
            TokenKind::Identifier => Ok(tok.text.clone()),
            _ => Err(ParseError::UnexpectedToken {
                expected: "type".to_string(),
                found: tok.text.clone(),
            }),
        }
    }

    /// `subrDec = ("constructor"|"function"|"method") (type|"void") id "(" paramList ")" subrBody`
    fn compile_subroutine(&mut self) -> Result<()> {
        self.ctx.subroutine_table.reset();
        let flavor_kw = self.cursor.advance()?.text.clone();
        let flavor = Flavor::from_keyword(&flavor_kw).expect("caller already checked flavor keyword");
        if self.cursor.is_keyword("void") {
            self.cursor.advance()?;
        } else {
            self.parse_type()?;
        }
        self.ctx.subroutine_name = self.cursor.expect_identifier()?.text.clone();
        self.ctx.subroutine_flavor = flavor;

        if flavor == Flavor::Method {
            let class_name = self.ctx.class_name.clone();
            self.ctx.subroutine_table.define("this", &class_name, Kind::Arg);
        }

        self.cursor.expect_symbol("(")?;
        self.compile_parameter_list()?;
        self.cursor.expect_symbol(")")?;
        self.compile_subroutine_body()?;
        Ok(())
    }

    /// `paramList = ( type id ("," type id)* )?`
    fn compile_parameter_list(&mut self) -> Result<()> {
        if self.cursor.is_symbol(")") {
            return Ok(());
        }
        loop {
            let type_name = self.parse_type()?;
            let name = self.cursor.expect_identifier()?.text.clone();
            self.ctx.subroutine_table.define(&name, &type_name, Kind::Arg);
            if self.cursor.is_symbol(",") {
                self.cursor.advance()?;
                continue;
            }
            break;
        }
        Ok(())
    }

    /// `subrBody = "{" varDec* statements "}"`
    fn compile_subroutine_body(&mut self) -> Result<()> {
        self.cursor.expect_symbol("{")?;
        while self.cursor.is_keyword("var") {
            self.compile_var_dec()?;
        }

        let n_locals = self.ctx.subroutine_table.var_count(Kind::Var);
        let function_name = format!("{}.{}", self.ctx.class_name, self.ctx.subroutine_name);
        self.writer.write_function(&function_name, n_locals)?;

        match self.ctx.subroutine_flavor {
            Flavor::Function => {}
            Flavor::Method => {
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            Flavor::Constructor => {
                let field_count = self.ctx.class_table.var_count(Kind::Field);
                self.writer.write_push(Segment::Constant, field_count)?;
                self.writer.write_call("Memory.alloc", 1)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
        }

        self.compile_statements()?;
        self.cursor.expect_symbol("}")?;
        Ok(())
    }

    /// `varDec = "var" type id ("," id)* ";"`
    fn compile_var_dec(&mut self) -> Result<()> {
        self.cursor.expect_keyword("var")?;
        let type_name = self.parse_type()?;
        loop {
            let name = self.cursor.expect_identifier()?.text.clone();
            self.ctx.subroutine_table.define(&name, &type_name, Kind::Var);
            if self.cursor.is_symbol(",") {
                self.cursor.advance()?;
                continue;
            }
            break;
        }
        self.cursor.expect_symbol(";")?;
        Ok(())
    }

    /// `statements = statement*`
    fn compile_statements(&mut self) -> Result<()> {
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
        Ok(())
    }

    /// `let = "let" id ("[" expr "]")? "=" expr ";"`
    fn compile_let(&mut self) -> Result<()> {
        self.cursor.expect_keyword("let")?;
        let name = self.cursor.expect_identifier()?.text.clone();

        if self.cursor.is_symbol("[") {
            self.cursor.advance()?;
            self.emit_push_variable(&name)?;
            self.compile_expression()?;
            self.cursor.expect_symbol("]")?;
            self.writer.write_arithmetic(ArithCommand::Add)?;

            self.cursor.expect_symbol("=")?;
            self.compile_expression()?;
            self.cursor.expect_symbol(";")?;

            // The destination address (on the stack from the `add` above)
            // must survive compiling `e`, which may itself clobber
            // `pointer 1` via a nested array access — stash it in temp 0
            // first.
            self.writer.write_pop(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::Pointer, 1)?;
            self.writer.write_push(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::That, 0)?;
        } else {
            self.cursor.expect_symbol("=")?;
            self.compile_expression()?;
            self.cursor.expect_symbol(";")?;
            let (segment, index) = self.resolve_variable(&name)?;
            self.writer.write_pop(segment, index)?;
        }
        Ok(())
    }

    /// `if = "if" "(" expr ")" "{" statements "}" ("else" "{" statements "}")?`
    fn compile_if(&mut self) -> Result<()> {
        let c = self.ctx.next_label();
        self.cursor.expect_keyword("if")?;
        self.cursor.expect_symbol("(")?;
        self.compile_expression()?;
        self.cursor.expect_symbol(")")?;
        self.writer.write_arithmetic(ArithCommand::Not)?;
        let if_false = format!("IF_FALSE{c}");
        let out = format!("OUT{c}");
        self.writer.write_if(&if_false)?;

        self.cursor.expect_symbol("{")?;
        self.compile_statements()?;
        self.cursor.expect_symbol("}")?;
        self.writer.write_goto(&out)?;

        self.writer.write_label(&if_false)?;
        if self.cursor.is_keyword("else") {
            self.cursor.advance()?;
            self.cursor.expect_symbol("{")?;
            self.compile_statements()?;
            self.cursor.expect_symbol("}")?;
        }
        self.writer.write_label(&out)?;
        Ok(())
    }

    /// `while = "while" "(" expr ")" "{" statements "}"`
    fn compile_while(&mut self) -> Result<()> {
        let c = self.ctx.next_label();
        let top = format!("WHILE{c}");
        let out = format!("OUT{c}");

        self.cursor.expect_keyword("while")?;
        self.writer.write_label(&top)?;
        self.cursor.expect_symbol("(")?;
        self.compile_expression()?;
        self.cursor.expect_symbol(")")?;
        self.writer.write_arithmetic(ArithCommand::Not)?;
        self.writer.write_if(&out)?;

        self.cursor.expect_symbol("{")?;
        self.compile_statements()?;
        self.cursor.expect_symbol("}")?;
        self.writer.write_goto(&top)?;
        self.writer.write_label(&out)?;
        Ok(())
    }

    /// `do = "do" subroutineCall ";"`
    fn compile_do(&mut self) -> Result<()> {
        self.cursor.expect_keyword("do")?;
        self.compile_subroutine_call()?;
        self.cursor.expect_symbol(";")?;
        self.writer.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    /// `return = "return" expr? ";"`
    fn compile_return(&mut self) -> Result<()> {
        self.cursor.expect_keyword("return")?;
        if self.cursor.is_symbol(";") {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }
        self.cursor.expect_symbol(";")?;
        self.writer.write_return()?;
        Ok(())
    }

    /// `expr = term (op term)*`, no precedence: strictly left to right.
    fn compile_expression(&mut self) -> Result<()> {
        self.compile_term()?;
        while let Some(op) = self.peek_binary_op() {
            self.cursor.advance()?;
            self.compile_term()?;
            self.emit_binary_op(op)?;
        }
        Ok(())
    }

    fn peek_binary_op(&self) -> Option<char> {
        let tok = self.cursor.current().ok()?;
        if tok.kind != TokenKind::Symbol {
            return None;
        }
        let c = tok.text.chars().next()?;
        if "+-*/&|<>=".contains(c) {
            Some(c)
        } else {
            None
        }
    }

    fn emit_binary_op(&mut self, op: char) -> Result<()> {
        match op {
            '+' => self.writer.write_arithmetic(ArithCommand::Add)?,
            '-' => self.writer.write_arithmetic(ArithCommand::Sub)?,
            '&' => self.writer.write_arithmetic(ArithCommand::And)?,
            '|' => self.writer.write_arithmetic(ArithCommand::Or)?,
            '<' => self.writer.write_arithmetic(ArithCommand::Lt)?,
            '>' => self.writer.write_arithmetic(ArithCommand::Gt)?,
            '=' => self.writer.write_arithmetic(ArithCommand::Eq)?,
            '*' => self.writer.write_call("Math.multiply", 2)?,
            '/' => self.writer.write_call("Math.divide", 2)?,
            _ => unreachable!("peek_binary_op only yields operator characters"),
        }
        Ok(())
    }

    /// `term = intConst | strConst | keywordConst | "(" expr ")" | unaryOp term`
    /// `     | varName | varName "[" expr "]" | subroutineCall`
    fn compile_term(&mut self) -> Result<()> {
        let tok = self.cursor.current()?.clone();
        match tok.kind {
            TokenKind::IntConst => {
                self.cursor.advance()?;
                self.writer.write_push(Segment::Constant, tok.int_value() as usize)?;
            }
            TokenKind::StringConst => {
                self.cursor.advance()?;
                let s = tok.string_value().to_string();
                self.writer.write_push(Segment::Constant, s.len())?;
                self.writer.write_call("String.new", 1)?;
                for byte in s.bytes() {
                    self.writer.write_push(Segment::Constant, byte as usize)?;
                    self.writer.write_call("String.appendChar", 2)?;
                }
            }
            TokenKind::Keyword => {
                self.cursor.advance()?;
                match tok.text.as_str() {
                    "true" => {
                        self.writer.write_push(Segment::Constant, 1)?;
                        self.writer.write_arithmetic(ArithCommand::Not)?;
                    }
                    "false" | "null" => self.writer.write_push(Segment::Constant, 0)?,
                    "this" => self.writer.write_push(Segment::Pointer, 0)?,
                    _ => {
                        return Err(ParseError::UnexpectedToken {
                            expected: "keyword constant".to_string(),
                            found: tok.text.clone(),
                        })
                    }
                }
            }
            TokenKind::Symbol if tok.text == "(" => {
                self.cursor.advance()?;
                self.compile_expression()?;
                self.cursor.expect_symbol(")")?;
            }
            TokenKind::Symbol if tok.text == "-" || tok.text == "~" => {
                self.cursor.advance()?;
                self.compile_term()?;
                let cmd = if tok.text == "-" {
                    ArithCommand::Neg
                } else {
                    ArithCommand::Not
                };
                self.writer.write_arithmetic(cmd)?;
            }
            TokenKind::Identifier => {
                self.cursor.advance()?;
                let name = tok.text.clone();
                if self.cursor.is_symbol("[") {
                    self.cursor.advance()?;
                    self.emit_push_variable(&name)?;
                    self.compile_expression()?;
                    self.cursor.expect_symbol("]")?;
                    self.writer.write_arithmetic(ArithCommand::Add)?;
                    self.writer.write_pop(Segment::Pointer, 1)?;
                    self.writer.write_push(Segment::That, 0)?;
                } else if self.cursor.is_symbol("(") || self.cursor.is_symbol(".") {
                    self.compile_subroutine_call_from(name)?;
                } else {
                    self.emit_push_variable(&name)?;
                }
            }
            _ => {
                return Err(ParseError::UnexpectedToken {
                    expected: "term".to_string(),
                    found: tok.text.clone(),
                })
            }
        }
        Ok(())
    }

    /// `subrCall = id "(" exprList ")" | (id ".") id "(" exprList ")"`
    fn compile_subroutine_call(&mut self) -> Result<()> {
        let name = self.cursor.expect_identifier()?.text.clone();
        self.compile_subroutine_call_from(name)
    }

    /// Resolve the three semantic cases behind the two syntactic call
    /// forms, given the already-consumed leading identifier `first`:
    ///
    /// 1. `first(args)` — implicit method call on `this`.
    /// 2. `first.name(args)` where `first` resolves in a symbol table —
    ///    method call on another object.
    /// 3. `first.name(args)` where `first` does not resolve — static call
    ///    on a class named `first`.
    fn compile_subroutine_call_from(&mut self, first: String) -> Result<()> {
        if self.cursor.is_symbol(".") {
            self.cursor.advance()?;
            let member = self.cursor.expect_identifier()?.text.clone();

            if let Some((segment, index, type_name)) = self.lookup_receiver(&first) {
                self.writer.write_push(segment, index)?;
                self.cursor.expect_symbol("(")?;
                let n_args = self.compile_expression_list()?;
                self.writer.write_call(&format!("{type_name}.{member}"), n_args + 1)?;
            } else {
                self.cursor.expect_symbol("(")?;
                let n_args = self.compile_expression_list()?;
                self.writer.write_call(&format!("{first}.{member}"), n_args)?;
            }
        } else {
            self.writer.write_push(Segment::Pointer, 0)?;
            self.cursor.expect_symbol("(")?;
            let n_args = self.compile_expression_list()?;
            let function_name = format!("{}.{first}", self.ctx.class_name);
            self.writer.write_call(&function_name, n_args + 1)?;
        }
        Ok(())
    }

    /// Subroutine scope first, then class scope — matching the general
    /// resolution policy for any identifier reference.
    fn lookup_receiver(&self, name: &str) -> Option<(Segment, usize, String)> {
        if let Some(kind) = self.ctx.subroutine_table.kind_of(name) {
            let index = self.ctx.subroutine_table.index_of(name).unwrap();
            let type_name = self.ctx.subroutine_table.type_of(name).unwrap().to_string();
            Some((kind.segment(), index, type_name))
        } else if let Some(kind) = self.ctx.class_table.kind_of(name) {
            let index = self.ctx.class_table.index_of(name).unwrap();
            let type_name = self.ctx.class_table.type_of(name).unwrap().to_string();
            Some((kind.segment(), index, type_name))
        } else {
            None
        }
    }

    fn resolve_variable(&self, name: &str) -> Result<(Segment, usize)> {
        if let Some(kind) = self.ctx.subroutine_table.kind_of(name) {
            Ok((kind.segment(), self.ctx.subroutine_table.index_of(name).unwrap()))
        } else if let Some(kind) = self.ctx.class_table.kind_of(name) {
            Ok((kind.segment(), self.ctx.class_table.index_of(name).unwrap()))
        } else {
            Err(ParseError::UndefinedSymbol(name.to_string()))
        }
    }

    fn emit_push_variable(&mut self, name: &str) -> Result<()> {
        let (segment, index) = self.resolve_variable(name)?;
        self.writer.write_push(segment, index)?;
        Ok(())
    }

    /// `exprList = ( expr ("," expr)* )?`, consumes the closing `)`.
    fn compile_expression_list(&mut self) -> Result<usize> {
        let mut n = 0;
        if !self.cursor.is_symbol(")") {
            self.compile_expression()?;
            n += 1;
            while self.cursor.is_symbol(",") {
                self.cursor.advance()?;
                self.compile_expression()?;
                n += 1;
            }
        }
        self.cursor.expect_symbol(")")?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jackc_lex::tokenize;

    fn compile(src: &str) -> String {
        let toks = tokenize(src).unwrap();
        let mut c = VmCompiler::new(&toks, Vec::new());
        c.compile_class().unwrap();
        String::from_utf8(c.into_inner()).unwrap()
    }

    fn lines(s: &str) -> Vec<&str> {
        s.lines().collect()
    }

    #[test]
    fn s1_void_function_normalizes_return() {
        let out = compile("class A { function void f() { return; } }");
        assert_eq!(lines(&out), vec!["function A.f 0", "push constant 0", "return"]);
    }

    #[test]
    fn s2_constructor_allocates_field_count() {
        let out = compile("class A { field int x; constructor A new() { return this; } }");
        assert_eq!(
            lines(&out),
            vec![
                "function A.new 0",
                "push constant 1",
                "call Memory.alloc 1",
                "pop pointer 0",
                "push pointer 0",
                "return",
            ]
        );
    }

    #[test]
    fn s3_method_prologue_and_left_to_right_expression() {
        let out = compile("class A { method int g() { return 2 + 3; } }");
        assert_eq!(
            lines(&out),
            vec![
                "function A.g 0",
                "push argument 0",
                "pop pointer 0",
                "push constant 2",
                "push constant 3",
                "add",
                "return",
            ]
        );
    }

    #[test]
    fn s4_while_loop_labels_and_local_count() {
        let out = compile(
            "class A { function void m() { var int i; let i = 0; \
             while (i < 3) { let i = i + 1; } return; } }",
        );
        assert_eq!(
            lines(&out),
            vec![
                "function A.m 1",
                "push constant 0",
                "pop local 0",
                "label WHILE0",
                "push local 0",
                "push constant 3",
                "lt",
                "not",
                "if-goto OUT0",
                "push local 0",
                "push constant 1",
                "add",
                "pop local 0",
                "goto WHILE0",
                "label OUT0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn s5_string_literal_expands_to_appendchar_calls() {
        let out = compile(
            "class A { function void m() { var String s; let s = \"hi\"; return; } }",
        );
        let expected = vec![
            "push constant 2",
            "call String.new 1",
            "push constant 104",
            "call String.appendChar 2",
            "push constant 105",
            "call String.appendChar 2",
            "pop local 0",
        ];
        let out_lines = lines(&out);
        assert!(out_lines.windows(expected.len()).any(|w| w == expected.as_slice()));
    }

    #[test]
    fn s6_array_write_preserves_destination_address() {
        let out = compile(
            "class A { function void m(Array a, int i, int j) { let a[i] = a[j]; return; } }",
        );
        let expected = vec![
            "push argument 0",
            "push argument 1",
            "add",
            "push argument 0",
            "push argument 2",
            "add",
            "pop pointer 1",
            "push that 0",
            "pop temp 0",
            "pop pointer 1",
            "push temp 0",
            "pop that 0",
        ];
        let out_lines = lines(&out);
        assert!(out_lines.windows(expected.len()).any(|w| w == expected.as_slice()));
    }

    #[test]
    fn method_dispatch_distinguishes_implicit_variable_and_static_receivers() {
        let out = compile(
            "class A { function void m(B b) { \
             do doThis(); \
             do b.doThat(); \
             do Other.doStatic(); \
             return; } }",
        );
        let out_lines = lines(&out);
        // implicit this
        assert!(out_lines.contains(&"push pointer 0"));
        assert!(out_lines.contains(&"call A.doThis 1"));
        // variable receiver
        assert!(out_lines.contains(&"push argument 0"));
        assert!(out_lines.contains(&"call B.doThat 1"));
        // static call, no implicit receiver pushed and nArgs passed literally
        assert!(out_lines.contains(&"call Other.doStatic 0"));
    }

    #[test]
    fn constructor_bug_is_fixed_field_count_not_arg_count() {
        // Field count (2) must be used for Memory.alloc regardless of how
        // many constructor parameters there are.
        let out = compile(
            "class P { field int x; field int y; \
             constructor P new(int a, int b, int c) { return this; } }",
        );
        assert!(lines(&out).contains(&"push constant 2"));
    }

    #[test]
    fn method_this_binding_bug_is_fixed_by_flavor_not_name() {
        // A method whose name happens to not be literally "method" must
        // still get the argument-0/pointer-0 binding prologue.
        let out = compile("class A { method void anything() { return; } }");
        let out_lines = lines(&out);
        assert_eq!(out_lines[0], "function A.anything 0");
        assert_eq!(out_lines[1], "push argument 0");
        assert_eq!(out_lines[2], "pop pointer 0");
    }
}
