//! The VM sink (C3): a thin line-per-call formatter over any [`Write`].
//!
//! Every method writes exactly one LF-terminated ASCII line and nothing
//! else — no buffering discipline beyond whatever the wrapped writer
//! already provides (callers wrap a `File` in a `BufWriter` if they want
//! one).

use std::io::Write;

use jackc_table::Segment;

use crate::error::Result;

/// The nine arithmetic/logical VM commands, each its own literal output
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithCommand {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithCommand {
    fn as_str(self) -> &'static str {
        match self {
            ArithCommand::Add => "add",
            ArithCommand::Sub => "sub",
            ArithCommand::Neg => "neg",
            ArithCommand::Eq => "eq",
            ArithCommand::Gt => "gt",
            ArithCommand::Lt => "lt",
            ArithCommand::And => "and",
            ArithCommand::Or => "or",
            ArithCommand::Not => "not",
        }
    }
}

pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        VmWriter { out }
    }

    pub fn write_push(&mut self, segment: Segment, index: usize) -> Result<()> {
        writeln!(self.out, "push {} {}", segment.as_str(), index)?;
        Ok(())
    }

    pub fn write_pop(&mut self, segment: Segment, index: usize) -> Result<()> {
        writeln!(self.out, "pop {} {}", segment.as_str(), index)?;
        Ok(())
    }

    pub fn write_arithmetic(&mut self, command: ArithCommand) -> Result<()> {
        writeln!(self.out, "{}", command.as_str())?;
        Ok(())
    }

    pub fn write_label(&mut self, label: &str) -> Result<()> {
        writeln!(self.out, "label {label}")?;
        Ok(())
    }

    pub fn write_goto(&mut self, label: &str) -> Result<()> {
        writeln!(self.out, "goto {label}")?;
        Ok(())
    }

    pub fn write_if(&mut self, label: &str) -> Result<()> {
        writeln!(self.out, "if-goto {label}")?;
        Ok(())
    }

    pub fn write_call(&mut self, name: &str, n_args: usize) -> Result<()> {
        writeln!(self.out, "call {name} {n_args}")?;
        Ok(())
    }

    pub fn write_function(&mut self, name: &str, n_locals: usize) -> Result<()> {
        writeln!(self.out, "function {name} {n_locals}")?;
        Ok(())
    }

    pub fn write_return(&mut self) -> Result<()> {
        writeln!(self.out, "return")?;
        Ok(())
    }

    /// Flush the wrapped writer and hand it back.
    pub fn into_inner(self) -> W {
        self.out
    }
}
