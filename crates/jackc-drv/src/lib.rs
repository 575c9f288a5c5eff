//! Driver (C6): enumerates input files, tokenizes and compiles each one in
//! turn, and writes the resulting output next to its source. Strictly
//! sequential — one file is compiled to completion, output closed, before
//! the next begins.

mod discover;
mod error;

pub use discover::{discover_inputs, output_path};
pub use error::{DriverError, Result};

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// A sibling path for `path` to write to before renaming into place, e.g.
/// `d/Name.vm` -> `d/Name.vm.tmp`.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().expect("output path has a file name").to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Which traversal mode to run: the VM code generator (stage B) or the
/// XML pretty-printer (stage A). The source system shipped these as two
/// separate binaries sharing one tokenizer; here they're one reusable
/// emission-visitor mode of the same engine, selected by a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitMode {
    Vm,
    Xml,
}

impl EmitMode {
    fn extension(self) -> &'static str {
        match self {
            EmitMode::Vm => "vm",
            EmitMode::Xml => "xml",
        }
    }
}

impl Default for EmitMode {
    fn default() -> Self {
        EmitMode::Vm
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub emit: EmitMode,
    pub out_dir: Option<PathBuf>,
}

pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Session { config }
    }

    /// Compile every file the configured input resolves to. Returns the
    /// list of output paths written, in the order they were compiled.
    pub fn compile(&self) -> Result<Vec<PathBuf>> {
        let inputs = discover_inputs(&self.config.input)?;
        info!(count = inputs.len(), "discovered input files");

        let mut outputs = Vec::with_capacity(inputs.len());
        for source in &inputs {
            outputs.push(self.compile_one(source)?);
        }
        Ok(outputs)
    }

    fn compile_one(&self, source: &Path) -> Result<PathBuf> {
        debug!(path = %source.display(), "tokenizing");
        let text = fs::read_to_string(source).map_err(|e| DriverError::Read {
            path: source.to_path_buf(),
            source: e,
        })?;
        let tokens = jackc_lex::tokenize(&text).map_err(|e| DriverError::Lex {
            path: source.to_path_buf(),
            source: e,
        })?;

        debug!(path = %source.display(), "parsing and emitting");
        let out_path = self.resolve_output_path(source);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| DriverError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        // Write under a sibling temp name and rename into place on success,
        // so a compile abort never leaves a partial file at `out_path`.
        let tmp_path = tmp_sibling(&out_path);
        let file = fs::File::create(&tmp_path).map_err(|e| DriverError::Write {
            path: tmp_path.clone(),
            source: e,
        })?;
        let writer = std::io::BufWriter::new(file);

        let result = match self.config.emit {
            EmitMode::Vm => jackc_core::compile_to_vm(&tokens, writer),
            EmitMode::Xml => jackc_core::compile_to_xml(&tokens, writer),
        };
        let mut writer = match result {
            Ok(writer) => writer,
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                return Err(DriverError::Compile {
                    path: source.to_path_buf(),
                    source: e,
                });
            }
        };
        writer.flush().map_err(|e| DriverError::Write {
            path: tmp_path.clone(),
            source: e,
        })?;
        drop(writer);
        fs::rename(&tmp_path, &out_path).map_err(|e| DriverError::Write {
            path: out_path.clone(),
            source: e,
        })?;

        info!(path = %out_path.display(), "wrote output");
        Ok(out_path)
    }

    fn resolve_output_path(&self, source: &Path) -> PathBuf {
        let plain = output_path(source, self.config.emit.extension());
        match &self.config.out_dir {
            Some(dir) => match plain.file_name() {
                Some(name) => dir.join(name),
                None => plain,
            },
            None => plain,
        }
    }
}
