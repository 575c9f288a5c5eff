use std::path::{Path, PathBuf};

use crate::error::{DriverError, Result};

/// Resolve the CLI's single positional path into the list of `.jack` files
/// to compile: the path itself if it names a file, or every `.jack` file
/// found by a recursive walk if it names a directory.
pub fn discover_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut files = Vec::new();
        walk(path, &mut files)?;
        files.sort();
        if files.is_empty() {
            return Err(DriverError::NoInputFiles(path.to_path_buf()));
        }
        Ok(files)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| DriverError::Read {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| DriverError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("jack") {
            out.push(path);
        }
    }
    Ok(())
}

/// Output path for one source file, always `d/Name.ext` next to the
/// source — never the original's `d/base/Main.ext` layout for directory
/// invocations.
pub fn output_path(source: &Path, extension: &str) -> PathBuf {
    source.with_extension(extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn output_path_swaps_extension() {
        let p = output_path(Path::new("/d/Name.jack"), "vm");
        assert_eq!(p, PathBuf::from("/d/Name.vm"));
    }

    #[test]
    fn discover_inputs_on_single_file_returns_that_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("Main.jack");
        fs::write(&file, "class Main {}").unwrap();
        let found = discover_inputs(&file).unwrap();
        assert_eq!(found, vec![file]);
    }

    #[test]
    fn discover_inputs_on_directory_walks_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("A.jack"), "class A {}").unwrap();
        let sub = tmp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("B.jack"), "class B {}").unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let mut found = discover_inputs(tmp.path()).unwrap();
        found.sort();
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|p| p.ends_with("A.jack")));
        assert!(found.iter().any(|p| p.ends_with("B.jack")));
    }

    #[test]
    fn discover_inputs_on_empty_directory_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let err = discover_inputs(tmp.path()).unwrap_err();
        assert!(matches!(err, DriverError::NoInputFiles(_)));
    }
}
