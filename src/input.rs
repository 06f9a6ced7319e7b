// 📂 Input streams - files opened as buffered readers

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A source file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    path: PathBuf,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        InputFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file for buffered reading
    pub fn open(&self) -> Result<BufReader<File>> {
        let file = File::open(&self.path).map_err(|e| {
            Error::io(format!("Failed to open file {}", self.path.display()), e)
        })?;
        Ok(BufReader::new(file))
    }
}

/// True when the stream has nothing left to read. Nothing is consumed.
pub fn is_empty<R: BufRead + ?Sized>(reader: &mut R) -> Result<bool> {
    let buffer = reader
        .fill_buf()
        .map_err(|e| Error::io("Failed to read from source", e))?;
    Ok(buffer.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_open_existing_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "code,eng,cym").unwrap();

        let input = InputFile::new(tmp.path());
        let mut contents = String::new();
        input.open().unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "code,eng,cym\n");
        assert_eq!(input.path(), tmp.path());
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = InputFile::new(dir.path().join("missing.csv"));

        let err = input.open().unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn test_is_empty_does_not_consume() {
        let mut empty = Cursor::new(Vec::<u8>::new());
        assert!(is_empty(&mut empty).unwrap());

        let mut reader = Cursor::new(b"abc".to_vec());
        assert!(!is_empty(&mut reader).unwrap());
        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "abc");
    }
}
