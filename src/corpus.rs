//! Compound corpus reading
//!
//! Reads one annotated compound per line, `index<TAB>compound`. Lines
//! without a numeric index column get their 1-based line number as index.
//! Blank lines and lines starting with `#` are skipped. Lines that are not
//! valid UTF-8 are decoded as Latin-1; files ending in `.gz` are
//! decompressed on the fly.

use bstr::ByteSlice;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One input word: its index and annotated form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundEntry {
    pub index: usize,
    pub annotated: String,
}

impl CompoundEntry {
    pub fn new(index: usize, annotated: impl Into<String>) -> Self {
        Self {
            index,
            annotated: annotated.into(),
        }
    }
}

/// Error while reading a corpus
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Read error at line {line_num}: {source}")]
    Io {
        line_num: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Corpus reader that iterates over compound entries
pub struct CompoundReader<R: BufRead> {
    reader: R,
    line_num: usize,
    buf: Vec<u8>,
    /// Set after an I/O error; a failed stream is not retried
    done: bool,
}

impl CompoundReader<Box<dyn BufRead + Send>> {
    /// Create a reader from a file path, decompressing `.gz` files
    pub fn from_file(path: &Path) -> Result<Self, ReadError> {
        let file = File::open(path).map_err(|source| ReadError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        let inner: Box<dyn Read + Send> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(MultiGzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Ok(Self::new(Box::new(BufReader::new(inner))))
    }
}

impl CompoundReader<Cursor<Vec<u8>>> {
    /// Create a reader from an in-memory string
    pub fn from_string(text: &str) -> Self {
        Self::new(Cursor::new(text.as_bytes().to_vec()))
    }
}

impl<R: BufRead> CompoundReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_num: 0,
            buf: Vec::new(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for CompoundReader<R> {
    type Item = Result<CompoundEntry, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(source) => {
                    self.done = true;
                    return Some(Err(ReadError::Io {
                        line_num: self.line_num + 1,
                        source,
                    }));
                }
            }
            self.line_num += 1;

            if let Some(entry) = parse_line(&self.buf, self.line_num) {
                return Some(Ok(entry));
            }
        }
    }
}

/// Parse one raw line; `None` for blank and comment lines
pub fn parse_line(raw: &[u8], line_num: usize) -> Option<CompoundEntry> {
    let line = raw.trim();
    if line.is_empty() || line[0] == b'#' {
        return None;
    }

    let (index, annotated) = match memchr::memchr(b'\t', line) {
        Some(tab) => match atoi::atoi::<usize>(&line[..tab]) {
            Some(index) if tab > 0 && line[..tab].iter().all(u8::is_ascii_digit) => {
                (index, line[tab + 1..].trim())
            }
            _ => (line_num, line),
        },
        None => (line_num, line),
    };

    if annotated.is_empty() {
        return None;
    }

    Some(CompoundEntry::new(index, decode(annotated)))
}

/// UTF-8 if valid, Latin-1 otherwise
fn decode(bytes: &[u8]) -> String {
    match bytes.to_str() {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}
