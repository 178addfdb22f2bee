//! Reading event lines from a directory of log files.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::{IngestError, Location};
use crate::triple::EVENT_MARKER;

/// Default glob for daily event log files.
pub const DEFAULT_FILE_PATTERN: &str = "events.*";

/// A line that contains the event marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub location: Location,
    pub text: String,
}

struct OpenFile {
    path: PathBuf,
    reader: BufReader<File>,
    line: usize,
}

/// Lazily yields event lines from every file matching a pattern.
///
/// Files are visited in glob order (sorted by path) and lines in file order.
/// A file that cannot be opened or read yields one
/// [`IngestError::FileUnreadable`] and the reader moves on to the next file.
/// At most one file is open at a time; it is closed as soon as it is
/// exhausted or fails.
pub struct LineReader {
    pending: VecDeque<Result<PathBuf, IngestError>>,
    current: Option<OpenFile>,
    buf: Vec<u8>,
    files_opened: usize,
}

impl LineReader {
    /// Lists the files in `dir` matching `pattern`.
    ///
    /// Fails if the directory cannot be read or the pattern is invalid.
    pub fn open(dir: &Path, pattern: &str) -> Result<Self, IngestError> {
        fs::read_dir(dir).map_err(|source| IngestError::InputDirectoryUnreadable {
            path: dir.to_path_buf(),
            source,
        })?;

        let full_pattern = format!(
            "{}/{pattern}",
            Pattern::escape(&dir.to_string_lossy())
        );
        let paths = glob::glob(&full_pattern).map_err(|e| IngestError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let pending = paths
            .filter_map(|entry| match entry {
                Ok(path) if path.is_file() => Some(Ok(path)),
                Ok(_) => None,
                Err(e) => Some(Err(IngestError::FileUnreadable {
                    path: e.path().to_path_buf(),
                    source: e.into(),
                })),
            })
            .collect::<VecDeque<_>>();

        tracing::debug!(dir = %dir.display(), pattern, files = pending.len(), "listed log files");

        Ok(Self {
            pending,
            current: None,
            buf: Vec::new(),
            files_opened: 0,
        })
    }

    /// Number of files opened so far.
    pub const fn files_opened(&self) -> usize {
        self.files_opened
    }

    fn next_file(&mut self) -> Option<Result<(), IngestError>> {
        let path = match self.pending.pop_front()? {
            Ok(path) => path,
            Err(e) => return Some(Err(e)),
        };
        match File::open(&path) {
            Ok(file) => {
                self.files_opened += 1;
                self.current = Some(OpenFile {
                    path,
                    reader: BufReader::new(file),
                    line: 0,
                });
                Some(Ok(()))
            }
            Err(source) => Some(Err(IngestError::FileUnreadable { path, source })),
        }
    }
}

impl Iterator for LineReader {
    type Item = Result<SourceLine, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(open) = self.current.as_mut() else {
                match self.next_file()? {
                    Ok(()) => continue,
                    Err(e) => return Some(Err(e)),
                }
            };

            self.buf.clear();
            match open.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.current = None,
                Ok(_) => {
                    open.line += 1;
                    // Invalid UTF-8 is replaced rather than failing the file.
                    let text = String::from_utf8_lossy(&self.buf);
                    if text.contains(EVENT_MARKER) {
                        return Some(Ok(SourceLine {
                            location: Location::new(open.path.clone(), open.line),
                            text: text.trim_end_matches(['\r', '\n']).to_string(),
                        }));
                    }
                }
                Err(source) => {
                    let path = open.path.clone();
                    self.current = None;
                    return Some(Err(IngestError::FileUnreadable { path, source }));
                }
            }
        }
    }
}
