use crate::subject::{decode_subjects, Subject};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Supplier of the subject list.  Subjects are fetched once before the first
/// expansion and reused across calendar navigation.
pub(crate) trait SubjectSource {
    fn subjects(&self) -> Result<Vec<Subject>, SourceError>;
}

/// Reads a saved `/subjects` response.  The path `-` means standard input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub(crate) fn new<P: Into<PathBuf>>(path: P) -> JsonFileSource {
        JsonFileSource { path: path.into() }
    }

    fn read(&self) -> io::Result<String> {
        if self.path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().lock().read_to_string(&mut buf)?;
            Ok(buf)
        } else {
            std::fs::read_to_string(&self.path)
        }
    }
}

impl SubjectSource for JsonFileSource {
    fn subjects(&self) -> Result<Vec<Subject>, SourceError> {
        let json = self.read().map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })?;
        let subjects = decode_subjects(&json).map_err(|source| SourceError::Decode {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), count = subjects.len(), "loaded subjects");
        Ok(subjects)
    }
}

#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("failed to read subjects from {}", .path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("invalid subjects payload in {}", .path.display())]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}
