//! tar and zip archives. Entries are read fully into memory as
//! [`Entry`] values.

pub mod tar;
pub mod zip;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] ::zip::result::ZipError),
    #[error("unknown archive format: {}", .0.display())]
    UnknownFormat(PathBuf),
    #[error("invalid entry name '{0}'")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
}

impl Entry {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Tar,
    TarGz,
    Zip,
}

impl Format {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Reads every file entry of the archive at `path`, picking the format from
/// the extension.
pub fn open(path: &Path) -> Result<Vec<Entry>> {
    match Format::from_path(path) {
        Some(Format::Tar | Format::TarGz) => tar::read_entries(path),
        Some(Format::Zip) => zip::read_entries(path),
        None => Err(ArchiveError::UnknownFormat(path.to_path_buf())),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.tar")), Some(Format::Tar));
        assert_eq!(Format::from_path(Path::new("a.TAR.GZ")), Some(Format::TarGz));
        assert_eq!(Format::from_path(Path::new("dir/a.tgz")), Some(Format::TarGz));
        assert_eq!(Format::from_path(Path::new("a.zip")), Some(Format::Zip));
        assert_eq!(Format::from_path(Path::new("a.gz")), None);
        assert_eq!(Format::from_path(Path::new("tar")), None);
    }

    #[test]
    fn open_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let mut writer = super::tar::TarWriter::new(Vec::new());
        writer.add_file("a.txt", b"from tar").unwrap();
        let archive = writer.finish().unwrap();
        std::fs::write(dir.path().join("x.tar"), &archive).unwrap();
        std::fs::write(
            dir.path().join("x.tgz"),
            crate::compression::gzip(&archive).unwrap(),
        )
        .unwrap();

        let mut writer = super::zip::ZipWriter::new(io::Cursor::new(Vec::new()));
        writer.add_file("a.txt", b"from zip").unwrap();
        std::fs::write(dir.path().join("x.zip"), writer.finish().unwrap().into_inner()).unwrap();

        assert_eq!(open(&dir.path().join("x.tar")).unwrap(), vec![Entry::new("a.txt", "from tar")]);
        assert_eq!(open(&dir.path().join("x.tgz")).unwrap(), vec![Entry::new("a.txt", "from tar")]);
        assert_eq!(open(&dir.path().join("x.zip")).unwrap(), vec![Entry::new("a.txt", "from zip")]);
    }

    #[test]
    fn open_unknown_format() {
        let err = open(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, ArchiveError::UnknownFormat(_)));
    }
}
