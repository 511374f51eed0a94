use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use ::tar::{Archive, Builder, EntryType, Header};

use super::{ArchiveError, Entry, Format, Result};
use crate::compression::GzipReader;

pub struct TarWriter<W: Write> {
    builder: Builder<W>,
}

impl<W: Write> TarWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            builder: Builder::new(writer),
        }
    }

    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        if name.is_empty() {
            return Err(ArchiveError::InvalidName(name.to_string()));
        }
        let mtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_secs())
            .unwrap_or_default();

        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        self.builder.append_data(&mut header, name, data)?;
        Ok(())
    }

    /// Adds the file at `path` under `name`, keeping its metadata.
    pub fn add_path(&mut self, path: &Path, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ArchiveError::InvalidName(name.to_string()));
        }
        self.builder.append_path_with_name(path, name)?;
        Ok(())
    }

    pub fn finish(self) -> Result<W> {
        Ok(self.builder.into_inner()?)
    }
}

/// Regular-file entries of an uncompressed tar stream.
pub fn read<R: Read>(reader: R) -> Result<Vec<Entry>> {
    let mut archive = Archive::new(reader);
    let mut entries = Vec::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry.path()?.to_string_lossy().into_owned();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        entries.push(Entry { name, data });
    }

    Ok(entries)
}

/// Reads a `.tar`, `.tar.gz` or `.tgz` file.
pub fn read_entries(path: &Path) -> Result<Vec<Entry>> {
    let file = BufReader::new(File::open(path)?);
    match Format::from_path(path) {
        Some(Format::TarGz) => read(GzipReader::new(file)),
        _ => read(file),
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
    fn writes_and_reads_entries() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.txt");
        std::fs::write(&source, "on disk").unwrap();

        let mut writer = TarWriter::new(Vec::new());
        writer.add_file("docs/readme.txt", b"read me").unwrap();
        writer.add_path(&source, "copied.txt").unwrap();
        let bytes = writer.finish().unwrap();

        // 512-byte blocks, ending in two zero blocks.
        assert_eq!(bytes.len() % 512, 0);

        let entries = read(bytes.as_slice()).unwrap();
        assert_eq!(
            entries,
            vec![
                Entry::new("docs/readme.txt", "read me"),
                Entry::new("copied.txt", "on disk"),
            ]
        );
    }

    #[test]
    fn rejects_empty_names() {
        let mut writer = TarWriter::new(Vec::new());
        assert!(matches!(
            writer.add_file("", b"x"),
            Err(ArchiveError::InvalidName(_))
        ));
    }

    #[test]
    fn reads_compressed_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = TarWriter::new(Vec::new());
        writer.add_file("a", b"1").unwrap();
        let bytes = writer.finish().unwrap();

        let path = dir.path().join("a.tar.gz");
        std::fs::write(&path, crate::compression::gzip(&bytes).unwrap()).unwrap();
        assert_eq!(read_entries(&path).unwrap(), vec![Entry::new("a", "1")]);
    }
}
