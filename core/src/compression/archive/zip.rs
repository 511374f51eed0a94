use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipArchive};

use super::{ArchiveError, Entry, Result};

pub struct ZipWriter<W: Write + Seek> {
    inner: ::zip::ZipWriter<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> ZipWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: ::zip::ZipWriter::new(writer),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644),
        }
    }

    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        if name.is_empty() {
            return Err(ArchiveError::InvalidName(name.to_string()));
        }
        self.inner.start_file(name, self.options)?;
        self.inner.write_all(data)?;
        Ok(())
    }

    pub fn add_path(&mut self, path: &Path, name: &str) -> Result<()> {
        let data = fs::read(path)?;
        self.add_file(name, &data)
    }

    pub fn finish(self) -> Result<W> {
        Ok(self.inner.finish()?)
    }
}

/// File entries of a zip archive; directories are skipped.
pub fn read<R: Read + Seek>(reader: R) -> Result<Vec<Entry>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        entries.push(Entry { name, data });
    }

    Ok(entries)
}

pub fn read_entries(path: &Path) -> Result<Vec<Entry>> {
    read(BufReader::new(File::open(path)?))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
