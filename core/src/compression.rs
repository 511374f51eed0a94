//! # Compression
//!
//! gzip and zlib helpers over `flate2`, plus tar and zip archives in
//! [`archive`].

pub mod archive;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::{MultiGzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use tracing::debug;

pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decompresses every gzip member in `data`, concatenated.
pub fn gunzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    MultiGzDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

pub fn zlib_deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

pub fn zlib_inflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data).read_to_end(&mut out)?;
    Ok(out)
}

/// Writes `path.gz` next to `path` and returns its path.
pub fn gzip_file(path: &Path) -> io::Result<PathBuf> {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    let output = PathBuf::from(name);

    let mut input = File::open(path)?;
    let mut encoder = GzEncoder::new(File::create(&output)?, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?.sync_all()?;

    debug!("compressed {} to {}", path.display(), output.display());
    Ok(output)
}

/// Decompresses `name.gz` into `name`. Any other file is written to
/// `name.out`, keeping its full name.
pub fn gunzip_file(path: &Path) -> io::Result<PathBuf> {
    let output = if path.extension().is_some_and(|ext| ext == "gz") {
        path.with_extension("")
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".out");
        PathBuf::from(name)
    };
    if output == path {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to decompress {} onto itself", path.display()),
        ));
    }

    let mut decoder = GzipReader::open(path)?;
    let mut file = File::create(&output)?;
    io::copy(&mut decoder, &mut file)?;

    debug!("decompressed {} to {}", path.display(), output.display());
    Ok(output)
}

/// Buffered streaming gzip decoder, for reading large compressed text line
/// by line.
pub struct GzipReader<R: Read> {
    inner: BufReader<MultiGzDecoder<R>>,
}

impl<R: Read> GzipReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: BufReader::new(MultiGzDecoder::new(reader)),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner().into_inner()
    }
}

impl GzipReader<File> {
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> Read for GzipReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> BufRead for GzipReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
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

    const TEXT: &[u8] = b"hello hello hello hello hello hello hello";

    #[test]
    fn gzip_has_magic_and_inflates() {
        let compressed = gzip(TEXT).unwrap();
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
        assert_eq!(gunzip(&compressed).unwrap(), TEXT);
    }

    #[test]
    fn gunzip_concatenated_members() {
        let mut data = gzip(b"first ").unwrap();
        data.extend(gzip(b"second").unwrap());
        assert_eq!(gunzip(&data).unwrap(), b"first second");
    }

    #[test]
    fn gunzip_rejects_garbage() {
        assert!(gunzip(b"definitely not gzip").is_err());
    }

    #[test]
    fn zlib() {
        let compressed = zlib_deflate(TEXT).unwrap();
        assert_eq!(compressed[0], 0x78);
        assert!(compressed.len() < TEXT.len());
        assert_eq!(zlib_inflate(&compressed).unwrap(), TEXT);
    }

    #[test]
    fn files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, TEXT).unwrap();

        let compressed = gzip_file(&path).unwrap();
        assert_eq!(compressed, dir.path().join("notes.txt.gz"));

        std::fs::remove_file(&path).unwrap();
        let restored = gunzip_file(&compressed).unwrap();
        assert_eq!(restored, path);
        assert_eq!(std::fs::read(&restored).unwrap(), TEXT);
    }

    #[test]
    fn gunzip_file_never_overwrites_input() {
        let dir = tempfile::tempdir().unwrap();
        let compressed = gzip(TEXT).unwrap();

        let dump = dir.path().join("dump.out");
        std::fs::write(&dump, &compressed).unwrap();
        let restored = gunzip_file(&dump).unwrap();
        assert_eq!(restored, dir.path().join("dump.out.out"));
        assert_eq!(std::fs::read(&dump).unwrap(), compressed);
        assert_eq!(std::fs::read(&restored).unwrap(), TEXT);

        let data = dir.path().join("data.txt");
        std::fs::write(&data, &compressed).unwrap();
        assert_eq!(gunzip_file(&data).unwrap(), dir.path().join("data.txt.out"));
    }

    #[test]
    fn reader_lines() {
        let compressed = gzip(b"one\ntwo\nthree\n").unwrap();
        let lines: Vec<String> = GzipReader::new(compressed.as_slice())
            .lines()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec!["one", "two", "three"]);
    }
}
