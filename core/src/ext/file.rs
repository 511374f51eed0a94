//! Word-list style file helpers.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Trimmed lines of `path`, skipping blank lines and `#` comments.
pub fn each_line(path: &Path) -> io::Result<impl Iterator<Item = io::Result<String>> + use<>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(reader.lines().filter_map(|line| match line {
        Ok(line) => {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(Ok(trimmed.to_string()))
            }
        }
        Err(err) => Some(Err(err)),
    }))
}

/// [`each_line`] split on `separator`, each field trimmed.
pub fn each_row(
    path: &Path,
    separator: char,
) -> io::Result<impl Iterator<Item = io::Result<Vec<String>>> + use<>> {
    Ok(each_line(path)?.map(move |line| {
        line.map(|line| {
            line.split(separator)
                .map(|field| field.trim().to_string())
                .collect()
        })
    }))
}

/// Writes one item per line, replacing the file.
pub fn write_lines<I, S>(path: &Path, lines: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(writer, "{}", line.as_ref())?;
    }
    writer.flush()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
