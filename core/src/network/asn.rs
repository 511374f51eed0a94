//! # Autonomous System Numbers
//!
//! Loads the iptoasn.com `ip2asn-combined.tsv` dataset and answers which AS
//! announces an address. Each line is
//! `range_start \t range_end \t AS_number \t country_code \t AS_description`,
//! with `0` / `None` / `Not routed` marking unannounced space.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow};
use ronin_common::config::Config;
use ronin_common::network::range::IpRange;
use tracing::info;

use crate::compression::GzipReader;
use crate::home;

pub const FILE_NAME: &str = "ip2asn-combined.tsv.gz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub range: IpRange,
    pub number: u32,
    pub country_code: Option<String>,
    pub name: Option<String>,
}

impl Record {
    pub fn routed(&self) -> bool {
        self.number != 0
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.range.contains(ip)
    }

    pub fn parse_line(line: &str) -> anyhow::Result<Self> {
        let mut fields = line.splitn(5, '\t');
        let mut next = |what: &str| {
            fields
                .next()
                .map(str::trim)
                .ok_or_else(|| anyhow!("missing {what}"))
        };

        let first: IpAddr = next("range start")?.parse().context("invalid range start")?;
        let last: IpAddr = next("range end")?.parse().context("invalid range end")?;
        let number: u32 = next("AS number")?.parse().context("invalid AS number")?;
        let country = next("country code")?;
        let name = next("AS description").unwrap_or("");

        Ok(Self {
            range: IpRange::new(first, last)?,
            number,
            country_code: match country {
                "" | "None" => None,
                code => Some(code.to_string()),
            },
            name: match name {
                "" | "Not routed" => None,
                name => Some(name.to_string()),
            },
        })
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS{}", self.range, self.number)?;
        if let Some(code) = &self.country_code {
            write!(f, " ({code})")?;
        }
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        Ok(())
    }
}

/// Records split per address family and sorted by range start, so lookups
/// are a binary search.
#[derive(Debug, Default, Clone)]
pub struct List {
    v4: Vec<Record>,
    v6: Vec<Record>,
}

impl List {
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let (mut v4, mut v6): (Vec<Record>, Vec<Record>) = records
            .into_iter()
            .partition(|record| record.range.first().is_ipv4());
        v4.sort_by_key(|record| record.range.first());
        v6.sort_by_key(|record| record.range.first());
        Self { v4, v6 }
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    pub fn from_reader<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.context("reading ASN list")?;
            if line.trim().is_empty() {
                continue;
            }
            let record = Record::parse_line(&line)
                .with_context(|| format!("line {}: '{line}'", index + 1))?;
            records.push(record);
        }
        Ok(Self::from_records(records))
    }

    /// Opens a plain or `.gz` compressed list.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            Self::from_reader(GzipReader::new(file))
        } else {
            Self::from_reader(BufReader::new(file))
        }
    }

    pub fn ip(&self, ip: &IpAddr) -> Option<&Record> {
        let records = if ip.is_ipv4() { &self.v4 } else { &self.v6 };
        let index = records.partition_point(|record| record.range.first() <= *ip);
        let candidate = records.get(index.checked_sub(1)?)?;
        candidate.contains(ip).then_some(candidate)
    }

    pub fn number(&self, number: u32) -> impl Iterator<Item = &Record> {
        self.iter().filter(move |record| record.number == number)
    }

    pub fn country<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Record> {
        self.iter().filter(move |record| {
            record
                .country_code
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(code))
        })
    }

    pub fn name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Record> {
        self.iter()
            .filter(move |record| record.name.as_deref() == Some(name))
    }

    /// Distinct AS numbers in the list, routed ones only.
    pub fn numbers(&self) -> HashSet<u32> {
        self.iter()
            .filter(|record| record.routed())
            .map(|record| record.number)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.v4.iter().chain(self.v6.iter())
    }

    pub fn len(&self) -> usize {
        self.v4.len() + self.v6.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(config: &Config) -> PathBuf {
        home::cache_path(config, FILE_NAME)
    }

    pub fn is_stale(path: &Path, max_age: Duration) -> bool {
        home::is_stale(path, max_age)
    }

    pub async fn download(config: &Config) -> anyhow::Result<()> {
        home::download(config, &config.asn_url, &Self::path(config)).await
    }

    /// Downloads the list if it is missing or older than `config.max_age`.
    pub async fn update(config: &Config) -> anyhow::Result<bool> {
        home::update(config, &config.asn_url, &Self::path(config)).await
    }

    pub async fn load(config: &Config) -> anyhow::Result<Self> {
        Self::update(config).await?;
        let path = Self::path(config);
        let list = tokio::task::spawn_blocking(move || Self::open(&path))
            .await
            .context("loading ASN list")??;
        info!("loaded {} ASN records", list.len());
        Ok(list)
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
    use crate::compression;

    const SAMPLE: &str = "\
1.0.0.0\t1.0.0.255\t13335\tUS\tCLOUDFLARENET
1.0.1.0\t1.0.3.255\t0\tNone\tNot routed
1.0.4.0\t1.0.7.255\t38803\tAU\tGTELECOM-AUSTRALIA Gtelecom Pty Ltd
8.8.8.0\t8.8.8.255\t15169\tUS\tGOOGLE
2001:4860::\t2001:4860:ffff:ffff:ffff:ffff:ffff:ffff\t15169\tUS\tGOOGLE
";

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn parses_records() {
        let record = Record::parse_line("1.0.0.0\t1.0.0.255\t13335\tUS\tCLOUDFLARENET").unwrap();
        assert_eq!(record.number, 13335);
        assert_eq!(record.country_code.as_deref(), Some("US"));
        assert_eq!(record.name.as_deref(), Some("CLOUDFLARENET"));
        assert!(record.routed());
        assert_eq!(record.to_string(), "1.0.0.0 - 1.0.0.255 AS13335 (US) CLOUDFLARENET");
    }

    #[test]
    fn not_routed_fields_are_none() {
        let record = Record::parse_line("1.0.1.0\t1.0.3.255\t0\tNone\tNot routed").unwrap();
        assert!(!record.routed());
        assert_eq!(record.country_code, None);
        assert_eq!(record.name, None);
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(Record::parse_line("1.0.0.0\t1.0.0.255").is_err());
        assert!(Record::parse_line("1.0.0.0\t::1\t1\tUS\tX").is_err());
        assert!(List::parse("garbage\n").is_err());
    }

    #[test]
    fn ip_lookup() {
        let list = List::parse(SAMPLE).unwrap();
        assert_eq!(list.len(), 5);

        assert_eq!(list.ip(&ip("1.0.0.1")).unwrap().number, 13335);
        assert_eq!(list.ip(&ip("1.0.5.5")).unwrap().number, 38803);
        assert!(!list.ip(&ip("1.0.2.2")).unwrap().routed());
        assert_eq!(list.ip(&ip("8.8.8.8")).unwrap().name.as_deref(), Some("GOOGLE"));
        assert_eq!(list.ip(&ip("2001:4860::8888")).unwrap().number, 15169);

        assert!(list.ip(&ip("0.0.0.1")).is_none());
        assert!(list.ip(&ip("1.0.8.0")).is_none());
        assert!(list.ip(&ip("::1")).is_none());
    }

    #[test]
    fn queries() {
        let list = List::parse(SAMPLE).unwrap();
        assert_eq!(list.number(15169).count(), 2);
        assert_eq!(list.country("us").count(), 3);
        assert_eq!(list.name("GOOGLE").count(), 2);
        assert_eq!(list.numbers(), HashSet::from([13335, 38803, 15169]));
    }

    #[test]
    fn opens_gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        std::fs::write(&path, compression::gzip(SAMPLE.as_bytes()).unwrap()).unwrap();

        let list = List::open(&path).unwrap();
        assert_eq!(list.len(), 5);
    }

    #[tokio::test]
    #[ignore]
    async fn loads_published_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_cache_dir(dir.path());
        let list = List::load(&config).await.unwrap();
        assert!(list.ip(&ip("8.8.8.8")).is_some());
    }
}
