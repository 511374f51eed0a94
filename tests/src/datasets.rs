#![cfg(test)]
use std::fs;
use std::net::IpAddr;

use ronin_common::config::Config;
use ronin_support::compression::{self, archive};
use ronin_support::compression::archive::tar::TarWriter;
use ronin_support::compression::archive::zip::ZipWriter;
use ronin_support::fuzzing::{Mutator, Rule};
use ronin_support::network::{asn, public_suffix};
use ronin_support::software::{Version, VersionRange};

const ASN_SAMPLE: &str = "\
1.1.1.0\t1.1.1.255\t13335\tUS\tCLOUDFLARENET
8.8.8.0\t8.8.8.255\t15169\tUS\tGOOGLE
2606:4700::\t2606:4700:ffff:ffff:ffff:ffff:ffff:ffff\t13335\tUS\tCLOUDFLARENET
";

const SUFFIX_SAMPLE: &str = "\
// ===BEGIN ICANN DOMAINS===
com
uk
co.uk
// ===END ICANN DOMAINS===
";

fn cached(dir: &tempfile::TempDir) -> Config {
    Config::default().with_cache_dir(dir.path())
}

#[tokio::test]
async fn fresh_asn_cache_loads_without_download() {
    let dir = tempfile::tempdir().unwrap();
    let config = cached(&dir);
    fs::write(
        asn::List::path(&config),
        compression::gzip(ASN_SAMPLE.as_bytes()).unwrap(),
    )
    .unwrap();

    assert!(!asn::List::update(&config).await.unwrap());
    let list = asn::List::load(&config).await.unwrap();

    let ip: IpAddr = "2606:4700::1111".parse().unwrap();
    assert_eq!(list.ip(&ip).unwrap().number, 13335);
    assert_eq!(list.number(13335).count(), 2);
}

#[tokio::test]
async fn fresh_suffix_cache_loads_without_download() {
    let dir = tempfile::tempdir().unwrap();
    let config = cached(&dir);
    fs::write(public_suffix::List::path(&config), SUFFIX_SAMPLE).unwrap();

    let list = public_suffix::List::load(&config).await.unwrap();
    assert_eq!(list.domain("www.shop.example.co.uk").unwrap(), "example.co.uk");
}

#[test]
fn tar_gz_from_gzip_file() {
    let dir = tempfile::tempdir().unwrap();
    let tar_path = dir.path().join("loot.tar");

    let mut writer = TarWriter::new(fs::File::create(&tar_path).unwrap());
    writer.add_file("creds.txt", b"admin:admin").unwrap();
    writer.add_file("notes/todo.txt", b"rotate keys").unwrap();
    writer.finish().unwrap();

    let gz_path = compression::gzip_file(&tar_path).unwrap();
    assert_eq!(gz_path, dir.path().join("loot.tar.gz"));

    let entries = archive::open(&gz_path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], archive::Entry::new("creds.txt", b"admin:admin".to_vec()));
    assert_eq!(entries[1].name, "notes/todo.txt");
}

#[test]
fn zip_archive_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loot.zip");

    let mut writer = ZipWriter::new(fs::File::create(&path).unwrap());
    writer.add_file("a.txt", b"alpha").unwrap();
    writer.finish().unwrap();

    let entries = archive::open(&path).unwrap();
    assert_eq!(entries, vec![archive::Entry::new("a.txt", b"alpha".to_vec())]);
    assert!(archive::open(&dir.path().join("loot.rar")).is_err());
}

#[test]
fn mutated_versions_checked_against_range() {
    let rules = vec![Rule::parse(r"\d+$=0,3,9").unwrap()];
    let mut versions: Vec<Version> = Mutator::new(rules)
        .each("1.4.2")
        .map(|s| s.parse().unwrap())
        .collect();
    versions.sort();

    let range: VersionRange = ">= 1.4.1, < 1.4.5".parse().unwrap();
    let included: Vec<String> = versions
        .iter()
        .filter(|v| range.includes(v))
        .map(ToString::to_string)
        .collect();
    assert_eq!(versions.len(), 3);
    assert_eq!(included, vec!["1.4.3"]);
    assert_eq!(versions[0].to_string(), "1.4.0");
}
