use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use colored::*;
use ronin_common::text::patterns::Pattern;
use ronin_common::{print_debug, print_raw};
use ronin_support::crypto::{DigestAlgorithm, hexdigest};
use ronin_support::fuzzing::{Fuzzer, Mutator, Rule};
use ronin_support::software::{Version, VersionRange};

use crate::terminal::{colors, print};

pub fn fuzz(text: &str, rules: Vec<Rule>, mutate: bool) -> anyhow::Result<()> {
    let count = if mutate {
        Mutator::new(rules).each(text).inspect(|s| print_raw!("{s}")).count()
    } else {
        let fuzzer = Fuzzer::new(rules);
        fuzzer.each(text).inspect(|s| print_raw!("{s}")).count()
    };
    print_debug!("{count} strings generated");
    Ok(())
}

pub fn hash(algorithm: DigestAlgorithm, text: &str) -> anyhow::Result<()> {
    print_raw!("{}", hexdigest(algorithm, text.as_bytes()));
    Ok(())
}

pub fn grep(pattern: Pattern, path: &Path) -> anyhow::Result<()> {
    let regex = pattern.regex();
    let mut found = 0;

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        for m in regex.find_iter(&line) {
            found += 1;
            print_raw!(
                "{}{} {}",
                (number + 1).to_string().color(colors::ACCENT),
                ":".color(colors::SEPARATOR),
                m.as_str()
            );
        }
    }

    if found == 0 {
        print::no_results(&format!("{} matches", pattern.name()));
    }
    Ok(())
}

pub fn version(range: &VersionRange, versions: &[Version]) -> anyhow::Result<()> {
    print::tree_head(0, &range.to_string());
    let pairs: Vec<(String, ColoredString)> = versions
        .iter()
        .map(|version| {
            let verdict = if range.includes(version) {
                "included".green()
            } else {
                "excluded".red()
            };
            (version.to_string(), verdict)
        })
        .collect();
    print::as_tree_one_level(&pairs);
    Ok(())
}
