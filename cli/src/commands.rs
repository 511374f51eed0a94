pub mod network;
pub mod proxy;
pub mod text;
pub mod web;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use ronin_common::network::target::IpTarget;
use ronin_common::text::patterns::Pattern;
use ronin_support::crypto::DigestAlgorithm;
use ronin_support::fuzzing::Rule;
use ronin_support::software::{Version, VersionRange};

#[derive(Parser)]
#[command(name = "ronin")]
#[command(about = "Helpers for security research: addresses, fuzzing, proxies and more.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log output (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Expand hosts, CIDRs, globs and ranges into addresses
    #[command(alias = "i")]
    Ips {
        #[arg(required = true)]
        targets: Vec<IpTarget>,
    },
    /// Generate variations of a string from substitution rules
    #[command(alias = "f")]
    Fuzz {
        text: String,
        /// REGEX=VALUE,VALUE
        #[arg(short, long = "rule", required = true, value_parser = Rule::parse)]
        rules: Vec<Rule>,
        /// Replace every combination of matches instead of one at a time
        #[arg(short, long)]
        mutate: bool,
    },
    /// Split host names into name and public suffix
    Suffix {
        #[arg(required = true)]
        hosts: Vec<String>,
    },
    /// Look up the autonomous system announcing an address
    Asn {
        #[arg(required = true)]
        ips: Vec<IpAddr>,
    },
    /// Check whether a port is open
    #[command(alias = "o")]
    Open {
        host: String,
        port: u16,
        #[arg(short, long)]
        udp: bool,
        /// Seconds to wait for an answer
        #[arg(short, long, default_value_t = 3)]
        timeout: u64,
    },
    /// Relay traffic to an upstream server and print it
    #[command(alias = "p")]
    Proxy {
        listen: SocketAddr,
        /// HOST:PORT
        upstream: String,
        #[arg(short, long)]
        udp: bool,
        /// Print traffic as a hex dump
        #[arg(short = 'x', long)]
        hexdump: bool,
    },
    /// Hash text with md5, sha1, sha256 or sha512
    Hash {
        algorithm: DigestAlgorithm,
        text: String,
    },
    /// Print every match of a named pattern in a file
    #[command(alias = "g")]
    Grep { pattern: Pattern, file: PathBuf },
    /// Resolve a host name, or reverse-resolve an address
    Dns { name: String },
    /// Probe an HTTP server
    Http { url: String },
    /// Check versions against a range such as ">= 1.2, < 2.0"
    Version {
        range: VersionRange,
        #[arg(required = true)]
        versions: Vec<Version>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
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
    use clap::CommandFactory;

    #[test]
    fn command_line_is_consistent() {
        CommandLine::command().debug_assert();
    }

    #[test]
    fn parses_fuzz_rules() {
        let cli =
            CommandLine::try_parse_from(["ronin", "-vv", "fuzz", "a.b", "-r", r"\.=_,-", "-m"])
                .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Fuzz { text, rules, mutate } => {
                assert_eq!(text, "a.b");
                assert_eq!(rules.len(), 1);
                assert!(mutate);
            }
            _ => panic!("expected fuzz"),
        }
    }

    #[test]
    fn rejects_bad_targets() {
        assert!(CommandLine::try_parse_from(["ronin", "ips", "10.0.0.0/33"]).is_err());
        assert!(CommandLine::try_parse_from(["ronin", "hash", "crc9", "x"]).is_err());
    }

    #[test]
    fn parses_version_range() {
        let cli = CommandLine::try_parse_from([
            "ronin",
            "--no-color",
            "version",
            ">= 1.2, < 2.0",
            "1.5",
        ])
        .unwrap();
        assert!(cli.no_color);
        assert!(matches!(cli.command, Commands::Version { .. }));
    }
}
