//! # Address Target Model
//!
//! Parses user-supplied address specifications into something iterable.
//!
//! A target can be:
//! * A single IP address (host).
//! * A CIDR block (e.g., `192.168.1.0/24`).
//! * An IP glob (e.g., `10.1.1.*`, `10.1.1.1,3,5`).
//! * An inclusive range (e.g., `192.168.1.1-192.168.1.50`, `192.168.1.10-2.66`).

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::network::RangeError;
use crate::network::cidr::Cidr;
use crate::network::glob::IpGlob;
use crate::network::range::IpRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpTarget {
    Host { addr: IpAddr },
    Cidr { cidr: Cidr },
    Glob { glob: IpGlob },
    Range { range: IpRange },
}

impl IpTarget {
    pub fn iter(&self) -> Box<dyn Iterator<Item = IpAddr>> {
        match self {
            IpTarget::Host { addr } => Box::new(std::iter::once(*addr)),
            IpTarget::Cidr { cidr } => Box::new(cidr.iter()),
            IpTarget::Glob { glob } => Box::new(glob.iter()),
            IpTarget::Range { range } => Box::new(range.iter()),
        }
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        match self {
            IpTarget::Host { addr } => addr == ip,
            IpTarget::Cidr { cidr } => cidr.contains(ip),
            IpTarget::Glob { glob } => glob.contains(ip),
            IpTarget::Range { range } => range.contains(ip),
        }
    }

    pub fn size(&self) -> u128 {
        match self {
            IpTarget::Host { .. } => 1,
            IpTarget::Cidr { cidr } => cidr.size(),
            IpTarget::Glob { glob } => glob.size(),
            IpTarget::Range { range } => range.size(),
        }
    }
}

impl fmt::Display for IpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpTarget::Host { addr } => write!(f, "{addr}"),
            IpTarget::Cidr { cidr } => write!(f, "{cidr}"),
            IpTarget::Glob { glob } => write!(f, "{glob}"),
            IpTarget::Range { range } => write!(f, "{range}"),
        }
    }
}

impl FromStr for IpTarget {
    type Err = RangeError;

    /// Parses a string into an `IpTarget`.
    ///
    /// Precedence: host, then CIDR, then glob, then range. `10.1.1.1-5` is a
    /// glob, `10.1.1.1-10.1.1.5` and `10.1.1.250-2.5` are ranges.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(target) = parse_host(s) {
            return Ok(target);
        }

        if let Some(target) = parse_cidr(s)? {
            return Ok(target);
        }

        if let Some(target) = parse_glob(s) {
            return Ok(target);
        }

        if let Some(target) = parse_ip_range(s)? {
            return Ok(target);
        }

        Err(RangeError::InvalidTarget(s.to_string()))
    }
}

/// Parses a single IP address.
fn parse_host(s: &str) -> Option<IpTarget> {
    s.parse::<IpAddr>().ok().map(|addr| IpTarget::Host { addr })
}

fn parse_cidr(s: &str) -> Result<Option<IpTarget>, RangeError> {
    if !s.contains('/') {
        return Ok(None);
    }
    let cidr = s.parse::<Cidr>()?;
    Ok(Some(IpTarget::Cidr { cidr }))
}

fn parse_glob(s: &str) -> Option<IpTarget> {
    s.parse::<IpGlob>().ok().map(|glob| IpTarget::Glob { glob })
}

/// Parses a range string like "1.1.1.1-2.2.2.2" or "1.1.1.1 - 1.1.2.50".
fn parse_ip_range(s: &str) -> Result<Option<IpTarget>, RangeError> {
    if !s.contains('-') {
        return Ok(None);
    }
    let range = s.parse::<IpRange>()?;
    Ok(Some(IpTarget::Range { range }))
}

/// An ordered list of targets, iterated one after another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpTargets {
    targets: Vec<IpTarget>,
}

impl IpTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, target: IpTarget) {
        self.targets.push(target);
    }

    /// Parses every item, failing on the first invalid one.
    pub fn parse_all<I, S>(items: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets = items
            .into_iter()
            .map(|item| item.as_ref().parse::<IpTarget>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn size(&self) -> u128 {
        self.targets
            .iter()
            .fold(0u128, |acc, target| acc.saturating_add(target.size()))
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.targets.iter().any(|target| target.contains(ip))
    }

    pub fn iter(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.targets.iter().flat_map(|target| target.iter())
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
