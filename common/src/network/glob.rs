//! # IP Globs
//!
//! Wildcard patterns that describe a set of addresses one position at a time:
//!
//! * `10.1.1.*`: every host octet (`1..=254`).
//! * `10.1.1.1-5`: an inclusive range in one position.
//! * `10.1.1.1,3,5`: a list, whose items may themselves be ranges (`1,4-6`).
//! * `2001:db8::1-a`: IPv6 hextets in hexadecimal, `::` fills with zeros.
//!
//! Each position expands independently and the addresses are the cartesian
//! product of the positions, first position varying slowest.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::network::RangeError;
use crate::utils::ip::{IpAddrExt, IpVersion};
use crate::utils::product::Product;

const IPV4_WILDCARD: RangeInclusive<u32> = 1..=254;
const IPV6_WILDCARD: RangeInclusive<u32> = 1..=0xfffe;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpGlob {
    source: String,
    version: IpVersion,
    positions: Vec<Vec<RangeInclusive<u32>>>,
}

impl IpGlob {
    pub fn version(&self) -> IpVersion {
        self.version
    }

    /// Number of addresses the glob expands to, duplicates included.
    pub fn size(&self) -> u128 {
        self.positions.iter().fold(1u128, |acc, position| {
            let count: u128 = position
                .iter()
                .map(|range| (range.end() - range.start()) as u128 + 1)
                .sum();
            acc.saturating_mul(count)
        })
    }

    pub fn contains(&self, addr: &IpAddr) -> bool {
        if addr.version() != self.version {
            return false;
        }
        let values: Vec<u32> = match addr {
            IpAddr::V4(v4) => v4.octets().iter().map(|&o| u32::from(o)).collect(),
            IpAddr::V6(v6) => v6.segments().iter().map(|&s| u32::from(s)).collect(),
        };
        values
            .iter()
            .zip(&self.positions)
            .all(|(value, ranges)| ranges.iter().any(|range| range.contains(value)))
    }

    /// Lazily yields every address in positional order.
    pub fn iter(&self) -> impl Iterator<Item = IpAddr> + use<> {
        let sets: Vec<Vec<u32>> = self
            .positions
            .iter()
            .map(|ranges| ranges.iter().cloned().flatten().collect())
            .collect();
        let version = self.version;

        Product::new(sets).map(move |values| to_addr(&values, version))
    }
}

fn to_addr(values: &[u32], version: IpVersion) -> IpAddr {
    match version {
        IpVersion::V4 => {
            let mut octets = [0u8; 4];
            for (octet, value) in octets.iter_mut().zip(values) {
                *octet = *value as u8;
            }
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        IpVersion::V6 => {
            let mut segments = [0u16; 8];
            for (segment, value) in segments.iter_mut().zip(values) {
                *segment = *value as u16;
            }
            IpAddr::V6(Ipv6Addr::from(segments))
        }
    }
}

impl fmt::Display for IpGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for IpGlob {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let source = s.trim();
        let invalid = |reason: String| RangeError::InvalidGlob {
            glob: source.to_string(),
            reason,
        };

        let (version, segments) = if source.contains(':') {
            (IpVersion::V6, split_ipv6(source).map_err(invalid)?)
        } else {
            let segments: Vec<&str> = source.split('.').collect();
            if segments.len() != 4 {
                return Err(invalid(format!("expected 4 octets, found {}", segments.len())));
            }
            (IpVersion::V4, segments)
        };

        let positions = segments
            .iter()
            .map(|segment| parse_segment(segment, version))
            .collect::<Result<Vec<_>, String>>()
            .map_err(invalid)?;

        Ok(Self {
            source: source.to_string(),
            version,
            positions,
        })
    }
}

/// Splits an IPv6 glob into exactly eight segments, expanding `::` into zeros.
fn split_ipv6(glob: &str) -> Result<Vec<&str>, String> {
    let Some((left, right)) = glob.split_once("::") else {
        let segments: Vec<&str> = glob.split(':').collect();
        if segments.len() != 8 {
            return Err(format!("expected 8 hextets, found {}", segments.len()));
        }
        return Ok(segments);
    };

    if right.contains("::") {
        return Err("'::' may only appear once".to_string());
    }

    let left = hextets(left);
    let right = hextets(right);

    let explicit = left.len() + right.len();
    if explicit > 7 {
        return Err(format!("'::' leaves no room for zeros ({explicit} hextets)"));
    }

    let mut segments = left;
    segments.extend(std::iter::repeat_n("0", 8 - explicit));
    segments.extend(right);
    Ok(segments)
}

fn hextets(part: &str) -> Vec<&str> {
    if part.is_empty() {
        Vec::new()
    } else {
        part.split(':').collect()
    }
}

fn parse_segment(segment: &str, version: IpVersion) -> Result<Vec<RangeInclusive<u32>>, String> {
    let (radix, max, wildcard) = match version {
        IpVersion::V4 => (10, 0xff, IPV4_WILDCARD),
        IpVersion::V6 => (16, 0xffff, IPV6_WILDCARD),
    };

    if segment == "*" {
        return Ok(vec![wildcard]);
    }

    segment
        .split(',')
        .map(|item| {
            let (start, end) = match item.split_once('-') {
                Some((start, end)) => (start, end),
                None => (item, item),
            };
            let start = parse_value(start, radix, max)?;
            let end = parse_value(end, radix, max)?;
            if start > end {
                return Err(format!("range '{item}' is reversed"));
            }
            Ok(start..=end)
        })
        .collect()
}

fn parse_value(value: &str, radix: u32, max: u32) -> Result<u32, String> {
    let parsed = u32::from_str_radix(value.trim(), radix)
        .map_err(|_| format!("'{value}' is not a valid number"))?;
    if parsed > max {
        return Err(format!("{value} is out of range"));
    }
    Ok(parsed)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
