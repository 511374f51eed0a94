//! # IP Range Model
//!
//! An inclusive span of addresses between two endpoints of the same family,
//! e.g. `192.168.1.1 - 192.168.1.100` or `2001:db8::1 - 2001:db8::ff`.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::network::RangeError;
use crate::utils::ip::{self, IpAddrExt, IpVersion};

/// Represents a continuous range of IP addresses, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpRange {
    pub(crate) first: IpAddr,
    pub(crate) last: IpAddr,
}

impl IpRange {
    pub fn new(first: IpAddr, last: IpAddr) -> Result<Self, RangeError> {
        if first.version() != last.version() {
            return Err(RangeError::MixedFamilies { first, last });
        }
        Ok(Self { first, last })
    }

    pub fn first(&self) -> IpAddr {
        self.first
    }

    pub fn last(&self) -> IpAddr {
        self.last
    }

    pub fn version(&self) -> IpVersion {
        self.first.version()
    }

    /// Addresses in ascending order. Empty when `first > last`.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = IpAddr> + Clone + use<> {
        let version = self.version();
        (self.first.to_u128()..=self.last.to_u128()).map(move |value| ip::from_u128(value, version))
    }

    pub fn contains(&self, addr: &IpAddr) -> bool {
        if addr.version() != self.version() {
            return false;
        }
        let value = addr.to_u128();
        self.first.to_u128() <= value && value <= self.last.to_u128()
    }

    /// Number of addresses, saturating for the full IPv6 space.
    pub fn size(&self) -> u128 {
        let (first, last) = (self.first.to_u128(), self.last.to_u128());
        if first > last {
            0
        } else {
            (last - first).saturating_add(1)
        }
    }
}

impl IntoIterator for IpRange {
    type Item = IpAddr;
    type IntoIter = Box<dyn DoubleEndedIterator<Item = IpAddr>>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl fmt::Display for IpRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.first, self.last)
    }
}

impl FromStr for IpRange {
    type Err = RangeError;

    /// Parses `first - last`, `first-last`, or an abbreviated IPv4 end such as
    /// `192.168.1.1-50` (implies `192.168.1.50`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((start_str, end_str)) = s.split_once('-') else {
            return Err(RangeError::InvalidTarget(s.to_string()));
        };
        let (start_str, end_str) = (start_str.trim(), end_str.trim());

        let first = start_str
            .parse::<IpAddr>()
            .map_err(|_| RangeError::InvalidAddress(start_str.to_string()))?;

        let last = match (first, end_str.parse::<IpAddr>()) {
            (_, Ok(full_addr)) => full_addr,
            (IpAddr::V4(start_v4), Err(_)) => {
                IpAddr::V4(parse_range_end_addr(end_str, &start_v4, s)?)
            }
            (IpAddr::V6(_), Err(_)) => return Err(RangeError::InvalidAddress(end_str.to_string())),
        };

        IpRange::new(first, last)
    }
}

/// Helper to parse the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(
    end_str: &str,
    start_addr: &Ipv4Addr,
    original_s: &str,
) -> Result<Ipv4Addr, RangeError> {
    if let Ok(full_addr) = end_str.parse::<Ipv4Addr>() {
        return Ok(full_addr);
    }

    if end_str.is_empty() {
        return Err(RangeError::InvalidTarget(original_s.to_string()));
    }

    let mut end_octets = start_addr.octets();
    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(|octet_str| octet_str.parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| RangeError::InvalidAddress(end_str.to_string()))?;

    if partial_octets.len() > 4 {
        return Err(RangeError::InvalidAddress(end_str.to_string()));
    }

    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
