use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use pnet::ipnetwork::IpNetwork;

use crate::network::RangeError;
use crate::network::range::IpRange;
use crate::utils::ip::{self, IpAddrExt, IpVersion};

/// A network block in CIDR notation, e.g. `10.0.0.0/24` or `2001:db8::/32`.
///
/// The address is kept as written; [`Cidr::network`] gives the masked base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    network: IpNetwork,
}

impl Cidr {
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, RangeError> {
        let max = addr.version().bits();
        if prefix > max {
            return Err(RangeError::PrefixTooLong { prefix, max });
        }
        let network = IpNetwork::new(addr, prefix)
            .map_err(|e| RangeError::InvalidPrefix(e.to_string()))?;
        Ok(Self { network })
    }

    /// The smallest block that contains both `first` and `last`.
    pub fn covering(first: IpAddr, last: IpAddr) -> Result<Self, RangeError> {
        if first.version() != last.version() {
            return Err(RangeError::MixedFamilies { first, last });
        }
        let differing = first.to_u128() ^ last.to_u128();
        let prefix = match first.version() {
            IpVersion::V4 => (differing as u32).leading_zeros() as u8,
            IpVersion::V6 => differing.leading_zeros() as u8,
        };
        Cidr::new(first, prefix)
    }

    pub fn addr(&self) -> IpAddr {
        self.network.ip()
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    pub fn version(&self) -> IpVersion {
        self.addr().version()
    }

    fn mask_bits(&self) -> u128 {
        let version = self.version();
        let host_bits = u32::from(version.bits() - self.prefix());
        let host_mask = if host_bits >= 128 {
            u128::MAX
        } else {
            (1u128 << host_bits) - 1
        };
        version.max_value() & !host_mask
    }

    pub fn netmask(&self) -> IpAddr {
        ip::from_u128(self.mask_bits(), self.version())
    }

    pub fn network(&self) -> IpAddr {
        ip::from_u128(self.addr().to_u128() & self.mask_bits(), self.version())
    }

    /// The last address of the block (the broadcast address for IPv4).
    pub fn last(&self) -> IpAddr {
        let version = self.version();
        let host_mask = version.max_value() & !self.mask_bits();
        ip::from_u128(self.network().to_u128() | host_mask, version)
    }

    pub fn broadcast(&self) -> IpAddr {
        self.last()
    }

    pub fn contains(&self, addr: &IpAddr) -> bool {
        addr.version() == self.version() && self.network.contains(*addr)
    }

    pub fn size(&self) -> u128 {
        self.to_range().size()
    }

    pub fn to_range(&self) -> IpRange {
        IpRange {
            first: self.network(),
            last: self.last(),
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = IpAddr> + Clone + use<> {
        self.to_range().iter()
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr(), self.prefix())
    }
}

impl FromStr for Cidr {
    type Err = RangeError;

    /// Parses CIDR notation like "192.168.1.0/24". A bare address is a host block.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (ip_str, prefix_str) = match s.split_once('/') {
            Some((ip_str, prefix_str)) => (ip_str, Some(prefix_str)),
            None => (s, None),
        };

        let addr = ip_str
            .parse::<IpAddr>()
            .map_err(|_| RangeError::InvalidAddress(ip_str.to_string()))?;

        let prefix = match prefix_str {
            Some(prefix_str) => prefix_str
                .parse::<u8>()
                .map_err(|_| RangeError::InvalidPrefix(prefix_str.to_string()))?,
            None => addr.version().bits(),
        };

        Cidr::new(addr, prefix)
    }
}

/// Creates a range from an IP and a CIDR prefix (e.g., 192.168.1.0/24).
///
/// Returns the range covering the entire network block.
pub fn cidr_range(addr: IpAddr, prefix: u8) -> Result<IpRange, RangeError> {
    Ok(Cidr::new(addr, prefix)?.to_range())
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
    use std::net::Ipv4Addr;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_cidr_range() {
        let range = cidr_range(ip("192.168.1.100"), 24).unwrap();
        assert_eq!(range.first(), ip("192.168.1.0"));
        assert_eq!(range.last(), ip("192.168.1.255"));
    }

    #[test]
    fn test_cidr_range_zero_prefix() {
        let range = cidr_range(ip("10.20.30.40"), 0).unwrap();
        assert_eq!(range.first(), IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        assert_eq!(range.last(), IpAddr::V4(Ipv4Addr::new(255, 255, 255, 255)));
    }

    #[test]
    fn test_cidr_range_32_prefix() {
        let range = cidr_range(ip("172.16.0.1"), 32).unwrap();
        assert_eq!(range.first(), ip("172.16.0.1"));
        assert_eq!(range.last(), ip("172.16.0.1"));
    }

    #[test]
    fn test_cidr_range_invalid_prefix() {
        let result = cidr_range(ip("192.168.1.1"), 33);
        assert_eq!(
            result.unwrap_err().to_string(),
            "prefix 33 exceeds 32 bits"
        );
    }

    #[test]
    fn test_cidr_parse_and_iterate() {
        let cidr: Cidr = "10.0.0.0/30".parse().unwrap();
        let ips: Vec<String> = cidr.iter().map(|ip| ip.to_string()).collect();
        assert_eq!(ips, vec!["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3"]);
        assert_eq!(cidr.size(), 4);
        assert_eq!(cidr.netmask(), ip("255.255.255.252"));
    }

    #[test]
    fn test_cidr_unaligned_address_masks_to_network() {
        let cidr: Cidr = "172.16.5.10/20".parse().unwrap();
        assert_eq!(cidr.network(), ip("172.16.0.0"));
        assert_eq!(cidr.broadcast(), ip("172.16.15.255"));
        assert_eq!(cidr.to_string(), "172.16.5.10/20");
    }

    #[test]
    fn test_cidr_ipv6() {
        let cidr: Cidr = "2001:db8::/126".parse().unwrap();
        assert_eq!(cidr.size(), 4);
        assert_eq!(cidr.last(), ip("2001:db8::3"));
        assert!(cidr.contains(&ip("2001:db8::2")));
        assert!(!cidr.contains(&ip("2001:db8::4")));
        assert!(!cidr.contains(&ip("10.0.0.1")));
    }

    #[test]
    fn test_cidr_ipv6_zero_prefix() {
        let cidr: Cidr = "::/0".parse().unwrap();
        assert_eq!(cidr.last(), ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"));
        assert_eq!(cidr.size(), u128::MAX);
    }

    #[test]
    fn test_bare_address_is_host_block() {
        let cidr: Cidr = "::1".parse().unwrap();
        assert_eq!(cidr.prefix(), 128);
        assert_eq!(cidr.size(), 1);
    }

    #[test]
    fn test_covering() {
        let cidr = Cidr::covering(ip("10.0.0.1"), ip("10.0.0.200")).unwrap();
        assert_eq!(cidr.prefix(), 24);
        assert_eq!(cidr.network(), ip("10.0.0.0"));

        let same = Cidr::covering(ip("10.0.0.7"), ip("10.0.0.7")).unwrap();
        assert_eq!(same.prefix(), 32);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!("10.0.0.1/33".parse::<Cidr>().is_err());
        assert!("10.0.0.1/abc".parse::<Cidr>().is_err());
        assert!("not-an-ip/24".parse::<Cidr>().is_err());
        assert!("::/129".parse::<Cidr>().is_err());
    }
}
