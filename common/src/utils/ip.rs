//! # IP Address Helpers
//!
//! Small conversions and classifications for [`IpAddr`] values used across the
//! workspace: PTR name generation, address-type detection and a `u128`
//! representation that lets IPv4 and IPv6 share the same range arithmetic.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::text::patterns;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }

    /// Number of address bits for this family.
    pub fn bits(self) -> u8 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }

    pub fn max_value(self) -> u128 {
        match self {
            IpVersion::V4 => u32::MAX as u128,
            IpVersion::V6 => u128::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ipv6AddressType {
    GlobalUnicast,
    UniqueLocal,
    LinkLocal,
    Loopback,
    Multicast,
    Unspecified,
    Other,
}

pub trait IpAddrExt {
    fn version(&self) -> IpVersion;
    fn to_u128(&self) -> u128;
    fn reverse_ptr(&self) -> String;
    fn is_v4_mapped(&self) -> bool;
}

impl IpAddrExt for IpAddr {
    fn version(&self) -> IpVersion {
        IpVersion::of(self)
    }

    fn to_u128(&self) -> u128 {
        match self {
            IpAddr::V4(v4) => u32::from(*v4) as u128,
            IpAddr::V6(v6) => u128::from(*v6),
        }
    }

    fn reverse_ptr(&self) -> String {
        reverse_address_to_ptr(self)
    }

    fn is_v4_mapped(&self) -> bool {
        match self {
            IpAddr::V6(v6) => v6.to_ipv4_mapped().is_some(),
            IpAddr::V4(_) => false,
        }
    }
}

/// Rebuilds an address of the given family from its integer value.
///
/// Values wider than the family are truncated to its low bits.
pub fn from_u128(value: u128, version: IpVersion) -> IpAddr {
    match version {
        IpVersion::V4 => IpAddr::V4(Ipv4Addr::from(value as u32)),
        IpVersion::V6 => IpAddr::V6(Ipv6Addr::from(value)),
    }
}

/// Returns the PTR query name for an address.
///
/// `192.0.2.1` becomes `1.2.0.192.in-addr.arpa`, IPv6 addresses are
/// expanded into reversed nibbles under `ip6.arpa`.
pub fn reverse_address_to_ptr(ip_addr: &IpAddr) -> String {
    match ip_addr {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{d}.{c}.{b}.{a}.in-addr.arpa")
        }
        IpAddr::V6(v6) => {
            let mut labels: Vec<String> = Vec::with_capacity(32 + 1);
            for byte in v6.octets().iter().rev() {
                labels.push(format!("{:x}", byte & 0x0f));
                labels.push(format!("{:x}", byte >> 4));
            }
            labels.push("ip6.arpa".to_string());
            labels.join(".")
        }
    }
}

pub fn is_private(ip_addr: &IpAddr) -> bool {
    match ip_addr {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            v6.is_loopback() || v6.is_unique_local() || v6.is_unicast_link_local()
        }
    }
}

/// `2000::/3`
pub fn is_global_unicast(ipv6_addr: &Ipv6Addr) -> bool {
    let first_byte = ipv6_addr.octets()[0];
    (0x20..=0x3f).contains(&first_byte)
}

pub fn get_ipv6_type(ipv6_addr: &Ipv6Addr) -> Ipv6AddressType {
    if ipv6_addr.is_unspecified() {
        Ipv6AddressType::Unspecified
    } else if ipv6_addr.is_loopback() {
        Ipv6AddressType::Loopback
    } else if ipv6_addr.is_multicast() {
        Ipv6AddressType::Multicast
    } else if is_global_unicast(ipv6_addr) {
        Ipv6AddressType::GlobalUnicast
    } else if ipv6_addr.is_unique_local() {
        Ipv6AddressType::UniqueLocal
    } else if ipv6_addr.is_unicast_link_local() {
        Ipv6AddressType::LinkLocal
    } else {
        Ipv6AddressType::Other
    }
}

/// Finds every valid IPv4 and IPv6 address mentioned in `text`, in order of appearance.
pub fn extract_ips(text: &str) -> Vec<IpAddr> {
    patterns::IP_ADDR
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<IpAddr>().ok())
        .collect()
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

    #[test]
    fn ptr_name_v4() {
        let ip: IpAddr = "192.0.2.1".parse().unwrap();
        assert_eq!(reverse_address_to_ptr(&ip), "1.2.0.192.in-addr.arpa");
    }

    #[test]
    fn ptr_name_v6() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(
            ip.reverse_ptr(),
            "1.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.0.8.b.d.0.1.0.0.2.ip6.arpa"
        );
    }

    #[test]
    fn u128_round_trip_keeps_family() {
        let v4: IpAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(v4.to_u128(), 0x0a00_0001);
        assert_eq!(from_u128(v4.to_u128(), IpVersion::V4), v4);

        let v6: IpAddr = "::ffff".parse().unwrap();
        assert_eq!(from_u128(0xffff, IpVersion::V6), v6);
    }

    #[test]
    fn ipv6_classification() {
        let gua: Ipv6Addr = "2606:4700::1111".parse().unwrap();
        let ula: Ipv6Addr = "fd00::1".parse().unwrap();
        let lla: Ipv6Addr = "fe80::1".parse().unwrap();
        assert_eq!(get_ipv6_type(&gua), Ipv6AddressType::GlobalUnicast);
        assert_eq!(get_ipv6_type(&ula), Ipv6AddressType::UniqueLocal);
        assert_eq!(get_ipv6_type(&lla), Ipv6AddressType::LinkLocal);
        assert_eq!(get_ipv6_type(&Ipv6Addr::LOCALHOST), Ipv6AddressType::Loopback);
    }

    #[test]
    fn private_ranges() {
        assert!(is_private(&"192.168.1.1".parse().unwrap()));
        assert!(is_private(&"127.0.0.1".parse().unwrap()));
        assert!(!is_private(&"8.8.8.8".parse().unwrap()));
    }

    #[test]
    fn extract_ips_from_text() {
        let text = "hosts 10.0.0.1 and 2001:db8::2, but not 999.1.1.1";
        let ips = extract_ips(text);
        assert_eq!(
            ips,
            vec![
                "10.0.0.1".parse::<IpAddr>().unwrap(),
                "2001:db8::2".parse::<IpAddr>().unwrap()
            ]
        );
    }
}
