use std::fmt::Write;
use std::net::{IpAddr, Ipv6Addr};

use colored::*;
use ronin_common::utils::ip::{Ipv6AddressType, get_ipv6_type};

use crate::terminal::colors;

const HEXDUMP_WIDTH: usize = 16;

pub fn ipv6_to_type_str(ipv6_addr: &Ipv6Addr) -> &'static str {
    match get_ipv6_type(ipv6_addr) {
        Ipv6AddressType::GlobalUnicast => "GUA",
        Ipv6AddressType::UniqueLocal => "ULA",
        Ipv6AddressType::LinkLocal => "LLA",
        Ipv6AddressType::Loopback => "Loopback",
        Ipv6AddressType::Multicast => "Multicast",
        Ipv6AddressType::Unspecified => "Unspecified",
        Ipv6AddressType::Other => "IPv6",
    }
}

pub fn ip_to_key_value_pair(ip: &IpAddr) -> (String, ColoredString) {
    match ip {
        IpAddr::V4(ipv4_addr) => {
            let value = ipv4_addr.to_string().color(colors::IPV4_ADDR);
            (String::from("IPv4"), value)
        }
        IpAddr::V6(ipv6_addr) => {
            let ipv6_type = ipv6_to_type_str(ipv6_addr);
            let value = ipv6_addr.to_string().color(colors::IPV6_ADDR);
            (String::from(ipv6_type), value)
        }
    }
}

pub fn ips_to_key_value_pairs<'a>(
    ips: impl IntoIterator<Item = &'a IpAddr>,
) -> Vec<(String, ColoredString)> {
    ips.into_iter().map(ip_to_key_value_pair).collect()
}

/// Classic `offset  hex bytes  |ascii|` dump, sixteen bytes per line.
pub fn hexdump(data: &[u8]) -> String {
    let mut out = String::new();

    for (line, chunk) in data.chunks(HEXDUMP_WIDTH).enumerate() {
        let _ = write!(out, "{:08x}  ", line * HEXDUMP_WIDTH);

        for i in 0..HEXDUMP_WIDTH {
            match chunk.get(i) {
                Some(byte) => {
                    let _ = write!(out, "{byte:02x} ");
                }
                None => out.push_str("   "),
            }
            if i == HEXDUMP_WIDTH / 2 - 1 {
                out.push(' ');
            }
        }

        out.push('|');
        out.extend(chunk.iter().map(|&byte| {
            if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '.'
            }
        }));
        out.push_str("|\n");
    }

    out
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
