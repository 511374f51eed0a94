//! # Stub Resolver
//!
//! Builds single-question queries with `pnet`, parses answers with
//! `dns-parser`, and talks to one nameserver over UDP.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use dns_parser::{Packet, RData};
use pnet::packet::dns::{DnsClass, DnsQuery, DnsType, DnsTypes, MutableDnsPacket, Opcode, Retcode};
use ronin_common::utils::ip;
use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout_at};
use tracing::debug;

pub const DNS_HDR_LEN: usize = 12;
pub const DNS_PORT: u16 = 53;
pub const RESOLV_CONF: &str = "/etc/resolv.conf";
pub const FALLBACK_NAMESERVER: IpAddr = IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1));

/// Addresses and names carried by one response.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DnsAnswer {
    pub id: u16,
    pub addresses: Vec<IpAddr>,
    pub hostnames: Vec<String>,
}

pub fn parse_response(payload: &[u8]) -> anyhow::Result<DnsAnswer> {
    let packet = Packet::parse(payload).context("failed to parse DNS packet")?;
    let mut answer = DnsAnswer {
        id: packet.header.id,
        ..DnsAnswer::default()
    };

    for record in packet.answers.iter().chain(packet.additional.iter()) {
        match &record.data {
            RData::A(a) => answer.addresses.push(IpAddr::V4(a.0)),
            RData::AAAA(aaaa) => answer.addresses.push(IpAddr::V6(aaaa.0)),
            RData::PTR(ptr) => answer.hostnames.push(ptr.0.to_string()),
            _ => {}
        }
    }

    Ok(answer)
}

pub fn create_query_packet(name: &str, qtype: DnsType, id: u16) -> anyhow::Result<Vec<u8>> {
    let query: DnsQuery = DnsQuery {
        qname: encode_dns_name(name),
        qtype,
        qclass: DnsClass(1),
        payload: Vec::new(),
    };
    let q_fixed_len: usize = 4;
    let total: usize = DNS_HDR_LEN + query.qname.len() + q_fixed_len;
    let mut buffer: Vec<u8> = vec![0u8; total];

    {
        let mut dns: MutableDnsPacket =
            MutableDnsPacket::new(&mut buffer).context("creating dns header")?;
        dns.set_id(id);
        dns.set_is_response(0);
        dns.set_opcode(Opcode::StandardQuery);
        dns.set_is_authoriative(0);
        dns.set_is_truncated(0);
        dns.set_is_recursion_desirable(1);
        dns.set_is_recursion_available(0);
        dns.set_zero_reserved(0);
        dns.set_is_non_authenticated_data(0);
        dns.set_rcode(Retcode::NoError);
        dns.set_query_count(1);
        dns.set_response_count(0);
        dns.set_authority_rr_count(0);
        dns.set_additional_rr_count(0);
    }

    // The question section is written by hand; pnet only lays out the header.
    let mut cursor: usize = DNS_HDR_LEN;

    buffer[cursor..cursor + query.qname.len()].copy_from_slice(&query.qname);
    cursor += query.qname.len();

    buffer[cursor..cursor + 2].copy_from_slice(&query.qtype.0.to_be_bytes());
    cursor += 2;

    buffer[cursor..cursor + 2].copy_from_slice(&query.qclass.0.to_be_bytes());

    Ok(buffer)
}

pub fn create_ptr_packet(ip_addr: &IpAddr, id: u16) -> anyhow::Result<Vec<u8>> {
    create_query_packet(&ip::reverse_address_to_ptr(ip_addr), DnsTypes::PTR, id)
}

fn encode_dns_name(name: &str) -> Vec<u8> {
    let mut encoded: Vec<u8> = Vec::new();
    for label in name.split('.') {
        if label.is_empty() {
            continue;
        }
        encoded.push(label.len() as u8);
        encoded.extend_from_slice(label.as_bytes());
    }
    encoded.push(0);
    encoded
}

/// First `nameserver` line of a resolv.conf.
pub fn parse_resolv_conf(text: &str) -> Option<IpAddr> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .find_map(|line| {
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (Some("nameserver"), Some(addr)) => addr.split('%').next()?.parse().ok(),
                _ => None,
            }
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolver {
    pub nameserver: SocketAddr,
    pub timeout: Duration,
}

impl Resolver {
    pub fn new(nameserver: SocketAddr, timeout: Duration) -> Self {
        Self {
            nameserver,
            timeout,
        }
    }

    /// Uses the first nameserver in `/etc/resolv.conf`, or `1.1.1.1`.
    pub fn system() -> Self {
        let nameserver = std::fs::read_to_string(RESOLV_CONF)
            .ok()
            .and_then(|text| parse_resolv_conf(&text))
            .unwrap_or(FALLBACK_NAMESERVER);
        Self::new(SocketAddr::new(nameserver, DNS_PORT), Duration::from_secs(5))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// A and AAAA records of `host`. Unanswered queries contribute nothing.
    pub async fn lookup(&self, host: &str) -> anyhow::Result<Vec<IpAddr>> {
        let socket = self.socket().await?;
        let mut addresses: Vec<IpAddr> = Vec::new();

        for qtype in [DnsTypes::A, DnsTypes::AAAA] {
            if let Some(answer) = self.query(&socket, host, qtype).await? {
                addresses.extend(answer.addresses);
            }
        }

        Ok(addresses)
    }

    pub async fn reverse_lookup(&self, addr: &IpAddr) -> anyhow::Result<Option<String>> {
        let socket = self.socket().await?;
        let name = ip::reverse_address_to_ptr(addr);
        let answer = self.query(&socket, &name, DnsTypes::PTR).await?;
        Ok(answer.and_then(|answer| answer.hostnames.into_iter().next()))
    }

    async fn socket(&self) -> anyhow::Result<UdpSocket> {
        let local: SocketAddr = match self.nameserver {
            SocketAddr::V4(_) => "0.0.0.0:0".parse()?,
            SocketAddr::V6(_) => "[::]:0".parse()?,
        };
        let socket = UdpSocket::bind(local).await.context("binding resolver socket")?;
        socket
            .connect(self.nameserver)
            .await
            .with_context(|| format!("connecting to nameserver {}", self.nameserver))?;
        Ok(socket)
    }

    /// Sends one question and waits for the response carrying its id.
    async fn query(
        &self,
        socket: &UdpSocket,
        name: &str,
        qtype: DnsType,
    ) -> anyhow::Result<Option<DnsAnswer>> {
        let id: u16 = rand::random();
        let packet = create_query_packet(name, qtype, id)?;
        socket.send(&packet).await.context("sending DNS query")?;

        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; 4096];
        loop {
            let len = match timeout_at(deadline, socket.recv(&mut buf)).await {
                Ok(received) => received.context("receiving DNS response")?,
                Err(_elapsed) => {
                    debug!("no answer for {name} from {}", self.nameserver);
                    return Ok(None);
                }
            };
            match parse_response(&buf[..len]) {
                Ok(answer) if answer.id == id => return Ok(Some(answer)),
                Ok(answer) => debug!("ignoring DNS response with id {}", answer.id),
                Err(e) => debug!("ignoring malformed DNS response: {e:#}"),
            }
        }
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
