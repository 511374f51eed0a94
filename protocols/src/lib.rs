//! # Ronin Protocols
//!
//! Async networking helpers on top of `tokio`:
//!
//! * **[`tcp`]** / **[`udp`]**: connect, send, banner grabbing, port checks, servers.
//! * **[`tls`]**: `rustls` clients (optionally non-verifying) and servers.
//! * **[`proxy`]**: TCP and UDP man-in-the-middle relays with inspection callbacks.
//! * **[`dns`]**: minimal stub resolver (A, AAAA, PTR).
//! * **[`http`]**: request methods and header probes over `reqwest`.

pub mod dns;
pub mod http;
pub mod proxy;
pub mod tcp;
pub mod tls;
pub mod udp;

use std::net::SocketAddr;

use anyhow::Context;

/// Resolves `host:port` to the first address the system resolver returns.
pub async fn resolve(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("resolving {host}"))?
        .next()
        .with_context(|| format!("{host} has no addresses"))
}

/// Resolves `host:port`, preferring an address of the same family as `local`.
pub(crate) async fn resolve_for(
    host: &str,
    port: u16,
    local: Option<SocketAddr>,
) -> anyhow::Result<SocketAddr> {
    let Some(local) = local else {
        return resolve(host, port).await;
    };
    tokio::net::lookup_host((host, port))
        .await
        .with_context(|| format!("resolving {host}"))?
        .find(|addr| addr.is_ipv4() == local.is_ipv4())
        .with_context(|| format!("{host} has no address matching {local}"))
}
