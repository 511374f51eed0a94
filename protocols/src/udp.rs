use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::debug;

use crate::resolve_for;

pub const MAX_DATAGRAM: usize = 65_507;

fn unspecified_for(addr: &SocketAddr) -> SocketAddr {
    let ip: IpAddr = match addr {
        SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    SocketAddr::new(ip, 0)
}

/// A socket bound to `local` (or an ephemeral port) and connected to `host:port`.
pub async fn connect(host: &str, port: u16, local: Option<SocketAddr>) -> anyhow::Result<UdpSocket> {
    let remote: SocketAddr = resolve_for(host, port, local).await?;
    let local: SocketAddr = local.unwrap_or_else(|| unspecified_for(&remote));

    let socket = UdpSocket::bind(local)
        .await
        .with_context(|| format!("binding {local}"))?;
    socket
        .connect(remote)
        .await
        .with_context(|| format!("connecting to {remote}"))?;

    debug!("udp {} -> {remote}", socket.local_addr()?);
    Ok(socket)
}

pub async fn send(data: &[u8], host: &str, port: u16) -> anyhow::Result<()> {
    let socket = connect(host, port, None).await?;
    socket.send(data).await.context("sending datagram")?;
    Ok(())
}

/// Sends an empty datagram and waits for anything back.
///
/// `Some(true)` on a reply, `Some(false)` when the host is unresolvable or
/// answered with ICMP port-unreachable, `None` on silence (open or filtered).
pub async fn is_open(host: &str, port: u16, probe_timeout: Duration) -> anyhow::Result<Option<bool>> {
    let socket = match connect(host, port, None).await {
        Ok(socket) => socket,
        Err(e) => {
            debug!("{host}:{port} closed: {e:#}");
            return Ok(Some(false));
        }
    };
    if let Err(e) = socket.send(&[]).await {
        debug!("{host}:{port} closed: {e}");
        return Ok(Some(false));
    }

    let mut buf = [0u8; 1];
    match timeout(probe_timeout, socket.recv(&mut buf)).await {
        Ok(Ok(_)) => Ok(Some(true)),
        Ok(Err(e)) => {
            debug!("{host}:{port} closed: {e}");
            Ok(Some(false))
        }
        Err(_elapsed) => Ok(None),
    }
}

/// Sends `payload` and returns the first datagram received in reply.
pub async fn banner(
    host: &str,
    port: u16,
    payload: &[u8],
    read_timeout: Duration,
) -> anyhow::Result<Vec<u8>> {
    let socket = connect(host, port, None).await?;
    socket.send(payload).await.context("sending payload")?;

    let mut buf = vec![0u8; MAX_DATAGRAM];
    let len = timeout(read_timeout, socket.recv(&mut buf))
        .await
        .context("timed out waiting for reply")?
        .context("receiving reply")?;
    buf.truncate(len);
    Ok(buf)
}

pub async fn server(addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let socket = UdpSocket::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    debug!("udp listening on {}", socket.local_addr()?);
    Ok(socket)
}

/// Receives one datagram of at most `max` bytes.
pub async fn recv(server: &UdpSocket, max: usize) -> anyhow::Result<(Vec<u8>, SocketAddr)> {
    let mut buf = vec![0u8; max];
    let (len, peer) = server.recv_from(&mut buf).await.context("receiving datagram")?;
    buf.truncate(len);
    Ok((buf, peer))
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

    async fn echo_server() -> u16 {
        let socket = server("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let port = socket.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let Ok((data, peer)) = recv(&socket, MAX_DATAGRAM).await else {
                    break;
                };
                let mut reply = b"echo:".to_vec();
                reply.extend(data);
                let _ = socket.send_to(&reply, peer).await;
            }
        });
        port
    }

    #[tokio::test]
    async fn banner_returns_reply() {
        let port = echo_server().await;
        let reply = banner("127.0.0.1", port, b"ping", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(reply, b"echo:ping");
    }

    #[tokio::test]
    async fn is_open_with_responder() {
        let port = echo_server().await;
        let state = is_open("127.0.0.1", port, Duration::from_secs(2)).await.unwrap();
        assert_eq!(state, Some(true));
    }

    #[tokio::test]
    async fn is_open_on_closed_port() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();
        drop(socket);

        let state = is_open("127.0.0.1", port, Duration::from_secs(2)).await.unwrap();
        assert_eq!(state, Some(false));
    }

    #[tokio::test]
    async fn is_open_on_unresolvable_host() {
        let state = is_open("no-such-host.invalid", 53, Duration::from_secs(2)).await.unwrap();
        assert_eq!(state, Some(false));
    }

    #[tokio::test]
    async fn send_and_recv() {
        let socket = server("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let port = socket.local_addr().unwrap().port();

        send(b"datagram", "127.0.0.1", port).await.unwrap();
        let (data, peer) = recv(&socket, 4).await.unwrap();
        assert_eq!(data, b"data");
        assert!(peer.ip().is_loopback());
    }
}
