use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::timeout;
use tracing::debug;

use crate::{resolve, resolve_for};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a connection, optionally from a fixed local address.
pub async fn connect(
    host: &str,
    port: u16,
    local: Option<SocketAddr>,
    connect_timeout: Duration,
) -> anyhow::Result<TcpStream> {
    let addr: SocketAddr = resolve_for(host, port, local).await?;

    let connecting = async {
        match local {
            Some(local) => {
                let socket = if addr.is_ipv4() {
                    TcpSocket::new_v4()?
                } else {
                    TcpSocket::new_v6()?
                };
                socket.bind(local)?;
                socket.connect(addr).await
            }
            None => TcpStream::connect(addr).await,
        }
    };

    let stream = timeout(connect_timeout, connecting)
        .await
        .with_context(|| format!("connecting to {addr} timed out"))?
        .with_context(|| format!("connecting to {addr}"))?;

    debug!("connected to {addr}");
    Ok(stream)
}

/// `Some(true)` when the port accepts, `Some(false)` when refused,
/// unreachable or unresolvable, `None` when nothing answered before
/// `probe_timeout`.
pub async fn is_open(host: &str, port: u16, probe_timeout: Duration) -> anyhow::Result<Option<bool>> {
    let addr: SocketAddr = match resolve(host, port).await {
        Ok(addr) => addr,
        Err(e) => {
            debug!("{host}:{port} closed: {e:#}");
            return Ok(Some(false));
        }
    };

    match timeout(probe_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => Ok(Some(true)),
        Ok(Err(e)) => {
            debug!("{addr} closed: {e}");
            Ok(Some(false))
        }
        Err(_elapsed) => Ok(None),
    }
}

pub async fn connect_and_send(host: &str, port: u16, data: &[u8]) -> anyhow::Result<TcpStream> {
    let mut stream = connect(host, port, None, DEFAULT_TIMEOUT).await?;
    stream.write_all(data).await.context("sending data")?;
    Ok(stream)
}

/// Connects, writes `data` and closes the connection.
pub async fn send(data: &[u8], host: &str, port: u16) -> anyhow::Result<()> {
    let mut stream = connect_and_send(host, port, data).await?;
    stream.shutdown().await.context("closing connection")?;
    Ok(())
}

/// Reads the first line the service sends, without the line terminator.
pub async fn banner(host: &str, port: u16, read_timeout: Duration) -> anyhow::Result<String> {
    let stream = connect(host, port, None, read_timeout).await?;
    read_banner(stream, read_timeout).await
}

pub(crate) async fn read_banner<R>(stream: R, read_timeout: Duration) -> anyhow::Result<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    timeout(read_timeout, reader.read_line(&mut line))
        .await
        .context("timed out waiting for banner")?
        .context("reading banner")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn server(addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    debug!("listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Binds `addr`, accepts exactly one client and closes the listener.
pub async fn accept(addr: SocketAddr) -> anyhow::Result<(TcpStream, SocketAddr)> {
    let listener = server(addr).await?;
    let (stream, peer) = listener.accept().await.context("accepting client")?;
    debug!("accepted {peer}");
    Ok((stream, peer))
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
    use tokio::io::AsyncReadExt;

    async fn loopback_listener() -> (TcpListener, u16) {
        let listener = server("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[tokio::test]
    async fn banner_reads_first_line() {
        let (listener, port) = loopback_listener().await;
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"SSH-2.0-ronin\r\nextra\r\n").await.unwrap();
        });

        let line = banner("127.0.0.1", port, Duration::from_secs(2)).await.unwrap();
        assert_eq!(line, "SSH-2.0-ronin");
    }

    #[tokio::test]
    async fn is_open_on_listening_port() {
        let (_listener, port) = loopback_listener().await;
        let state = is_open("127.0.0.1", port, Duration::from_secs(2)).await.unwrap();
        assert_eq!(state, Some(true));
    }

    #[tokio::test]
    async fn is_open_on_closed_port() {
        let (listener, port) = loopback_listener().await;
        drop(listener);
        let state = is_open("127.0.0.1", port, Duration::from_secs(2)).await.unwrap();
        assert_eq!(state, Some(false));
    }

    #[tokio::test]
    async fn is_open_on_unresolvable_host() {
        let state = is_open("no-such-host.invalid", 80, Duration::from_secs(2)).await.unwrap();
        assert_eq!(state, Some(false));
    }

    #[tokio::test]
    async fn send_delivers_data() {
        let (listener, port) = loopback_listener().await;
        let reader = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            stream.read_to_end(&mut received).await.unwrap();
            received
        });

        send(b"hello", "127.0.0.1", port).await.unwrap();
        assert_eq!(reader.await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn connect_from_local_address() {
        let (listener, port) = loopback_listener().await;
        let local: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let client = connect("127.0.0.1", port, Some(local), DEFAULT_TIMEOUT)
            .await
            .unwrap();
        let (_server, peer) = listener.accept().await.unwrap();
        assert_eq!(client.local_addr().unwrap(), peer);
    }

    #[tokio::test]
    async fn accept_takes_one_client() {
        let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = probe.local_addr().unwrap();
        drop(probe);

        let server = tokio::spawn(async move { accept(addr).await.unwrap() });
        let mut client = loop {
            if let Ok(stream) = TcpStream::connect(addr).await {
                break stream;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        };
        client.write_all(b"x").await.unwrap();

        let (mut stream, peer) = server.await.unwrap();
        assert_eq!(peer, client.local_addr().unwrap());
        let mut byte = [0u8; 1];
        stream.read_exact(&mut byte).await.unwrap();
        assert_eq!(&byte, b"x");
    }
}
