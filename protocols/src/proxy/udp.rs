use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, warn};

use super::{Action, ProxyHandle, ProxyHandler, shutdown_signal};
use crate::udp::MAX_DATAGRAM;

/// Sessions with no traffic in either direction for this long are closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);

enum Event {
    Reply(SocketAddr, Vec<u8>),
    Unreachable(SocketAddr),
}

/// Upstream socket dedicated to one client address.
struct Session {
    upstream: Arc<UdpSocket>,
    reader: JoinHandle<()>,
    last_seen: Instant,
}

impl Drop for Session {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

pub struct UdpProxy {
    listen: SocketAddr,
    upstream: SocketAddr,
    socket: Option<UdpSocket>,
    idle_timeout: Duration,
}

impl UdpProxy {
    pub fn new(listen: SocketAddr, upstream: SocketAddr) -> Self {
        Self {
            listen,
            upstream,
            socket: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Closes a client's session (and reports `on_client_disconnect`) after
    /// `idle_timeout` without datagrams in either direction.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn upstream(&self) -> SocketAddr {
        self.upstream
    }

    pub async fn bind(&mut self) -> anyhow::Result<SocketAddr> {
        if let Some(socket) = &self.socket {
            return Ok(socket.local_addr()?);
        }
        let socket = UdpSocket::bind(self.listen)
            .await
            .with_context(|| format!("binding proxy on {}", self.listen))?;
        let addr = socket.local_addr()?;
        debug!("udp proxy listening on {addr} -> {}", self.upstream);
        self.socket = Some(socket);
        Ok(addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    pub async fn run<H: ProxyHandler>(mut self, handler: H) -> anyhow::Result<H> {
        self.bind().await?;
        self.serve(handler, std::future::pending()).await
    }

    pub async fn start<H>(mut self, handler: H) -> anyhow::Result<ProxyHandle<H>>
    where
        H: ProxyHandler + 'static,
    {
        let local_addr = self.bind().await?;
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(self.serve(handler, shutdown_signal(rx)));
        Ok(ProxyHandle::new(local_addr, tx, task))
    }

    async fn serve<H, S>(self, mut handler: H, shutdown: S) -> anyhow::Result<H>
    where
        H: ProxyHandler,
        S: Future<Output = ()>,
    {
        let Some(socket) = self.socket else {
            bail!("proxy is not bound");
        };
        let upstream = self.upstream;
        let idle_timeout = self.idle_timeout;

        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        let mut sessions: HashMap<SocketAddr, Session> = HashMap::new();
        let mut buf = vec![0u8; MAX_DATAGRAM];

        let mut sweep = interval((idle_timeout / 2).max(Duration::from_millis(10)));
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = sweep.tick() => {
                    let now = Instant::now();
                    let idle: Vec<SocketAddr> = sessions
                        .iter()
                        .filter(|(_, session)| now.duration_since(session.last_seen) >= idle_timeout)
                        .map(|(client, _)| *client)
                        .collect();
                    for client in idle {
                        debug!("udp session for {client} idle, closing");
                        sessions.remove(&client);
                        handler.on_client_disconnect(client);
                    }
                }
                received = socket.recv_from(&mut buf) => {
                    let (len, client) = match received {
                        Ok(received) => received,
                        // ICMP errors from earlier replies surface on the listening socket.
                        Err(e) if e.kind() == ErrorKind::ConnectionReset => continue,
                        Err(e) => return Err(e).context("receiving datagram"),
                    };
                    let mut data = buf[..len].to_vec();

                    if !sessions.contains_key(&client) {
                        match handler.on_client_connect(client) {
                            Action::Forward | Action::Ignore => {}
                            Action::Close | Action::Reset => continue,
                        }
                        match open_session(client, upstream, &tx).await {
                            Ok(session) => {
                                debug!("proxying {client} -> {upstream}");
                                sessions.insert(client, session);
                            }
                            Err(e) => {
                                warn!("dropping {client}: {e:#}");
                                continue;
                            }
                        }
                    }

                    if let Some(session) = sessions.get_mut(&client) {
                        session.last_seen = Instant::now();
                    }

                    match handler.on_client_data(client, &mut data) {
                        Action::Forward => {
                            let Some(session) = sessions.get(&client) else { continue };
                            if let Err(e) = session.upstream.send(&data).await {
                                debug!("forwarding for {client} failed: {e}");
                            }
                        }
                        Action::Ignore => {}
                        Action::Close | Action::Reset => {
                            sessions.remove(&client);
                            handler.on_client_disconnect(client);
                        }
                    }
                }
                Some(event) = rx.recv() => match event {
                    Event::Reply(client, mut data) => {
                        let Some(session) = sessions.get_mut(&client) else { continue };
                        session.last_seen = Instant::now();
                        match handler.on_server_data(client, &mut data) {
                            Action::Forward => {
                                if let Err(e) = socket.send_to(&data, client).await {
                                    debug!("replying to {client} failed: {e}");
                                }
                            }
                            Action::Ignore => {}
                            Action::Close | Action::Reset => {
                                sessions.remove(&client);
                                handler.on_server_disconnect(client);
                            }
                        }
                    }
                    Event::Unreachable(client) => {
                        if sessions.remove(&client).is_some() {
                            handler.on_server_disconnect(client);
                        }
                    }
                },
            }
        }

        Ok(handler)
    }
}

async fn open_session(
    client: SocketAddr,
    upstream: SocketAddr,
    tx: &mpsc::UnboundedSender<Event>,
) -> anyhow::Result<Session> {
    let local = match upstream {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    };
    let socket = UdpSocket::bind(local).await.context("binding upstream socket")?;
    socket
        .connect(upstream)
        .await
        .with_context(|| format!("connecting to {upstream}"))?;
    let upstream = Arc::new(socket);

    let reader = {
        let socket = Arc::clone(&upstream);
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM];
            loop {
                match socket.recv(&mut buf).await {
                    Ok(n) => {
                        if tx.send(Event::Reply(client, buf[..n].to_vec())).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        let _ = tx.send(Event::Unreachable(client));
                        break;
                    }
                }
            }
        })
    };

    Ok(Session {
        upstream,
        reader,
        last_seen: Instant::now(),
    })
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
    use crate::proxy::Passthrough;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn echo_server() -> SocketAddr {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            while let Ok((n, peer)) = socket.recv_from(&mut buf).await {
                let _ = socket.send_to(&buf[..n], peer).await;
            }
        });
        addr
    }

    async fn exchange(client: &UdpSocket, msg: &[u8]) -> Vec<u8> {
        client.send(msg).await.unwrap();
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let n = timeout(Duration::from_secs(2), client.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        buf[..n].to_vec()
    }

    async fn client_for(proxy: SocketAddr) -> UdpSocket {
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(proxy).await.unwrap();
        client
    }

    #[tokio::test]
    async fn passthrough_relays_datagrams() {
        let proxy = UdpProxy::new("127.0.0.1:0".parse().unwrap(), echo_server().await)
            .start(Passthrough)
            .await
            .unwrap();
        let client = client_for(proxy.local_addr()).await;
        assert_eq!(exchange(&client, b"ping").await, b"ping");
        proxy.stop().await.unwrap();
    }

    #[derive(Default)]
    struct Tagger {
        clients: Vec<SocketAddr>,
    }

    impl ProxyHandler for Tagger {
        fn on_client_connect(&mut self, client: SocketAddr) -> Action {
            self.clients.push(client);
            Action::Forward
        }

        fn on_server_data(&mut self, _client: SocketAddr, data: &mut Vec<u8>) -> Action {
            data.splice(0..0, b"proxied:".iter().copied());
            Action::Forward
        }
    }

    #[tokio::test]
    async fn one_session_per_client() {
        let proxy = UdpProxy::new("127.0.0.1:0".parse().unwrap(), echo_server().await)
            .start(Tagger::default())
            .await
            .unwrap();

        let first = client_for(proxy.local_addr()).await;
        let second = client_for(proxy.local_addr()).await;

        assert_eq!(exchange(&first, b"a").await, b"proxied:a");
        assert_eq!(exchange(&second, b"b").await, b"proxied:b");
        assert_eq!(exchange(&first, b"c").await, b"proxied:c");

        let handler = proxy.stop().await.unwrap();
        assert_eq!(
            handler.clients,
            vec![first.local_addr().unwrap(), second.local_addr().unwrap()]
        );
    }

    /// Answers every datagram with `size` bytes of `A`.
    async fn bulk_server(size: usize) -> SocketAddr {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let reply = vec![b'A'; size];
            while let Ok((_, peer)) = socket.recv_from(&mut buf).await {
                let _ = socket.send_to(&reply, peer).await;
            }
        });
        addr
    }

    #[tokio::test]
    async fn relays_large_replies_whole() {
        let proxy = UdpProxy::new("127.0.0.1:0".parse().unwrap(), bulk_server(20_000).await)
            .start(Passthrough)
            .await
            .unwrap();
        let client = client_for(proxy.local_addr()).await;

        let reply = exchange(&client, b"give").await;
        assert_eq!(reply.len(), 20_000);
        assert!(reply.iter().all(|&b| b == b'A'));
        proxy.stop().await.unwrap();
    }

    #[derive(Default)]
    struct Sessions {
        connects: usize,
        disconnects: usize,
    }

    impl ProxyHandler for Sessions {
        fn on_client_connect(&mut self, _client: SocketAddr) -> Action {
            self.connects += 1;
            Action::Forward
        }

        fn on_client_disconnect(&mut self, _client: SocketAddr) {
            self.disconnects += 1;
        }
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let proxy = UdpProxy::new("127.0.0.1:0".parse().unwrap(), echo_server().await)
            .with_idle_timeout(Duration::from_millis(100))
            .start(Sessions::default())
            .await
            .unwrap();
        let client = client_for(proxy.local_addr()).await;

        assert_eq!(exchange(&client, b"one").await, b"one");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(exchange(&client, b"two").await, b"two");

        let handler = proxy.stop().await.unwrap();
        assert_eq!(handler.connects, 2);
        assert_eq!(handler.disconnects, 1);
    }
}
