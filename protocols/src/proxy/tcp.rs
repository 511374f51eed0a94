use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{Action, BUFFER_SIZE, ProxyHandle, ProxyHandler, Side, shutdown_signal};

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

type ConnId = u64;

enum Event {
    Data(ConnId, Side, Vec<u8>),
    Closed(ConnId, Side),
}

struct Pair {
    client_addr: SocketAddr,
    client: OwnedWriteHalf,
    server: OwnedWriteHalf,
    readers: [JoinHandle<()>; 2],
}

impl Pair {
    fn writer(&mut self, side: Side) -> &mut OwnedWriteHalf {
        match side {
            Side::Client => &mut self.client,
            Side::Server => &mut self.server,
        }
    }

    async fn close(mut self) {
        for reader in &self.readers {
            reader.abort();
        }
        let _ = self.client.shutdown().await;
        let _ = self.server.shutdown().await;
    }

    /// Aborts both connections with SO_LINGER 0 so the peers see a RST.
    #[allow(deprecated)]
    fn reset(self) {
        for reader in &self.readers {
            reader.abort();
        }
        for writer in [self.client, self.server] {
            let _ = writer.as_ref().set_linger(Some(Duration::ZERO));
            writer.forget();
        }
    }
}

pub struct TcpProxy {
    listen: SocketAddr,
    upstream: SocketAddr,
    listener: Option<TcpListener>,
}

impl TcpProxy {
    pub fn new(listen: SocketAddr, upstream: SocketAddr) -> Self {
        Self {
            listen,
            upstream,
            listener: None,
        }
    }

    pub fn upstream(&self) -> SocketAddr {
        self.upstream
    }

    /// Binds the listening socket; returns the bound address (useful with port 0).
    pub async fn bind(&mut self) -> anyhow::Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }
        let listener = TcpListener::bind(self.listen)
            .await
            .with_context(|| format!("binding proxy on {}", self.listen))?;
        let addr = listener.local_addr()?;
        debug!("tcp proxy listening on {addr} -> {}", self.upstream);
        self.listener = Some(listener);
        Ok(addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Relays until an accept error; returns the handler afterwards.
    pub async fn run<H: ProxyHandler>(mut self, handler: H) -> anyhow::Result<H> {
        self.bind().await?;
        self.serve(handler, std::future::pending()).await
    }

    /// Runs the proxy in a background task.
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
        let Some(listener) = self.listener else {
            bail!("proxy is not bound");
        };
        let upstream = self.upstream;

        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        let mut pairs: HashMap<ConnId, Pair> = HashMap::new();
        let mut next_id: ConnId = 0;

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => {
                    let (client, client_addr) = accepted.context("accepting client")?;
                    let id = next_id;
                    next_id += 1;

                    match handler.on_client_connect(client_addr) {
                        Action::Forward | Action::Ignore => {}
                        Action::Close => continue,
                        Action::Reset => {
                            #[allow(deprecated)]
                            let _ = client.set_linger(Some(Duration::ZERO));
                            continue;
                        }
                    }

                    match open_pair(id, client, client_addr, upstream, &tx).await {
                        Ok(pair) => {
                            debug!("proxying {client_addr} -> {upstream}");
                            pairs.insert(id, pair);
                        }
                        Err(e) => {
                            warn!("dropping {client_addr}: {e:#}");
                            handler.on_server_disconnect(client_addr);
                        }
                    }
                }
                Some(event) = rx.recv() => match event {
                    Event::Data(id, from, mut data) => {
                        let Some(pair) = pairs.get_mut(&id) else { continue };
                        let client_addr = pair.client_addr;
                        let action = match from {
                            Side::Client => handler.on_client_data(client_addr, &mut data),
                            Side::Server => handler.on_server_data(client_addr, &mut data),
                        };
                        match action {
                            Action::Forward => {
                                let to = match from {
                                    Side::Client => Side::Server,
                                    Side::Server => Side::Client,
                                };
                                let written = pair.writer(to).write_all(&data).await;
                                if let Err(e) = written {
                                    debug!("write to {to:?} of {client_addr} failed: {e}");
                                    if let Some(pair) = pairs.remove(&id) {
                                        pair.close().await;
                                    }
                                }
                            }
                            Action::Ignore => {}
                            Action::Close => {
                                if let Some(pair) = pairs.remove(&id) {
                                    pair.close().await;
                                }
                            }
                            Action::Reset => {
                                if let Some(pair) = pairs.remove(&id) {
                                    pair.reset();
                                }
                            }
                        }
                    }
                    Event::Closed(id, side) => {
                        let Some(pair) = pairs.remove(&id) else { continue };
                        match side {
                            Side::Client => handler.on_client_disconnect(pair.client_addr),
                            Side::Server => handler.on_server_disconnect(pair.client_addr),
                        }
                        pair.close().await;
                    }
                },
            }
        }

        for (_, pair) in pairs.drain() {
            pair.close().await;
        }

        Ok(handler)
    }
}

async fn open_pair(
    id: ConnId,
    client: TcpStream,
    client_addr: SocketAddr,
    upstream: SocketAddr,
    tx: &mpsc::UnboundedSender<Event>,
) -> anyhow::Result<Pair> {
    let server = timeout(UPSTREAM_TIMEOUT, TcpStream::connect(upstream))
        .await
        .with_context(|| format!("connecting to {upstream} timed out"))?
        .with_context(|| format!("connecting to {upstream}"))?;

    let (client_read, client_write) = client.into_split();
    let (server_read, server_write) = server.into_split();

    Ok(Pair {
        client_addr,
        client: client_write,
        server: server_write,
        readers: [
            spawn_reader(id, Side::Client, client_read, tx.clone()),
            spawn_reader(id, Side::Server, server_read, tx.clone()),
        ],
    })
}

fn spawn_reader(
    id: ConnId,
    side: Side,
    mut read: OwnedReadHalf,
    tx: mpsc::UnboundedSender<Event>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = vec![0u8; BUFFER_SIZE];
        loop {
            match read.read(&mut buf).await {
                Ok(0) | Err(_) => {
                    let _ = tx.send(Event::Closed(id, side));
                    break;
                }
                Ok(n) => {
                    if tx.send(Event::Data(id, side, buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
            }
        }
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
