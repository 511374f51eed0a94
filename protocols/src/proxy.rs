//! # Man-in-the-middle Proxies
//!
//! [`TcpProxy`] and [`UdpProxy`] sit between clients and one upstream server
//! and hand every chunk of traffic to a [`ProxyHandler`] before relaying it.
//! The handler may rewrite the bytes in place and decides what happens to
//! them through the returned [`Action`].
//!
//! Each proxy runs one event loop. Per-connection reader tasks only push
//! events into a channel, so the handler is never called concurrently and
//! needs no locking.

pub mod tcp;
pub mod udp;

use std::net::SocketAddr;

use anyhow::Context;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub use tcp::TcpProxy;
pub use udp::UdpProxy;

const BUFFER_SIZE: usize = 16 * 1024;

/// What to do with a chunk of traffic (or a new client).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Relay the (possibly modified) data.
    #[default]
    Forward,
    /// Drop the data, keep the connection.
    Ignore,
    /// Close both sides of the connection.
    Close,
    /// Close both sides, resetting TCP connections instead of a clean FIN.
    Reset,
}

/// Callbacks invoked from the proxy loop. Every method defaults to a no-op
/// that forwards traffic unchanged.
pub trait ProxyHandler: Send {
    fn on_client_connect(&mut self, _client: SocketAddr) -> Action {
        Action::Forward
    }

    fn on_client_data(&mut self, _client: SocketAddr, _data: &mut Vec<u8>) -> Action {
        Action::Forward
    }

    fn on_server_data(&mut self, _client: SocketAddr, _data: &mut Vec<u8>) -> Action {
        Action::Forward
    }

    fn on_client_disconnect(&mut self, _client: SocketAddr) {}

    fn on_server_disconnect(&mut self, _client: SocketAddr) {}
}

/// Relays everything untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl ProxyHandler for Passthrough {}

/// Which end of a proxied connection an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Client,
    Server,
}

/// A proxy running in the background. Dropping the handle also stops it.
pub struct ProxyHandle<H> {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<anyhow::Result<H>>,
}

impl<H> ProxyHandle<H> {
    pub(crate) fn new(
        local_addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        task: JoinHandle<anyhow::Result<H>>,
    ) -> Self {
        Self {
            local_addr,
            shutdown: Some(shutdown),
            task,
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting, closes every connection and returns the handler.
    pub async fn stop(mut self) -> anyhow::Result<H> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        (&mut self.task).await.context("proxy task failed")?
    }
}

/// Resolves once the handle asks for shutdown or is dropped.
pub(crate) async fn shutdown_signal(rx: oneshot::Receiver<()>) {
    let _ = rx.await;
}
