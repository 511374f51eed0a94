#![cfg(test)]
use std::net::SocketAddr;
use std::time::Duration;

use ronin_support::protocols::proxy::{Action, Passthrough, ProxyHandler, TcpProxy, UdpProxy};
use ronin_support::protocols::{tcp, udp};

use crate::util::{greeting_server, loopback, udp_echo_server};

const TIMEOUT: Duration = Duration::from_secs(2);

/// Upper-cases server traffic and counts what it saw.
#[derive(Default)]
struct Shouter {
    clients: Vec<SocketAddr>,
    from_client: Vec<u8>,
}

impl ProxyHandler for Shouter {
    fn on_client_connect(&mut self, client: SocketAddr) -> Action {
        self.clients.push(client);
        Action::Forward
    }

    fn on_client_data(&mut self, _client: SocketAddr, data: &mut Vec<u8>) -> Action {
        self.from_client.extend_from_slice(data);
        Action::Forward
    }

    fn on_server_data(&mut self, _client: SocketAddr, data: &mut Vec<u8>) -> Action {
        data.make_ascii_uppercase();
        Action::Forward
    }
}

#[tokio::test]
async fn banner_through_tcp_proxy() {
    let upstream = greeting_server(b"220 ronin ready\r\n").await;
    let proxy = TcpProxy::new(loopback(), upstream)
        .start(Shouter::default())
        .await
        .unwrap();
    let port = proxy.local_addr().port();

    let banner = tcp::banner("127.0.0.1", port, TIMEOUT).await.unwrap();
    assert_eq!(banner, "220 RONIN READY");

    let shouter = proxy.stop().await.unwrap();
    assert_eq!(shouter.clients.len(), 1);
}

#[tokio::test]
async fn sent_data_reaches_handler() {
    let upstream = greeting_server(b"hi\n").await;
    let proxy = TcpProxy::new(loopback(), upstream)
        .start(Shouter::default())
        .await
        .unwrap();
    let port = proxy.local_addr().port();

    let stream = tcp::connect_and_send("127.0.0.1", port, b"hello").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    drop(stream);

    let shouter = proxy.stop().await.unwrap();
    assert_eq!(shouter.from_client, b"hello");
}

#[tokio::test]
async fn stopped_proxy_refuses_connections() {
    let upstream = greeting_server(b"hi\n").await;
    let proxy = TcpProxy::new(loopback(), upstream)
        .start(Passthrough)
        .await
        .unwrap();
    let port = proxy.local_addr().port();

    assert_eq!(tcp::is_open("127.0.0.1", port, TIMEOUT).await.unwrap(), Some(true));
    proxy.stop().await.unwrap();
    assert_eq!(tcp::is_open("127.0.0.1", port, TIMEOUT).await.unwrap(), Some(false));
}

#[tokio::test]
async fn udp_banner_through_proxy() {
    let upstream = udp_echo_server().await;
    let proxy = UdpProxy::new(loopback(), upstream)
        .start(Shouter::default())
        .await
        .unwrap();
    let port = proxy.local_addr().port();

    let reply = udp::banner("127.0.0.1", port, b"ping", TIMEOUT).await.unwrap();
    assert_eq!(reply, b"PING");

    let shouter = proxy.stop().await.unwrap();
    assert_eq!(shouter.from_client, b"ping");
    assert_eq!(shouter.clients.len(), 1);
}
