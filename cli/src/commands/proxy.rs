use std::net::SocketAddr;

use anyhow::Context;
use colored::*;
use ronin_common::print_info;
use ronin_support::protocols::proxy::{Action, ProxyHandler, TcpProxy, UdpProxy};
use ronin_support::protocols::resolve;

use crate::terminal::{colors, format, print};

/// Prints every proxy event and forwards traffic unchanged.
pub struct Printer {
    hexdump: bool,
    connections: usize,
}

impl Printer {
    pub fn new(hexdump: bool) -> Self {
        Self {
            hexdump,
            connections: 0,
        }
    }

    fn render(&self, data: &[u8]) -> String {
        if self.hexdump {
            format::hexdump(data)
        } else {
            String::from_utf8_lossy(data).into_owned()
        }
    }

    fn traffic(&self, arrow: ColoredString, client: SocketAddr, data: &[u8]) {
        print::print(&format!(
            "{} {} ({} bytes)",
            arrow,
            client.to_string().color(colors::CLIENT),
            data.len()
        ));
        print::print(self.render(data).trim_end_matches('\n'));
    }
}

impl ProxyHandler for Printer {
    fn on_client_connect(&mut self, client: SocketAddr) -> Action {
        self.connections += 1;
        print::print_status(format!("{} connected", client.to_string().color(colors::CLIENT)));
        Action::Forward
    }

    fn on_client_data(&mut self, client: SocketAddr, data: &mut Vec<u8>) -> Action {
        self.traffic("──▶".color(colors::CLIENT), client, data);
        Action::Forward
    }

    fn on_server_data(&mut self, client: SocketAddr, data: &mut Vec<u8>) -> Action {
        self.traffic("◀──".color(colors::SERVER), client, data);
        Action::Forward
    }

    fn on_client_disconnect(&mut self, client: SocketAddr) {
        print::print_status(format!("{} disconnected", client.to_string().color(colors::CLIENT)));
    }

    fn on_server_disconnect(&mut self, client: SocketAddr) {
        print::print_status(format!(
            "{} for {} closed",
            "server".color(colors::SERVER),
            client.to_string().color(colors::CLIENT)
        ));
    }
}

fn split_host_port(upstream: &str) -> anyhow::Result<(&str, u16)> {
    let (host, port) = upstream
        .rsplit_once(':')
        .with_context(|| format!("'{upstream}' is not HOST:PORT"))?;
    let port: u16 = port
        .parse()
        .with_context(|| format!("invalid port in '{upstream}'"))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    Ok((host, port))
}

pub async fn proxy(listen: SocketAddr, upstream: &str, udp: bool, hexdump: bool) -> anyhow::Result<()> {
    let (host, port) = split_host_port(upstream)?;
    let upstream: SocketAddr = resolve(host, port).await?;
    let printer = Printer::new(hexdump);

    let protocol = if udp { "udp" } else { "tcp" };
    let handle = if udp {
        UdpProxy::new(listen, upstream).start(printer).await?
    } else {
        TcpProxy::new(listen, upstream).start(printer).await?
    };

    print_info!(
        "relaying {} {} -> {}, press Ctrl-C to stop",
        protocol,
        handle.local_addr(),
        upstream
    );

    tokio::signal::ctrl_c().await.context("waiting for Ctrl-C")?;
    let printer = handle.stop().await?;
    print::fat_separator();
    print_info!("proxy stopped after {} connections", printer.connections);
    Ok(())
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
    fn splits_upstream() {
        assert_eq!(split_host_port("example.com:80").unwrap(), ("example.com", 80));
        assert_eq!(split_host_port("[::1]:8080").unwrap(), ("::1", 8080));
        assert!(split_host_port("example.com").is_err());
        assert!(split_host_port("example.com:http").is_err());
    }

    #[test]
    fn printer_forwards_and_counts() {
        let mut printer = Printer::new(true);
        let client: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let mut data = b"ping".to_vec();

        assert_eq!(printer.on_client_connect(client), Action::Forward);
        assert_eq!(printer.on_client_data(client, &mut data), Action::Forward);
        assert_eq!(data, b"ping");
        assert_eq!(printer.connections, 1);
        assert!(printer.render(b"ping").starts_with("00000000  70 69 6e 67"));
    }
}
