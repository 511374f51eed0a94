//! TLS clients and servers over `tokio-rustls`.
//!
//! Clients verify against the bundled Mozilla roots by default. Setting
//! [`TlsOptions::verify`] to `false` accepts any certificate, which is what
//! you usually want against test services with self-signed certificates.

use std::io::BufReader;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{Context, anyhow, bail};
use rustls::client::{ServerCertVerified, ServerCertVerifier};
use rustls::{
    Certificate, ClientConfig, OwnedTrustAnchor, PrivateKey, RootCertStore, ServerConfig,
    ServerName,
};
use rustls_pemfile::Item;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_rustls::{TlsAcceptor, TlsConnector, client, server};
use tracing::debug;

use crate::tcp;

#[derive(Debug, Clone)]
pub struct TlsOptions {
    pub verify: bool,
    /// SNI and verification name; defaults to the host being connected to.
    pub server_name: Option<String>,
    /// Extra PEM bundle trusted in addition to the built-in roots.
    pub ca_file: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            verify: true,
            server_name: None,
            ca_file: None,
            timeout: tcp::DEFAULT_TIMEOUT,
        }
    }
}

impl TlsOptions {
    pub fn insecure() -> Self {
        Self {
            verify: false,
            ..Self::default()
        }
    }
}

struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

fn root_store(options: &TlsOptions) -> anyhow::Result<RootCertStore> {
    let mut roots = RootCertStore::empty();
    roots.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|ta| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            ta.subject,
            ta.spki,
            ta.name_constraints,
        )
    }));

    if let Some(path) = &options.ca_file {
        let pem = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        for cert in parse_certificates(&pem)? {
            roots
                .add(&cert)
                .with_context(|| format!("adding CA from {}", path.display()))?;
        }
    }

    Ok(roots)
}

pub fn client_config(options: &TlsOptions) -> anyhow::Result<Arc<ClientConfig>> {
    let builder = ClientConfig::builder().with_safe_defaults();

    let config = if options.verify {
        builder
            .with_root_certificates(root_store(options)?)
            .with_no_client_auth()
    } else {
        builder
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
            .with_no_client_auth()
    };

    Ok(Arc::new(config))
}

pub async fn connect(
    host: &str,
    port: u16,
    options: &TlsOptions,
) -> anyhow::Result<client::TlsStream<TcpStream>> {
    let config = client_config(options)?;
    let name = options.server_name.as_deref().unwrap_or(host);
    let server_name = ServerName::try_from(name)
        .map_err(|_| anyhow!("'{name}' is not a valid TLS server name"))?;

    let tcp = tcp::connect(host, port, None, options.timeout).await?;
    let stream = timeout(options.timeout, TlsConnector::from(config).connect(server_name, tcp))
        .await
        .context("TLS handshake timed out")?
        .with_context(|| format!("TLS handshake with {host}:{port}"))?;

    debug!("tls established with {host}:{port}");
    Ok(stream)
}

/// Like [`tcp::is_open`], but the handshake must also succeed.
pub async fn is_open(host: &str, port: u16, options: &TlsOptions) -> anyhow::Result<Option<bool>> {
    match tcp::is_open(host, port, options.timeout).await? {
        Some(true) => Ok(Some(connect(host, port, options).await.is_ok())),
        other => Ok(other),
    }
}

pub async fn banner(host: &str, port: u16, options: &TlsOptions) -> anyhow::Result<String> {
    let stream = connect(host, port, options).await?;
    tcp::read_banner(stream, options.timeout).await
}

pub async fn send(
    data: &[u8],
    host: &str,
    port: u16,
    options: &TlsOptions,
) -> anyhow::Result<client::TlsStream<TcpStream>> {
    let mut stream = connect(host, port, options).await?;
    stream.write_all(data).await.context("sending data")?;
    stream.flush().await?;
    Ok(stream)
}

pub fn parse_certificates(pem: &[u8]) -> anyhow::Result<Vec<Certificate>> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(pem)).context("parsing certificates")?;
    if certs.is_empty() {
        bail!("no certificates found in PEM data");
    }
    Ok(certs.into_iter().map(Certificate).collect())
}

pub fn parse_private_key(pem: &[u8]) -> anyhow::Result<PrivateKey> {
    for item in rustls_pemfile::read_all(&mut BufReader::new(pem)).context("parsing private key")? {
        match item {
            Item::PKCS8Key(der) | Item::RSAKey(der) | Item::ECKey(der) => {
                return Ok(PrivateKey(der));
            }
            _ => continue,
        }
    }
    bail!("no private key found in PEM data")
}

pub fn server_config(cert_pem: &[u8], key_pem: &[u8]) -> anyhow::Result<Arc<ServerConfig>> {
    let certs = parse_certificates(cert_pem)?;
    let key = parse_private_key(key_pem)?;

    let config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("building TLS server config")?;

    Ok(Arc::new(config))
}

/// Accepts one client from `listener` and completes the handshake.
pub async fn accept(
    listener: &TcpListener,
    config: Arc<ServerConfig>,
) -> anyhow::Result<(server::TlsStream<TcpStream>, SocketAddr)> {
    let (tcp, peer) = listener.accept().await.context("accepting client")?;
    let stream = TlsAcceptor::from(config)
        .accept(tcp)
        .await
        .with_context(|| format!("TLS handshake with {peer}"))?;
    debug!("tls accepted {peer}");
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
