#![cfg(test)]
use ronin_support::crypto::{Cert, Key, KeyAlgorithm};
use ronin_support::protocols::tls::{self, TlsOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn serve(cert: &Cert, key: &Key, greeting: &'static [u8]) -> u16 {
    let config = tls::server_config(cert.to_pem().as_bytes(), key.to_pem().as_bytes()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            // Plain TCP probes fail the handshake; keep serving.
            let Ok((mut stream, _)) = tls::accept(&listener, config.clone()).await else {
                continue;
            };
            tokio::spawn(async move {
                let _ = stream.write_all(greeting).await;
                let _ = stream.flush().await;
                let mut buf = [0u8; 64];
                let _ = stream.read(&mut buf).await;
            });
        }
    });
    port
}

fn options() -> TlsOptions {
    TlsOptions {
        server_name: Some("ronin.test".to_string()),
        ..TlsOptions::insecure()
    }
}

#[tokio::test]
async fn generated_certificate_serves_tls() {
    let key = Key::generate(KeyAlgorithm::EcdsaP256).unwrap();
    let cert = Cert::self_signed("ronin.test", &key).unwrap();
    let port = serve(&cert, &key, b"* OK IMAP4rev1 ready\r\n").await;

    let banner = tls::banner("127.0.0.1", port, &options()).await.unwrap();
    assert_eq!(banner, "* OK IMAP4rev1 ready");
}

#[tokio::test]
async fn reloaded_key_still_matches_certificate() {
    let key = Key::generate(KeyAlgorithm::EcdsaP384).unwrap();
    let cert = Cert::self_signed("ronin.test", &key).unwrap();

    let key = Key::from_pem(key.to_pem()).unwrap();
    let cert = Cert::from_pem(cert.to_pem()).unwrap();
    assert_eq!(key.algorithm(), KeyAlgorithm::EcdsaP384);

    let port = serve(&cert, &key, b"hello\n").await;
    assert_eq!(tls::is_open("127.0.0.1", port, &options()).await.unwrap(), Some(true));
}

#[tokio::test]
async fn verifying_client_rejects_generated_certificate() {
    let key = Key::generate(KeyAlgorithm::EcdsaP256).unwrap();
    let cert = Cert::self_signed("ronin.test", &key).unwrap();
    let port = serve(&cert, &key, b"hello\n").await;

    let strict = TlsOptions {
        server_name: Some("ronin.test".to_string()),
        ..TlsOptions::default()
    };
    assert!(tls::connect("127.0.0.1", port, &strict).await.is_err());
    assert_eq!(tls::is_open("127.0.0.1", port, &strict).await.unwrap(), Some(false));
}
