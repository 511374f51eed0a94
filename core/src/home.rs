//! Cached dataset downloads under [`Config::cache_dir`].

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Context;
use reqwest::Client;
use ronin_common::config::Config;
use tracing::{debug, info};

pub fn cache_path(config: &Config, file_name: &str) -> PathBuf {
    config.cache_path(file_name)
}

/// Missing files, and files whose modification time is `max_age` or more in
/// the past, are stale.
pub fn is_stale(path: &Path, max_age: Duration) -> bool {
    let Ok(modified) = path.metadata().and_then(|meta| meta.modified()) else {
        return true;
    };
    match SystemTime::now().duration_since(modified) {
        Ok(age) => age >= max_age,
        // Modified in the future: clock skew, treat as fresh.
        Err(_) => false,
    }
}

pub fn client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .connect_timeout(config.connect_timeout)
        .build()
        .context("building download client")
}

pub async fn download(config: &Config, url: &str, path: &Path) -> anyhow::Result<()> {
    download_with(&client(config)?, url, path).await
}

/// Fetches `url` into a temp file next to `path`, then renames it into place
/// so readers never observe a partial file.
pub async fn download_with(client: &Client, url: &str, path: &Path) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    debug!("GET {url}");
    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()
        .with_context(|| format!("downloading {url}"))?
        .bytes()
        .await
        .with_context(|| format!("reading {url}"))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).context("creating temp file")?;
    tmp.write_all(&body).context("writing download")?;
    tmp.persist(path)
        .with_context(|| format!("moving download to {}", path.display()))?;

    info!("downloaded {url} ({} bytes) to {}", body.len(), path.display());
    Ok(())
}

/// Downloads `url` to `path` when the cached copy is missing or stale.
/// Returns whether a download happened.
pub async fn update(config: &Config, url: &str, path: &Path) -> anyhow::Result<bool> {
    if !is_stale(path, config.max_age) {
        debug!("{} is fresh", path.display());
        return Ok(false);
    }
    download(config, url, path).await?;
    Ok(true)
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
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn staleness() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        assert!(is_stale(&path, Duration::from_secs(3600)));

        std::fs::write(&path, "x").unwrap();
        assert!(!is_stale(&path, Duration::from_secs(3600)));
        assert!(is_stale(&path, Duration::ZERO));
    }

    #[test]
    fn cache_path_is_under_cache_dir() {
        let config = Config::default().with_cache_dir("/tmp/ronin-cache");
        assert_eq!(
            cache_path(&config, "asn.tsv"),
            PathBuf::from("/tmp/ronin-cache/asn.tsv")
        );
    }

    async fn serve_once(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/list.txt")
    }

    #[tokio::test]
    async fn download_writes_file() {
        let url = serve_once("1.0.0.0\t1.0.0.255\t13335\tUS\tCLOUDFLARENET\n").await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("list.txt");

        let client = Client::builder().no_proxy().build().unwrap();
        download_with(&client, &url, &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("1.0.0.0\t"));
        assert!(!is_stale(&path, Duration::from_secs(60)));
    }
}
