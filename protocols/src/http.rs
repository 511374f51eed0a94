use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use reqwest::header::{ALLOW, HeaderMap, HeaderName, HeaderValue, SERVER};
use reqwest::{Client, Method, Response};
use ronin_common::config::Config;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown HTTP request method '{0}'")]
pub struct UnknownRequest(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Copy,
    Delete,
    Get,
    Head,
    Lock,
    Mkcol,
    Move,
    Options,
    Patch,
    Post,
    Propfind,
    Proppatch,
    Put,
    Trace,
    Unlock,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 15] = [
        HttpMethod::Copy,
        HttpMethod::Delete,
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Lock,
        HttpMethod::Mkcol,
        HttpMethod::Move,
        HttpMethod::Options,
        HttpMethod::Patch,
        HttpMethod::Post,
        HttpMethod::Propfind,
        HttpMethod::Proppatch,
        HttpMethod::Put,
        HttpMethod::Trace,
        HttpMethod::Unlock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Copy => "COPY",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Lock => "LOCK",
            HttpMethod::Mkcol => "MKCOL",
            HttpMethod::Move => "MOVE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Post => "POST",
            HttpMethod::Propfind => "PROPFIND",
            HttpMethod::Proppatch => "PROPPATCH",
            HttpMethod::Put => "PUT",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Unlock => "UNLOCK",
        }
    }

    pub fn to_method(self) -> Method {
        match self {
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Get => Method::GET,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Trace => Method::TRACE,
            // WebDAV verbs are plain tokens, always valid.
            other => Method::from_bytes(other.as_str().as_bytes()).unwrap_or(Method::GET),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = UnknownRequest;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownRequest(s.to_string()))
    }
}

/// Parses an `Allow` header, skipping methods outside [`HttpMethod`].
pub fn parse_allow(header: &str) -> Vec<HttpMethod> {
    header
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse::<HttpMethod>() {
            Ok(method) => Some(method),
            Err(e) => {
                warn!("{e}");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout + config.connect_timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    /// Wraps an already configured `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(config: &Config, timeout: Duration) -> anyhow::Result<Self> {
        Self::new(&config.clone().with_timeout(timeout))
    }

    pub async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<Response> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name '{name}'"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid value for header '{name}'"))?;
            header_map.append(name, value);
        }

        let mut request = self.client.request(method.to_method(), url).headers(header_map);
        if let Some(body) = body {
            request = request.body(body);
        }

        debug!("{method} {url}");
        request
            .send()
            .await
            .with_context(|| format!("{method} {url}"))
    }

    /// Status code of a `HEAD` request.
    pub async fn status(&self, url: &str) -> anyhow::Result<u16> {
        let response = self.request(HttpMethod::Head, url, &[], None).await?;
        Ok(response.status().as_u16())
    }

    pub async fn is_ok(&self, url: &str) -> anyhow::Result<bool> {
        Ok(self.status(url).await? == 200)
    }

    pub async fn get_body(&self, url: &str) -> anyhow::Result<String> {
        let response = self.request(HttpMethod::Get, url, &[], None).await?;
        response.text().await.context("reading response body")
    }

    pub async fn header(&self, url: &str, name: &str) -> anyhow::Result<Option<String>> {
        let response = self.request(HttpMethod::Head, url, &[], None).await?;
        Ok(response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string))
    }

    pub async fn server_header(&self, url: &str) -> anyhow::Result<Option<String>> {
        self.header(url, SERVER.as_str()).await
    }

    pub async fn powered_by_header(&self, url: &str) -> anyhow::Result<Option<String>> {
        self.header(url, "x-powered-by").await
    }

    /// Methods listed in the `Allow` header of an `OPTIONS` response.
    pub async fn allowed_methods(&self, url: &str) -> anyhow::Result<Vec<HttpMethod>> {
        let response = self.request(HttpMethod::Options, url, &[], None).await?;
        Ok(response
            .headers()
            .get(ALLOW)
            .and_then(|value| value.to_str().ok())
            .map(parse_allow)
            .unwrap_or_default())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
