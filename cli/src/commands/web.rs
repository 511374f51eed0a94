use colored::*;
use ronin_common::config::Config;
use ronin_support::protocols::http::HttpClient;

use crate::terminal::{colors, print};

pub async fn http(url: &str, config: &Config) -> anyhow::Result<()> {
    let client = HttpClient::new(config)?;

    let status = client.status(url).await?;
    let status = match status {
        200..=299 => status.to_string().green(),
        300..=399 => status.to_string().yellow(),
        _ => status.to_string().red(),
    };

    let mut pairs = vec![("status".to_string(), status)];
    if let Some(server) = client.server_header(url).await? {
        pairs.push(("server".to_string(), server.color(colors::ACCENT)));
    }
    if let Some(powered_by) = client.powered_by_header(url).await? {
        pairs.push(("powered by".to_string(), powered_by.color(colors::ACCENT)));
    }

    let methods = client.allowed_methods(url).await?;
    if !methods.is_empty() {
        let methods: Vec<&str> = methods.iter().map(|method| method.as_str()).collect();
        pairs.push(("allow".to_string(), methods.join(", ").normal()));
    }

    print::tree_head(0, url);
    print::as_tree_one_level(&pairs);
    Ok(())
}
