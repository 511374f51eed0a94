use std::net::IpAddr;
use std::time::Duration;

use colored::*;
use ronin_common::config::Config;
use ronin_common::network::target::IpTarget;
use ronin_common::{print_info, print_warning};
use ronin_support::network::{asn, public_suffix};
use ronin_support::protocols::{dns::Resolver, tcp, udp};
use tracing::debug;

use crate::terminal::{colors, format, print, spinner};

/// Address count across `targets`, saturating at `u128::MAX`.
fn total_addresses(targets: &[IpTarget]) -> u128 {
    targets
        .iter()
        .fold(0u128, |acc, target| acc.saturating_add(target.size()))
}

pub fn ips(targets: &[IpTarget]) -> anyhow::Result<()> {
    let total = total_addresses(targets);
    debug!("expanding {} targets into {total} addresses", targets.len());

    for target in targets {
        for ip in target.iter() {
            print::print(&ip.to_string());
        }
    }
    Ok(())
}

pub async fn suffix(hosts: &[String], config: &Config) -> anyhow::Result<()> {
    let list = spinner::spin_while(
        "Loading public suffix list",
        public_suffix::List::load(config),
    )
    .await?;

    for (idx, host) in hosts.iter().enumerate() {
        print::tree_head(idx, host);
        match list.split(host) {
            Ok((name, suffix)) => {
                let domain = list.domain(host)?;
                print::as_tree_one_level(&[
                    ("name".to_string(), name.normal()),
                    ("suffix".to_string(), suffix.color(colors::ACCENT)),
                    ("domain".to_string(), domain.normal()),
                ]);
            }
            Err(e) => print_warning!("{e}"),
        }
    }
    Ok(())
}

pub async fn asn(ips: &[IpAddr], config: &Config) -> anyhow::Result<()> {
    let spinner = spinner::start("Checking ASN list");
    let loaded = async {
        if asn::List::update(config).await? {
            debug!("downloaded a fresh ASN list");
        }
        spinner.set_message("Parsing ASN list".to_string());
        asn::List::load(config).await
    }
    .await;
    spinner.finish();
    let list = loaded?;

    for (idx, ip) in ips.iter().enumerate() {
        print::tree_head(idx, &ip.to_string());
        let Some(record) = list.ip(ip) else {
            print_info!("{ip} is not in any announced range");
            continue;
        };

        let mut pairs = vec![("range".to_string(), record.range.to_string().normal())];
        if record.routed() {
            pairs.push(("AS".to_string(), record.number.to_string().color(colors::ACCENT)));
        } else {
            pairs.push(("AS".to_string(), "not routed".dimmed()));
        }
        if let Some(code) = &record.country_code {
            pairs.push(("country".to_string(), code.normal()));
        }
        if let Some(name) = &record.name {
            pairs.push(("name".to_string(), name.normal()));
        }
        print::as_tree_one_level(&pairs);
    }
    Ok(())
}

pub async fn open(host: &str, port: u16, udp: bool, timeout: Duration) -> anyhow::Result<()> {
    let protocol = if udp { "udp" } else { "tcp" };
    let state = if udp {
        udp::is_open(host, port, timeout).await?
    } else {
        tcp::is_open(host, port, timeout).await?
    };

    let status = match state {
        Some(true) => "open".green(),
        Some(false) => "closed".red(),
        None if udp => "open|filtered".yellow(),
        None => "filtered".yellow(),
    };
    print::aligned_line(&format!("{host}:{port}/{protocol}"), status, 0);

    if udp || state != Some(true) {
        return Ok(());
    }
    match tcp::banner(host, port, timeout).await {
        Ok(banner) if !banner.trim().is_empty() => {
            print::aligned_line("banner", banner.trim(), 0);
        }
        Ok(_) => {}
        Err(e) => debug!("no banner from {host}:{port}: {e}"),
    }
    Ok(())
}

pub async fn dns(name: &str) -> anyhow::Result<()> {
    let resolver = Resolver::system();
    debug!("using nameserver {}", resolver.nameserver);

    if let Ok(ip) = name.parse::<IpAddr>() {
        match resolver.reverse_lookup(&ip).await? {
            Some(host) => print::aligned_line("PTR", host.color(colors::ACCENT), 0),
            None => print::no_results("PTR record"),
        }
        return Ok(());
    }

    let ips = resolver.lookup(name).await?;
    if ips.is_empty() {
        print::no_results("addresses");
        return Ok(());
    }
    print::tree_head(0, name);
    print::as_tree_one_level(&format::ips_to_key_value_pairs(&ips));
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

    fn targets(items: &[&str]) -> Vec<IpTarget> {
        items.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn counts_addresses() {
        assert_eq!(total_addresses(&targets(&["10.0.0.0/24", "10.0.1.1"])), 257);
    }

    #[test]
    fn whole_address_space_saturates() {
        assert_eq!(total_addresses(&targets(&["::/0", "::/0"])), u128::MAX);
    }
}
