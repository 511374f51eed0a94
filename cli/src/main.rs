mod commands;
mod terminal;

use std::time::Duration;

use commands::{CommandLine, Commands, network, proxy, text, web};
use ronin_common::config::Config;
use ronin_common::terminal::ansi;
use terminal::{print, spinner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    if commands.no_color {
        ansi::disable();
    }
    spinner::init_logging(commands.verbose)?;

    let cfg = Config::from_env()?;

    match commands.command {
        Commands::Ips { targets } => network::ips(&targets),
        Commands::Fuzz {
            text: input,
            rules,
            mutate,
        } => text::fuzz(&input, rules, mutate),
        Commands::Suffix { hosts } => {
            print::header("public suffixes");
            network::suffix(&hosts, &cfg).await
        }
        Commands::Asn { ips } => {
            print::header("autonomous systems");
            network::asn(&ips, &cfg).await
        }
        Commands::Open {
            host,
            port,
            udp,
            timeout,
        } => network::open(&host, port, udp, Duration::from_secs(timeout)).await,
        Commands::Proxy {
            listen,
            upstream,
            udp,
            hexdump,
        } => {
            print::header("starting proxy");
            proxy::proxy(listen, &upstream, udp, hexdump).await
        }
        Commands::Hash { algorithm, text: input } => text::hash(algorithm, &input),
        Commands::Grep { pattern, file } => text::grep(pattern, &file),
        Commands::Dns { name } => {
            print::header("dns");
            network::dns(&name).await
        }
        Commands::Http { url } => {
            print::header("http");
            web::http(&url, &cfg).await
        }
        Commands::Version { range, versions } => text::version(&range, &versions),
    }
}
