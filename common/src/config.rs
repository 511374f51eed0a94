use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("ronin-support/", env!("CARGO_PKG_VERSION"));
pub const ASN_LIST_URL: &str = "https://iptoasn.com/data/ip2asn-combined.tsv.gz";
pub const PUBLIC_SUFFIX_LIST_URL: &str = "https://publicsuffix.org/list/public_suffix_list.dat";

const CACHE_DIR_NAME: &str = "ronin-support";
const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory where downloaded datasets are cached.
    pub cache_dir: PathBuf,
    /// Upper bound for establishing a connection.
    pub connect_timeout: Duration,
    /// Upper bound for waiting on a read (banners, UDP replies).
    pub read_timeout: Duration,
    /// Age after which a cached dataset is re-downloaded.
    pub max_age: Duration,
    pub user_agent: String,
    pub asn_url: String,
    pub public_suffix_url: String,
}

impl Default for Config {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(CACHE_DIR_NAME);

        Self {
            cache_dir,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            max_age: ONE_DAY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            asn_url: ASN_LIST_URL.to_string(),
            public_suffix_url: PUBLIC_SUFFIX_LIST_URL.to_string(),
        }
    }
}

impl Config {
    /// Builds the default configuration, then applies `RONIN_CACHE_DIR`,
    /// `RONIN_TIMEOUT` (seconds) and `RONIN_USER_AGENT`.
    pub fn from_env() -> anyhow::Result<Self> {
        let vars = std::env::vars().filter(|(key, _)| key.starts_with("RONIN_"));
        Self::default().with_overrides(vars)
    }

    fn with_overrides<I>(mut self, vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "RONIN_CACHE_DIR" => self.cache_dir = PathBuf::from(value),
                "RONIN_TIMEOUT" => {
                    let secs: u64 = value
                        .trim()
                        .parse()
                        .map_err(|e| anyhow::anyhow!("Invalid RONIN_TIMEOUT '{value}': {e}"))?;
                    self.connect_timeout = Duration::from_secs(secs);
                    self.read_timeout = Duration::from_secs(secs);
                }
                "RONIN_USER_AGENT" => self.user_agent = value,
                _ => {}
            }
        }
        Ok(self)
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.read_timeout = timeout;
        self
    }

    pub fn cache_path(&self, file_name: &str) -> PathBuf {
        self.cache_dir.join(file_name)
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
