//! # Pattern Catalogue
//!
//! Precompiled regular expressions for things that show up in recon output,
//! logs and source code: addresses, host names, paths, hashes, credentials.
//!
//! The patterns find candidates. Where a strict parser exists (e.g.
//! [`std::net::IpAddr`]) validate the match with it afterwards.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const OCTET_SRC: &str = r"(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])";
const HEXTET_SRC: &str = r"[0-9a-fA-F]{1,4}";
const HOST_LABEL_SRC: &str = r"[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?";

fn ipv4_src() -> String {
    format!(r"{OCTET_SRC}(?:\.{OCTET_SRC}){{3}}")
}

/// IPv6 alternatives ordered so the form with the most trailing hextets is
/// tried first; the engine is leftmost-first, not longest-match.
fn ipv6_src() -> String {
    let h = HEXTET_SRC;
    let v4 = ipv4_src();
    [
        format!(r"(?:{h}:){{6}}{v4}"),
        format!(r"::(?:[fF]{{4}}:)?{v4}"),
        format!(r"(?:{h}:){{7}}{h}"),
        format!(r"{h}:(?::{h}){{1,6}}"),
        format!(r"(?:{h}:){{1,2}}(?::{h}){{1,5}}"),
        format!(r"(?:{h}:){{1,3}}(?::{h}){{1,4}}"),
        format!(r"(?:{h}:){{1,4}}(?::{h}){{1,3}}"),
        format!(r"(?:{h}:){{1,5}}(?::{h}){{1,2}}"),
        format!(r"(?:{h}:){{1,6}}:{h}"),
        format!(r":(?::{h}){{1,7}}"),
        format!(r"(?:{h}:){{1,7}}:"),
        "::".to_string(),
    ]
    .join("|")
}

fn compile(src: &str) -> Regex {
    Regex::new(src).expect("pattern catalogue entries are valid regexes")
}

/// A single IPv4 octet (`0`-`255`).
pub static OCTET: Lazy<Regex> = Lazy::new(|| compile(&format!(r"\b{OCTET_SRC}\b")));

pub static IPV4_ADDR: Lazy<Regex> = Lazy::new(|| compile(&format!(r"\b{}\b", ipv4_src())));

pub static IPV6_ADDR: Lazy<Regex> = Lazy::new(|| compile(&format!(r"(?:{})", ipv6_src())));

/// IPv6 first so IPv4-embedded forms such as `::ffff:1.2.3.4` match whole.
pub static IP_ADDR: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(r"(?:{})|\b{}\b", ipv6_src(), ipv4_src()))
});

pub static MAC_ADDR: Lazy<Regex> = Lazy::new(|| {
    compile(r"\b[0-9a-fA-F]{2}(?:[:-][0-9a-fA-F]{2}){5}\b")
});

pub static HOST_NAME: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(r"\b(?:{HOST_LABEL_SRC}\.)+[A-Za-z]{{2,63}}\b"))
});

/// A registrable domain: one label plus a TLD, or a label plus a two-level ccTLD.
pub static DOMAIN: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"\b{HOST_LABEL_SRC}\.(?:[A-Za-z]{{2,3}}\.[A-Za-z]{{2}}|[A-Za-z]{{2,63}})\b"
    ))
});

pub static EMAIL_ADDR: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"\b[A-Za-z0-9._%+\-]+@(?:{HOST_LABEL_SRC}\.)+[A-Za-z]{{2,63}}\b"
    ))
});

/// Emails written as `user [at] example [dot] com`, `user(at)example(dot)com`, etc.
pub static OBFUSCATED_EMAIL_ADDR: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?i)\b[a-z0-9._%+\-]+\s*[\[\(\{<]?\s*(?:at|@)\s*[\]\)\}>]?\s*[a-z0-9\-]+(?:\s*[\[\(\{<]?\s*(?:dot|\.)\s*[\]\)\}>]?\s*[a-z0-9\-]+)+\b",
    )
});

/// North-American style numbers: `555-1234`, `(555) 555-1234`, `+1 555.555.1234`.
pub static PHONE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"(?:\+\d{1,3}[\s.\-]?)?(?:\(\d{3}\)\s?|\b\d{3}[\s.\-])?\b\d{3}[\s.\-]\d{4}\b",
    )
});

pub static URI_SCHEME: Lazy<Regex> = Lazy::new(|| compile(r"\b[A-Za-z][A-Za-z0-9+.\-]*://"));

pub static URL: Lazy<Regex> = Lazy::new(|| {
    compile(r#"\b[A-Za-z][A-Za-z0-9+.\-]*://[^\s'"<>()\[\]{}]+"#)
});

pub static FILE_EXT: Lazy<Regex> = Lazy::new(|| compile(r"\.[A-Za-z0-9]{1,10}\b"));

pub static FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    compile(r"\b[A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*\.[A-Za-z0-9]{1,10}\b")
});

pub static DIR_NAME: Lazy<Regex> = Lazy::new(|| compile(r"(?:\.\.|\.|[A-Za-z0-9_\-. ]+)/"));

pub static RELATIVE_UNIX_PATH: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?:\.\.?/)+(?:[A-Za-z0-9_\-.]+/)*[A-Za-z0-9_\-.]*")
});

pub static ABSOLUTE_UNIX_PATH: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?:^|[\s'\x22(=])(/(?:[A-Za-z0-9_\-.]+/?)+)")
});

pub static UNIX_PATH: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?:\.\.?/|/)(?:[A-Za-z0-9_\-.]+/?)+")
});

pub static RELATIVE_WINDOWS_PATH: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?:\.\.?\\)+(?:[A-Za-z0-9_\-. ]+\\)*[A-Za-z0-9_\-.]*")
});

pub static ABSOLUTE_WINDOWS_PATH: Lazy<Regex> = Lazy::new(|| {
    compile(r"\b[A-Za-z]:\\(?:[A-Za-z0-9_\-. ]+\\)*[A-Za-z0-9_\-.]*")
});

pub static WINDOWS_PATH: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?:\b[A-Za-z]:\\|\\\\[A-Za-z0-9_.$\-]+\\|\.\.?\\)(?:[A-Za-z0-9_\-. ]+\\)*[A-Za-z0-9_\-.]*")
});

pub static PATH: Lazy<Regex> = Lazy::new(|| {
    compile(&format!("(?:{})|(?:{})", WINDOWS_PATH.as_str(), UNIX_PATH.as_str()))
});

pub static MD5: Lazy<Regex> = Lazy::new(|| compile(r"\b[0-9a-fA-F]{32}\b"));
pub static SHA1: Lazy<Regex> = Lazy::new(|| compile(r"\b[0-9a-fA-F]{40}\b"));
pub static SHA256: Lazy<Regex> = Lazy::new(|| compile(r"\b[0-9a-fA-F]{64}\b"));
pub static SHA512: Lazy<Regex> = Lazy::new(|| compile(r"\b[0-9a-fA-F]{128}\b"));

pub static HASH: Lazy<Regex> = Lazy::new(|| {
    compile(r"\b(?:[0-9a-fA-F]{128}|[0-9a-fA-F]{64}|[0-9a-fA-F]{40}|[0-9a-fA-F]{32})\b")
});

pub static IDENTIFIER: Lazy<Regex> = Lazy::new(|| compile(r"\b[_A-Za-z][_A-Za-z0-9]*\b"));

pub static UUID: Lazy<Regex> = Lazy::new(|| {
    compile(r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b")
});

pub static AWS_ACCESS_KEY_ID: Lazy<Regex> = Lazy::new(|| {
    compile(r"\b(?:AKIA|ASIA|AGPA|AIDA|AROA|ANPA|ANVA)[A-Z0-9]{16}\b")
});

pub static PRIVATE_KEY: Lazy<Regex> = Lazy::new(|| {
    compile(r"-----BEGIN (?:[A-Z]+ )?PRIVATE KEY-----[\s\S]+?-----END (?:[A-Z]+ )?PRIVATE KEY-----")
});

pub static SSH_PUBLIC_KEY: Lazy<Regex> = Lazy::new(|| {
    compile(r"\b(?:ssh-(?:rsa|dss|ed25519)|ecdsa-sha2-nistp(?:256|384|521)) [A-Za-z0-9+/]+={0,3}")
});

/// Named handle on the catalogue, for selecting a pattern from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Octet,
    Ipv4Addr,
    Ipv6Addr,
    IpAddr,
    MacAddr,
    HostName,
    Domain,
    EmailAddr,
    ObfuscatedEmailAddr,
    PhoneNumber,
    Url,
    UriScheme,
    FileExt,
    FileName,
    DirName,
    RelativeUnixPath,
    AbsoluteUnixPath,
    UnixPath,
    RelativeWindowsPath,
    AbsoluteWindowsPath,
    WindowsPath,
    Path,
    Md5,
    Sha1,
    Sha256,
    Sha512,
    Hash,
    Identifier,
    Uuid,
    AwsAccessKeyId,
    PrivateKey,
    SshPublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pattern '{0}'")]
pub struct PatternError(pub String);

impl Pattern {
    pub const ALL: &'static [Pattern] = &[
        Pattern::Octet,
        Pattern::Ipv4Addr,
        Pattern::Ipv6Addr,
        Pattern::IpAddr,
        Pattern::MacAddr,
        Pattern::HostName,
        Pattern::Domain,
        Pattern::EmailAddr,
        Pattern::ObfuscatedEmailAddr,
        Pattern::PhoneNumber,
        Pattern::Url,
        Pattern::UriScheme,
        Pattern::FileExt,
        Pattern::FileName,
        Pattern::DirName,
        Pattern::RelativeUnixPath,
        Pattern::AbsoluteUnixPath,
        Pattern::UnixPath,
        Pattern::RelativeWindowsPath,
        Pattern::AbsoluteWindowsPath,
        Pattern::WindowsPath,
        Pattern::Path,
        Pattern::Md5,
        Pattern::Sha1,
        Pattern::Sha256,
        Pattern::Sha512,
        Pattern::Hash,
        Pattern::Identifier,
        Pattern::Uuid,
        Pattern::AwsAccessKeyId,
        Pattern::PrivateKey,
        Pattern::SshPublicKey,
    ];

    pub fn regex(self) -> &'static Regex {
        match self {
            Pattern::Octet => &OCTET,
            Pattern::Ipv4Addr => &IPV4_ADDR,
            Pattern::Ipv6Addr => &IPV6_ADDR,
            Pattern::IpAddr => &IP_ADDR,
            Pattern::MacAddr => &MAC_ADDR,
            Pattern::HostName => &HOST_NAME,
            Pattern::Domain => &DOMAIN,
            Pattern::EmailAddr => &EMAIL_ADDR,
            Pattern::ObfuscatedEmailAddr => &OBFUSCATED_EMAIL_ADDR,
            Pattern::PhoneNumber => &PHONE_NUMBER,
            Pattern::Url => &URL,
            Pattern::UriScheme => &URI_SCHEME,
            Pattern::FileExt => &FILE_EXT,
            Pattern::FileName => &FILE_NAME,
            Pattern::DirName => &DIR_NAME,
            Pattern::RelativeUnixPath => &RELATIVE_UNIX_PATH,
            Pattern::AbsoluteUnixPath => &ABSOLUTE_UNIX_PATH,
            Pattern::UnixPath => &UNIX_PATH,
            Pattern::RelativeWindowsPath => &RELATIVE_WINDOWS_PATH,
            Pattern::AbsoluteWindowsPath => &ABSOLUTE_WINDOWS_PATH,
            Pattern::WindowsPath => &WINDOWS_PATH,
            Pattern::Path => &PATH,
            Pattern::Md5 => &MD5,
            Pattern::Sha1 => &SHA1,
            Pattern::Sha256 => &SHA256,
            Pattern::Sha512 => &SHA512,
            Pattern::Hash => &HASH,
            Pattern::Identifier => &IDENTIFIER,
            Pattern::Uuid => &UUID,
            Pattern::AwsAccessKeyId => &AWS_ACCESS_KEY_ID,
            Pattern::PrivateKey => &PRIVATE_KEY,
            Pattern::SshPublicKey => &SSH_PUBLIC_KEY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pattern::Octet => "octet",
            Pattern::Ipv4Addr => "ipv4",
            Pattern::Ipv6Addr => "ipv6",
            Pattern::IpAddr => "ip",
            Pattern::MacAddr => "mac",
            Pattern::HostName => "hostname",
            Pattern::Domain => "domain",
            Pattern::EmailAddr => "email",
            Pattern::ObfuscatedEmailAddr => "obfuscated-email",
            Pattern::PhoneNumber => "phone",
            Pattern::Url => "url",
            Pattern::UriScheme => "uri-scheme",
            Pattern::FileExt => "file-ext",
            Pattern::FileName => "file-name",
            Pattern::DirName => "dir-name",
            Pattern::RelativeUnixPath => "relative-unix-path",
            Pattern::AbsoluteUnixPath => "absolute-unix-path",
            Pattern::UnixPath => "unix-path",
            Pattern::RelativeWindowsPath => "relative-windows-path",
            Pattern::AbsoluteWindowsPath => "absolute-windows-path",
            Pattern::WindowsPath => "windows-path",
            Pattern::Path => "path",
            Pattern::Md5 => "md5",
            Pattern::Sha1 => "sha1",
            Pattern::Sha256 => "sha256",
            Pattern::Sha512 => "sha512",
            Pattern::Hash => "hash",
            Pattern::Identifier => "identifier",
            Pattern::Uuid => "uuid",
            Pattern::AwsAccessKeyId => "aws-access-key-id",
            Pattern::PrivateKey => "private-key",
            Pattern::SshPublicKey => "ssh-public-key",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Pattern::ALL
            .iter()
            .copied()
            .find(|pattern| pattern.name() == wanted)
            .ok_or_else(|| PatternError(s.to_string()))
    }
}

/// Every match of `pattern` in `text`, in order.
pub fn find_all<'t>(pattern: &Regex, text: &'t str) -> Vec<&'t str> {
    pattern.find_iter(text).map(|m| m.as_str()).collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
