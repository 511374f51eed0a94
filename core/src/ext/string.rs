use std::borrow::Cow;
use std::net::IpAddr;
use std::str::Utf8Error;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::{Captures, Regex};
use ronin_common::text::patterns::{self, EMAIL_ADDR};
use ronin_common::utils::ip::extract_ips;

/// RFC 3986 unreserved characters stay as they are.
const URI_RESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

static HTML_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid entity regex")
});

pub trait StringExt {
    fn common_prefix<'a>(&'a self, other: &str) -> &'a str;
    fn common_suffix<'a>(&'a self, other: &str) -> &'a str;
    /// What is left of `self` once the prefix and suffix shared with
    /// `other` are removed.
    fn uncommon_substring<'a>(&'a self, other: &str) -> &'a str;
    /// Every substring at least `min` characters long, by start position
    /// then length.
    fn each_substring(&self, min: usize) -> Vec<&str>;
    fn random_case(&self) -> String;

    fn hex_encode(&self) -> String;
    fn hex_decode(&self) -> Result<Vec<u8>, hex::FromHexError>;
    fn base64_encode(&self) -> String;
    fn base64_decode(&self) -> Result<Vec<u8>, base64::DecodeError>;
    fn uri_encode(&self) -> String;
    fn uri_decode(&self) -> Result<String, Utf8Error>;
    fn html_escape(&self) -> String;
    fn html_unescape(&self) -> String;
    /// C string literal body: `\n`, `\t`, `\"` and friends, `\xNN` for
    /// other non-printable bytes.
    fn c_escape(&self) -> String;

    /// Inserts `data` before the first match of `pattern`.
    fn insert_before(&self, pattern: &Regex, data: &str) -> String;
    /// Inserts `data` after the first match of `pattern`.
    fn insert_after(&self, pattern: &Regex, data: &str) -> String;

    fn ips(&self) -> Vec<IpAddr>;
    fn emails(&self) -> Vec<&str>;
}

impl StringExt for str {
    fn common_prefix<'a>(&'a self, other: &str) -> &'a str {
        let len = self
            .char_indices()
            .zip(other.chars())
            .find(|((_, a), b)| a != b)
            .map(|((index, _), _)| index)
            .unwrap_or_else(|| {
                // One is a prefix of the other.
                let shorter = other.chars().count().min(self.chars().count());
                self.char_indices().nth(shorter).map_or(self.len(), |(i, _)| i)
            });
        &self[..len]
    }

    fn common_suffix<'a>(&'a self, other: &str) -> &'a str {
        let len: usize = self
            .chars()
            .rev()
            .zip(other.chars().rev())
            .take_while(|(a, b)| a == b)
            .map(|(c, _)| c.len_utf8())
            .sum();
        &self[self.len() - len..]
    }

    fn uncommon_substring<'a>(&'a self, other: &str) -> &'a str {
        let prefix = self.common_prefix(other).len();
        let rest = &self[prefix..];
        let other_rest = other.get(prefix..).unwrap_or("");
        let suffix = rest.common_suffix(other_rest).len();
        &rest[..rest.len() - suffix]
    }

    fn each_substring(&self, min: usize) -> Vec<&str> {
        let bounds: Vec<usize> = self
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(self.len()))
            .collect();
        let min = min.max(1);

        let mut substrings = Vec::new();
        for (start_index, &start) in bounds.iter().enumerate() {
            for &end in bounds.iter().skip(start_index + min) {
                substrings.push(&self[start..end]);
            }
        }
        substrings
    }

    fn random_case(&self) -> String {
        self.chars()
            .map(|c| {
                if rand::random::<bool>() {
                    c.to_uppercase().collect::<String>()
                } else {
                    c.to_lowercase().collect::<String>()
                }
            })
            .collect()
    }

    fn hex_encode(&self) -> String {
        hex::encode(self)
    }

    fn hex_decode(&self) -> Result<Vec<u8>, hex::FromHexError> {
        let digits = self.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);
        hex::decode(digits)
    }

    fn base64_encode(&self) -> String {
        STANDARD.encode(self)
    }

    fn base64_decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.trim())
    }

    fn uri_encode(&self) -> String {
        utf8_percent_encode(self, URI_RESERVED).to_string()
    }

    fn uri_decode(&self) -> Result<String, Utf8Error> {
        percent_decode_str(self).decode_utf8().map(Cow::into_owned)
    }

    fn html_escape(&self) -> String {
        let mut out = String::with_capacity(self.len());
        for c in self.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                c => out.push(c),
            }
        }
        out
    }

    fn html_unescape(&self) -> String {
        HTML_ENTITY
            .replace_all(self, |caps: &Captures| {
                let entity = &caps[1];
                let decoded = match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some('\u{a0}'),
                    _ => entity
                        .strip_prefix("#x")
                        .or_else(|| entity.strip_prefix("#X"))
                        .map(|hex| u32::from_str_radix(hex, 16))
                        .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                        .and_then(Result::ok)
                        .and_then(char::from_u32),
                };
                decoded.map_or_else(|| caps[0].to_string(), String::from)
            })
            .into_owned()
    }

    fn c_escape(&self) -> String {
        let mut out = String::with_capacity(self.len());
        for byte in self.bytes() {
            match byte {
                b'\n' => out.push_str("\\n"),
                b'\r' => out.push_str("\\r"),
                b'\t' => out.push_str("\\t"),
                b'\0' => out.push_str("\\0"),
                0x07 => out.push_str("\\a"),
                0x08 => out.push_str("\\b"),
                0x0b => out.push_str("\\v"),
                0x0c => out.push_str("\\f"),
                0x1b => out.push_str("\\e"),
                b'\\' => out.push_str("\\\\"),
                b'"' => out.push_str("\\\""),
                0x20..=0x7e => out.push(byte as char),
                _ => out.push_str(&format!("\\x{byte:02x}")),
            }
        }
        out
    }

    fn insert_before(&self, pattern: &Regex, data: &str) -> String {
        match pattern.find(self) {
            Some(found) => [&self[..found.start()], data, &self[found.start()..]].concat(),
            None => self.to_string(),
        }
    }

    fn insert_after(&self, pattern: &Regex, data: &str) -> String {
        match pattern.find(self) {
            Some(found) => [&self[..found.end()], data, &self[found.end()..]].concat(),
            None => self.to_string(),
        }
    }

    fn ips(&self) -> Vec<IpAddr> {
        extract_ips(self)
    }

    fn emails(&self) -> Vec<&str> {
        patterns::find_all(&EMAIL_ADDR, self)
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
