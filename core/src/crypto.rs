//! # Crypto
//!
//! Digests, HMAC and authenticated encryption over `ring` and the RustCrypto
//! hashes, key and certificate generation over `rcgen`, and a couple of
//! classical ciphers for CTF-style puzzles.

pub mod cert;
pub mod cipher;
pub mod classic;
pub mod digest;

use thiserror::Error;

pub use cert::{Cert, Key, KeyAlgorithm, load_certs};
pub use cipher::{Cipher, CipherAlgorithm};
pub use classic::{rot, xor};
pub use digest::{DigestAlgorithm, HmacAlgorithm, digest, hexdigest, hmac, hmac_verify};

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("unknown algorithm '{0}'")]
    UnknownAlgorithm(String),
    #[error("encryption failed")]
    Encrypt,
    #[error("decryption failed: wrong password or corrupted data")]
    Decrypt,
    #[error("ciphertext too short: {0} bytes")]
    Truncated(usize),
    #[error("random number generator failure")]
    Random,
    #[error("key error: {0}")]
    Key(#[from] rcgen::RcgenError),
    #[error("invalid PEM: {0}")]
    Pem(#[from] std::io::Error),
}
