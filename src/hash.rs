//! The named hash functions a SCRAM mechanism can be instantiated with,
//! together with the keyed-hash and key-derivation primitives built on them.

use std::fmt;
use std::str::FromStr;

use digest::Digest;
use hmac::{Hmac, Mac};

use crate::error::Error;

/// The fixed set of hash functions understood by [`Scram`](crate::Scram).
///
/// An algorithm is selected by name; parsing is case-insensitive and ignores
/// hyphens, so `SHA-256`, `sha256` and `Sha-256` all select
/// [`HashAlgorithm::Sha256`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md2,
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

/// Expands to `$body` with `$d` aliased to the digest type selected by
/// `$algorithm`.
macro_rules! with_hash {
    ($algorithm:expr, $d:ident => $body:expr) => {
        match $algorithm {
            HashAlgorithm::Md2 => {
                type $d = md2::Md2;
                $body
            }
            HashAlgorithm::Md5 => {
                type $d = md5::Md5;
                $body
            }
            HashAlgorithm::Sha1 => {
                type $d = sha1::Sha1;
                $body
            }
            HashAlgorithm::Sha224 => {
                type $d = sha2::Sha224;
                $body
            }
            HashAlgorithm::Sha256 => {
                type $d = sha2::Sha256;
                $body
            }
            HashAlgorithm::Sha384 => {
                type $d = sha2::Sha384;
                $body
            }
            HashAlgorithm::Sha512 => {
                type $d = sha2::Sha512;
                $body
            }
        }
    };
}

impl HashAlgorithm {
    /// Every supported algorithm, in the order of the registered SCRAM
    /// mechanism family.
    pub const ALL: [HashAlgorithm; 7] = [
        HashAlgorithm::Md2,
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha224,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// The RFC-style display name, e.g. `SHA-256`.
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Md2 => "MD2",
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA-1",
            HashAlgorithm::Sha224 => "SHA-224",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// The digest length in bytes.
    pub fn output_len(self) -> usize {
        with_hash!(self, D => <D as Digest>::output_size())
    }

    /// Computes the unkeyed digest of `data`.
    pub fn hash(self, data: &[u8]) -> Vec<u8> {
        with_hash!(self, D => <D as Digest>::digest(data).to_vec())
    }

    /// Computes `HMAC(key, data)`.
    pub fn hmac(self, key: &[u8], data: &[u8]) -> Vec<u8> {
        with_hash!(self, D => {
            let mut mac =
                Hmac::<D>::new_from_slice(key).expect("HMAC is able to accept all key sizes");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        })
    }

    /// The `Hi` key derivation of RFC 5802: PBKDF2 restricted to a single
    /// output block, with HMAC over this algorithm as the pseudo-random
    /// function.
    ///
    /// `U1 = HMAC(secret, salt || 0x00000001)`, `Uk = HMAC(secret, U(k-1))`,
    /// and the result is the XOR of `U1..U_iterations`. An iteration count
    /// of 1 yields `U1` unchanged. `iterations` must be at least 1; the cost
    /// grows linearly with it, so callers validate server-supplied counts
    /// before invoking this.
    pub fn derive(self, secret: &[u8], salt: &[u8], iterations: u32) -> Vec<u8> {
        with_hash!(self, D => {
            // One key schedule; each round clones the keyed state instead of
            // re-deriving it.
            let keyed =
                Hmac::<D>::new_from_slice(secret).expect("HMAC is able to accept all key sizes");

            let mut mac = keyed.clone();
            mac.update(salt);
            mac.update(&1u32.to_be_bytes());
            let mut last = mac.finalize().into_bytes();

            let mut output = last.clone();
            for _ in 1..iterations {
                let mut mac = keyed.clone();
                mac.update(&last);
                last = mac.finalize().into_bytes();
                for (output_byte, last_byte) in output.iter_mut().zip(&last) {
                    *output_byte ^= last_byte;
                }
            }
            output.to_vec()
        })
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(name: &str) -> Result<HashAlgorithm, Error> {
        let mut normalized = name.replace('-', "");
        normalized.make_ascii_lowercase();
        match normalized.as_str() {
            "md2" => Ok(HashAlgorithm::Md2),
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(Error::UnsupportedAlgorithm(name.to_string())),
        }
    }
}
