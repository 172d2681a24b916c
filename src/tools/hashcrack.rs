use anyhow::{bail, Result};
use clap::ValueEnum;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_512};

/// Digest algorithms the cracker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashAlgo {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    #[value(name = "sha3-224")]
    Sha3_224,
    #[value(name = "sha3-256")]
    Sha3_256,
    #[value(name = "sha3-512")]
    Sha3_512,
}

impl HashAlgo {
    /// Digest width in hex characters, used to validate the target up front.
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgo::Md5 => 32,
            HashAlgo::Sha1 => 40,
            HashAlgo::Sha224 | HashAlgo::Sha3_224 => 56,
            HashAlgo::Sha256 | HashAlgo::Sha3_256 => 64,
            HashAlgo::Sha384 => 96,
            HashAlgo::Sha512 | HashAlgo::Sha3_512 => 128,
        }
    }
}

/// Lowercase hex digest of `data` under `algo`.
pub fn digest_hex(algo: HashAlgo, data: &[u8]) -> String {
    match algo {
        HashAlgo::Md5 => hex::encode(Md5::digest(data)),
        HashAlgo::Sha1 => hex::encode(Sha1::digest(data)),
        HashAlgo::Sha224 => hex::encode(Sha224::digest(data)),
        HashAlgo::Sha256 => hex::encode(Sha256::digest(data)),
        HashAlgo::Sha384 => hex::encode(Sha384::digest(data)),
        HashAlgo::Sha512 => hex::encode(Sha512::digest(data)),
        HashAlgo::Sha3_224 => hex::encode(Sha3_224::digest(data)),
        HashAlgo::Sha3_256 => hex::encode(Sha3_256::digest(data)),
        HashAlgo::Sha3_512 => hex::encode(Sha3_512::digest(data)),
    }
}

/// Normalize and sanity-check the target hash before any work starts.
pub fn normalize_target(algo: HashAlgo, target: &str) -> Result<String> {
    let target = target.trim().to_ascii_lowercase();
    if target.len() != algo.hex_len() {
        bail!(
            "target hash is {} hex chars, {:?} digests are {}",
            target.len(),
            algo,
            algo.hex_len()
        );
    }
    if !target.bytes().all(|b| b.is_ascii_hexdigit()) {
        bail!("target hash contains non-hex characters");
    }
    Ok(target)
}

/// Default brute-force charset: letters and digits.
pub fn default_charset() -> Vec<char> {
    ('a'..='z').chain('A'..='Z').chain('0'..='9').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests() {
        assert_eq!(
            digest_hex(HashAlgo::Md5, b""),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            digest_hex(HashAlgo::Md5, b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            digest_hex(HashAlgo::Sha1, b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            digest_hex(HashAlgo::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn target_validation() {
        let ok = normalize_target(HashAlgo::Md5, "D41D8CD98F00B204E9800998ECF8427E").unwrap();
        assert_eq!(ok, "d41d8cd98f00b204e9800998ecf8427e");

        assert!(normalize_target(HashAlgo::Md5, "abc123").is_err());
        assert!(normalize_target(HashAlgo::Sha1, &"z".repeat(40)).is_err());
    }

    #[test]
    fn default_charset_is_alphanumeric() {
        let cs = default_charset();
        assert_eq!(cs.len(), 62);
        assert!(cs.contains(&'a') && cs.contains(&'Z') && cs.contains(&'9'));
    }
}
