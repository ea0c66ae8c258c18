//! Hash primitives over opaque byte sequences.
//!
//! Everything here is a pure function of its input. The chain-hash
//! convention is double SHA-256; single rounds and the address-style
//! RIPEMD160-over-SHA256 digest are provided for the surrounding indexer.

pub use bitcoin::hashes::{Hash, HashEngine, hash_newtype, hash160, sha256, sha256d};

/// Width in bytes of a chain digest.
pub const DIGEST_SIZE: usize = 32;

/// Width in bytes of a [`hash160`] digest.
pub const HASH160_SIZE: usize = 20;

/// A 32 byte digest in internal byte order.
pub type Digest = [u8; DIGEST_SIZE];

/// How many times the base hash function is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Rounds {
    /// A single SHA-256.
    Once,
    /// SHA-256 applied twice, the chain-hash convention.
    #[default]
    Twice,
}

/// Hashes `data` with SHA-256, once or twice.
pub fn hash(data: &[u8], rounds: Rounds) -> Digest {
    match rounds {
        Rounds::Once => sha256::Hash::hash(data).to_byte_array(),
        Rounds::Twice => sha256d::Hash::hash(data).to_byte_array(),
    }
}

/// Same as [`hash`], with the output in display (reversed) byte order.
pub fn hash_reversed(data: &[u8], rounds: Rounds) -> Digest {
    let mut digest = hash(data, rounds);
    digest.reverse();
    digest
}

/// Double SHA-256 of `a` followed by `b`, without concatenating them first.
pub fn hash_two(a: &[u8], b: &[u8]) -> Digest {
    let mut engine = sha256d::Hash::engine();
    engine.input(a);
    engine.input(b);
    sha256d::Hash::from_engine(engine).to_byte_array()
}

/// RIPEMD160 of the SHA-256 of `data`, as used for address digests.
pub fn hash160(data: &[u8]) -> [u8; HASH160_SIZE] {
    hash160::Hash::hash(data).to_byte_array()
}

#[cfg(test)]
mod tests {
    use hex::FromHex;

    use super::*;

    #[test]
    fn test_empty_input_known_answers() {
        assert_eq!(
            hex::encode(hash(b"", Rounds::Once)),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex::encode(hash(b"", Rounds::Twice)),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
        assert_eq!(
            hex::encode(hash160(b"")),
            "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
        );
    }

    #[test]
    fn test_default_rounds_is_double() {
        assert_eq!(Rounds::default(), Rounds::Twice);
        assert_eq!(hash(b"abc", Rounds::default()), hash(b"abc", Rounds::Twice));
        assert_ne!(hash(b"abc", Rounds::Once), hash(b"abc", Rounds::Twice));
    }

    #[test]
    fn test_hash_reversed_matches_block_display_order() {
        // Bitcoin mainnet genesis header.
        let genesis = Vec::from_hex(
            "01000000000000000000000000000000000000000000000000000000000000000000000\
             03ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f\
             49ffff001d1dac2b7c",
        )
        .unwrap();
        assert_eq!(
            hex::encode(hash_reversed(&genesis, Rounds::Twice)),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );

        let mut forward = hash(&genesis, Rounds::Twice);
        forward.reverse();
        assert_eq!(forward, hash_reversed(&genesis, Rounds::Twice));
    }

    #[test]
    fn test_hash_two_equals_hash_of_concatenation() {
        let a = b"header-prefix";
        let b = b"header-suffix";
        let joined = [a.as_slice(), b.as_slice()].concat();
        assert_eq!(hash_two(a, b), hash(&joined, Rounds::Twice));
        assert_eq!(hash_two(b"", b""), hash(b"", Rounds::Twice));
    }
}
