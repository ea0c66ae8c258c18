//! The 112 byte RandomX header layout.
//!
//! RandomX headers carry the standard Bitcoin fields followed by the RandomX
//! proof-of-work digest computed by the miner. The digest is not recomputed
//! here; it is taken as the header's chain hash as supplied.

use crate::alpha::{
    blockdata::block::{
        AltPowHash, BlockHash, HeaderError,
        header::{Header, Layout, StandardHeader},
    },
    consensus::ConsensusCodec,
};

/// A header in the extended layout.
///
/// Constructed through [`ExtendedHeader::new`], which guarantees that the
/// version flag is set and the digest is not null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ConsensusCodec)]
pub struct ExtendedHeader {
    base: StandardHeader,
    alt_pow_hash: AltPowHash,
}

impl ExtendedHeader {
    /// Creates an extended header from its base fields and RandomX digest.
    ///
    /// # Errors
    ///
    /// * `HeaderError::MalformedAlternateField` - the version lacks the
    ///   RandomX flag, or the digest is null
    pub fn new(base: StandardHeader, alt_pow_hash: AltPowHash) -> Result<Self, HeaderError> {
        if !base.is_alt_pow() {
            return Err(HeaderError::MalformedAlternateField(
                "alternate-digest field on a header without the alternate-PoW version flag",
            ));
        }
        if alt_pow_hash.is_null() {
            return Err(HeaderError::MalformedAlternateField(
                "alternate-PoW block is missing its alternate-digest field",
            ));
        }
        Ok(Self { base, alt_pow_hash })
    }

    /// The RandomX digest.
    pub fn alt_pow_hash(&self) -> AltPowHash {
        self.alt_pow_hash
    }
}

impl Header for ExtendedHeader {
    /// 32 bytes larger than a standard header due to the RandomX digest.
    const SIZE: usize = 4 + 32 + 32 + 4 + 4 + 4 + 32; // 112

    const LAYOUT: Layout = Layout::Extended;

    fn base(&self) -> &StandardHeader {
        &self.base
    }

    /// The precomputed RandomX digest, not a hash of the header bytes.
    fn block_hash(&self) -> BlockHash {
        self.alt_pow_hash.into()
    }
}
