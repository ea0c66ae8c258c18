//! Block header types and the versioned header codec.

mod header;

use std::fmt;

pub use bitcoin::{BlockHash, CompactTarget, TxMerkleNode, block::Version};
pub use header::{
    ALT_POW_VERSION_BIT, ExtendedHeader, Header, HeaderRecord, Layout, StandardHeader,
    VersionedHeader,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alpha::{
    consensus::{Decodable, Encodable, EncodeDecodeError},
    hashes::{DIGEST_SIZE, Digest, Hash},
    io::{Error as IoError, Read, Write},
};

/// Errors produced by the header codec.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The buffer length does not match the layout being decoded.
    #[error("wrong header size: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Size required by the layout.
        expected: usize,
        /// Size of the buffer that was supplied.
        actual: usize,
    },

    /// The consensus decoder rejected the bytes.
    #[error("failed to deserialize header: {0}")]
    Decode(#[from] EncodeDecodeError),

    /// The alternate-PoW version flag and the digest field disagree.
    #[error("malformed alternate-PoW header: {0}")]
    MalformedAlternateField(&'static str),
}

/// A precomputed alternate proof-of-work (RandomX) digest.
///
/// Stored in internal byte order like every other chain digest. The all-zero
/// value is the null digest and means "absent".
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AltPowHash(Digest);

impl AltPowHash {
    /// The null digest.
    pub const fn all_zeros() -> Self {
        Self([0; DIGEST_SIZE])
    }

    /// Wraps raw bytes in internal byte order.
    pub const fn from_byte_array(bytes: Digest) -> Self {
        Self(bytes)
    }

    /// Reads a digest from a slice, which must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        Digest::try_from(bytes).ok().map(Self)
    }

    /// Returns the raw bytes in internal byte order.
    pub const fn to_byte_array(self) -> Digest {
        self.0
    }

    /// Whether this is the null digest.
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

impl From<AltPowHash> for BlockHash {
    fn from(hash: AltPowHash) -> Self {
        BlockHash::from_byte_array(hash.0)
    }
}

impl From<BlockHash> for AltPowHash {
    fn from(hash: BlockHash) -> Self {
        Self(hash.to_byte_array())
    }
}

impl AsRef<[u8]> for AltPowHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Displayed in reversed byte order, the same way block hashes are.
impl fmt::Display for AltPowHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter().rev() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for AltPowHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AltPowHash({self})")
    }
}

impl Encodable for AltPowHash {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        self.0.consensus_encode(writer)
    }
}

impl Decodable for AltPowHash {
    fn consensus_decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self, EncodeDecodeError> {
        Ok(Self(Digest::consensus_decode(reader)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_digest() {
        assert!(AltPowHash::all_zeros().is_null());
        assert!(AltPowHash::default().is_null());

        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        assert!(!AltPowHash::from_byte_array(bytes).is_null());
    }

    #[test]
    fn test_display_is_reversed() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        let hash = AltPowHash::from_byte_array(bytes);
        let shown = hash.to_string();
        assert_eq!(shown.len(), 64);
        assert!(shown.ends_with("ab"));
        assert!(shown.starts_with("00"));
        assert_eq!(shown, BlockHash::from(hash).to_string());
    }

    #[test]
    fn test_from_slice_requires_exact_width() {
        assert!(AltPowHash::from_slice(&[7u8; 32]).is_some());
        assert!(AltPowHash::from_slice(&[7u8; 31]).is_none());
        assert!(AltPowHash::from_slice(&[7u8; 33]).is_none());
    }
}
