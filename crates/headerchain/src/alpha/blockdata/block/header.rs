//! Block header implementations.
//!
//! Two wire layouts exist for the same logical header:
//! - [`StandardHeader`], the 80 byte Bitcoin-compatible layout
//! - [`ExtendedHeader`], the 112 byte layout that appends a precomputed
//!   RandomX digest
//!
//! [`VersionedHeader`] is the tagged union of the two and is what the codec
//! hands out once a buffer has been decoded and checked. [`HeaderRecord`] is
//! the flat form exchanged with collaborators, where the flag bit and the
//! digest can still disagree.

mod extended;
mod record;
mod standard;

use std::fmt;

use bitcoin::consensus;
pub use extended::ExtendedHeader;
pub use record::HeaderRecord;
pub use standard::StandardHeader;

use crate::alpha::{
    blockdata::block::{BlockHash, CompactTarget, HeaderError},
    consensus::{Decodable, Encodable, Params},
};

/// Bit 29 of the header version marks a RandomX (alternate-PoW) header.
pub const ALT_POW_VERSION_BIT: i32 = 0x2000_0000;

/// Common trait for the header layouts.
pub trait Header:
    Copy + Clone + PartialEq + Eq + fmt::Debug + Send + Sync + Encodable + Decodable
{
    /// The size of the header in bytes.
    const SIZE: usize;

    /// The layout this header is encoded with.
    const LAYOUT: Layout;

    /// The six fields shared by every layout.
    fn base(&self) -> &StandardHeader;

    /// Computes the chain hash, the value a successor must reference as its
    /// previous block hash.
    fn block_hash(&self) -> BlockHash;

    /// Retrieves the previous block hash from the header.
    fn previous_block_hash(&self) -> BlockHash {
        self.base().prev_blockhash
    }

    /// The block timestamp as claimed by the miner.
    fn timestamp(&self) -> u32 {
        self.base().time
    }

    /// The compact difficulty target.
    fn target(&self) -> CompactTarget {
        self.base().bits
    }

    /// A header whose `bits` field is zero is structurally null.
    fn is_null(&self) -> bool {
        self.base().is_null()
    }

    /// Serializes the header in its own layout.
    fn to_bytes(&self) -> Vec<u8> {
        consensus::serialize(self)
    }
}

/// The two on-wire header shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// 80 bytes: version, previous hash, merkle root, time, bits, nonce.
    Standard,
    /// 112 bytes: the standard fields followed by the RandomX digest.
    Extended,
}

impl Layout {
    /// Encoded size of a header in this layout.
    pub const fn size(self) -> usize {
        match self {
            Layout::Standard => StandardHeader::SIZE,
            Layout::Extended => ExtendedHeader::SIZE,
        }
    }

    /// Size of a header depending on whether it is extended.
    pub const fn size_for(extended: bool) -> usize {
        if extended {
            Layout::Extended.size()
        } else {
            Layout::Standard.size()
        }
    }

    /// The layout a header at `height` is expected to use on a chain with
    /// the given parameters.
    pub fn for_height(height: i64, params: &Params) -> Layout {
        if params.is_randomx_active(height) {
            Layout::Extended
        } else {
            Layout::Standard
        }
    }

    /// The layout announced by the flag bit of a header version.
    pub const fn for_version(version: i32) -> Layout {
        if version & ALT_POW_VERSION_BIT == ALT_POW_VERSION_BIT {
            Layout::Extended
        } else {
            Layout::Standard
        }
    }

    /// The layout whose encoded size is `len`, if any.
    pub const fn from_size(len: usize) -> Option<Layout> {
        if len == Layout::Standard.size() {
            Some(Layout::Standard)
        } else if len == Layout::Extended.size() {
            Some(Layout::Extended)
        } else {
            None
        }
    }
}

/// A decoded header in one of the two layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionedHeader {
    /// An 80 byte header.
    Standard(StandardHeader),
    /// A 112 byte header carrying a non-null RandomX digest.
    Extended(ExtendedHeader),
}

impl VersionedHeader {
    /// Decodes `bytes` as a header in `layout`.
    ///
    /// The buffer must be exactly the layout's size; nothing is ever decoded
    /// from a prefix. Extended headers must have the version flag set and a
    /// non-null digest.
    pub fn decode(bytes: &[u8], layout: Layout) -> Result<Self, HeaderError> {
        if bytes.len() != layout.size() {
            return Err(HeaderError::SizeMismatch {
                expected: layout.size(),
                actual: bytes.len(),
            });
        }
        match layout {
            Layout::Standard => Ok(Self::Standard(consensus::deserialize(bytes)?)),
            Layout::Extended => {
                let raw: ExtendedHeader = consensus::deserialize(bytes)?;
                Ok(Self::Extended(ExtendedHeader::new(
                    *raw.base(),
                    raw.alt_pow_hash(),
                )?))
            }
        }
    }

    /// Encodes the header in its own layout.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Standard(header) => header.to_bytes(),
            Self::Extended(header) => header.to_bytes(),
        }
    }

    /// The layout of this header.
    pub const fn layout(&self) -> Layout {
        match self {
            Self::Standard(_) => StandardHeader::LAYOUT,
            Self::Extended(_) => ExtendedHeader::LAYOUT,
        }
    }

    /// The six fields shared by every layout.
    pub fn base(&self) -> &StandardHeader {
        match self {
            Self::Standard(header) => header,
            Self::Extended(header) => header.base(),
        }
    }

    /// The chain hash: the RandomX digest of an extended header, or the
    /// double SHA-256 of a standard one.
    pub fn block_hash(&self) -> BlockHash {
        match self {
            Self::Standard(header) => header.block_hash(),
            Self::Extended(header) => header.block_hash(),
        }
    }
}

impl From<StandardHeader> for VersionedHeader {
    fn from(header: StandardHeader) -> Self {
        Self::Standard(header)
    }
}

impl From<ExtendedHeader> for VersionedHeader {
    fn from(header: ExtendedHeader) -> Self {
        Self::Extended(header)
    }
}

impl TryFrom<HeaderRecord> for VersionedHeader {
    type Error = HeaderError;

    fn try_from(record: HeaderRecord) -> Result<Self, Self::Error> {
        let base = record.base();
        match Layout::for_version(record.version) {
            Layout::Extended => Ok(Self::Extended(ExtendedHeader::new(base, record.alt_digest)?)),
            Layout::Standard if !record.alt_digest.is_null() => {
                Err(HeaderError::MalformedAlternateField(
                    "non-alternate block has unexpected alternate-digest field",
                ))
            }
            Layout::Standard => Ok(Self::Standard(base)),
        }
    }
}
