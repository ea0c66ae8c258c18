//! The flat header record exchanged with collaborators.

use bitcoin::consensus;
use serde::{Deserialize, Serialize};

use crate::alpha::{
    blockdata::block::{
        AltPowHash, BlockHash, CompactTarget, HeaderError, TxMerkleNode, Version,
        header::{ALT_POW_VERSION_BIT, ExtendedHeader, Header, Layout, StandardHeader, VersionedHeader},
    },
    consensus::Encodable,
    hashes::Hash,
};

/// A parsed block header as handed over by a deserialization layer.
///
/// Unlike [`VersionedHeader`], nothing stops the version flag and the digest
/// from disagreeing here; converting into a [`VersionedHeader`] is where that
/// is checked. A null (all-zero) `alt_digest` means the field is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeaderRecord {
    /// Block version; bit 29 is the RandomX flag.
    pub version: i32,
    /// Chain hash of the previous block.
    pub prev_hash: BlockHash,
    /// Root of the transaction merkle tree.
    pub merkle_root: TxMerkleNode,
    /// Block timestamp.
    pub time: u32,
    /// Compact difficulty target.
    pub bits: u32,
    /// Nonce.
    pub nonce: u32,
    /// Precomputed RandomX digest, extended layout only.
    #[serde(default, skip_serializing_if = "AltPowHash::is_null")]
    pub alt_digest: AltPowHash,
}

impl HeaderRecord {
    /// A record with every field zeroed, which is structurally null.
    pub fn null() -> Self {
        Self {
            version: 0,
            prev_hash: BlockHash::all_zeros(),
            merkle_root: TxMerkleNode::all_zeros(),
            time: 0,
            bits: 0,
            nonce: 0,
            alt_digest: AltPowHash::all_zeros(),
        }
    }

    /// Whether the record is structurally null, i.e. `bits` is zero.
    pub fn is_null(&self) -> bool {
        self.bits == 0
    }

    /// Whether the version carries the RandomX flag bit.
    pub fn is_alt_pow(&self) -> bool {
        self.version & ALT_POW_VERSION_BIT == ALT_POW_VERSION_BIT
    }

    /// The layout [`HeaderRecord::encode`] emits for this record.
    pub fn layout(&self) -> Layout {
        Layout::for_version(self.version)
    }

    /// The six base fields.
    pub fn base(&self) -> StandardHeader {
        StandardHeader {
            version: Version::from_consensus(self.version),
            prev_blockhash: self.prev_hash,
            merkle_root: self.merkle_root,
            time: self.time,
            bits: CompactTarget::from_consensus(self.bits),
            nonce: self.nonce,
        }
    }

    /// The chain hash of the record.
    ///
    /// A non-null `alt_digest` is returned as is; it is trusted, not
    /// recomputed. Otherwise this is the double SHA-256 of the standard
    /// encoding.
    pub fn block_hash(&self) -> BlockHash {
        if self.alt_digest.is_null() {
            self.base().block_hash()
        } else {
            self.alt_digest.into()
        }
    }

    /// Encodes the record: standard layout unless the RandomX flag is set,
    /// in which case the digest is appended.
    #[allow(clippy::expect_used, reason = "Writing into a Vec can't fail")]
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.layout().size());
        self.base()
            .consensus_encode(&mut bytes)
            .expect("Writing into a Vec can't fail");
        if self.is_alt_pow() {
            self.alt_digest
                .consensus_encode(&mut bytes)
                .expect("Writing into a Vec can't fail");
        }
        bytes
    }

    /// Decodes `bytes` in the given layout.
    ///
    /// Only the length is enforced; flag and digest consistency is left to
    /// the conversion into [`VersionedHeader`].
    pub fn decode(bytes: &[u8], layout: Layout) -> Result<Self, HeaderError> {
        if bytes.len() != layout.size() {
            return Err(HeaderError::SizeMismatch {
                expected: layout.size(),
                actual: bytes.len(),
            });
        }
        match layout {
            Layout::Standard => Ok(consensus::deserialize::<StandardHeader>(bytes)?.into()),
            Layout::Extended => {
                let header: ExtendedHeader = consensus::deserialize(bytes)?;
                Ok(Self {
                    alt_digest: header.alt_pow_hash(),
                    ..HeaderRecord::from(*header.base())
                })
            }
        }
    }
}

impl Default for HeaderRecord {
    fn default() -> Self {
        Self::null()
    }
}

impl From<StandardHeader> for HeaderRecord {
    fn from(header: StandardHeader) -> Self {
        Self {
            version: header.version.to_consensus(),
            prev_hash: header.prev_blockhash,
            merkle_root: header.merkle_root,
            time: header.time,
            bits: header.bits.to_consensus(),
            nonce: header.nonce,
            alt_digest: AltPowHash::all_zeros(),
        }
    }
}

impl From<VersionedHeader> for HeaderRecord {
    fn from(header: VersionedHeader) -> Self {
        match header {
            VersionedHeader::Standard(header) => header.into(),
            VersionedHeader::Extended(header) => Self {
                alt_digest: header.alt_pow_hash(),
                ..HeaderRecord::from(*header.base())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(version: i32, alt_digest: AltPowHash) -> HeaderRecord {
        HeaderRecord {
            version,
            prev_hash: BlockHash::from_byte_array([0x11; 32]),
            merkle_root: TxMerkleNode::from_byte_array([0x22; 32]),
            time: 1_718_524_492,
            bits: 0x1d0f_ffff,
            nonce: 40_358_186,
            alt_digest,
        }
    }

    #[test]
    fn test_null_sentinel() {
        assert!(HeaderRecord::null().is_null());
        assert!(HeaderRecord::default().is_null());
        let mut r = HeaderRecord::null();
        r.bits = 1;
        assert!(!r.is_null());
        // Only bits matter.
        let mut r = record(1, AltPowHash::all_zeros());
        r.bits = 0;
        assert!(r.is_null());
    }

    #[test]
    fn test_round_trip_standard() {
        let r = record(0x2000_0000 - 1, AltPowHash::all_zeros());
        assert!(!r.is_alt_pow());
        let bytes = r.encode();
        assert_eq!(bytes.len(), 80);
        assert_eq!(HeaderRecord::decode(&bytes, Layout::Standard).unwrap(), r);
    }

    #[test]
    fn test_round_trip_extended() {
        let r = record(0x2000_0000, AltPowHash::from_byte_array([0x33; 32]));
        assert!(r.is_alt_pow());
        let bytes = r.encode();
        assert_eq!(bytes.len(), 112);
        assert_eq!(&bytes[80..], &[0x33u8; 32]);
        assert_eq!(HeaderRecord::decode(&bytes, Layout::Extended).unwrap(), r);
        assert_eq!(HeaderRecord::decode(&bytes, r.layout()).unwrap(), r);
    }

    #[test]
    fn test_decode_size_mismatch() {
        let bytes = record(1, AltPowHash::all_zeros()).encode();
        assert!(matches!(
            HeaderRecord::decode(&bytes, Layout::Extended),
            Err(HeaderError::SizeMismatch {
                expected: 112,
                actual: 80
            })
        ));
    }

    #[test]
    fn test_block_hash_prefers_digest() {
        let digest = AltPowHash::from_byte_array([0x44; 32]);
        let with_digest = record(0x2000_0000, digest);
        assert_eq!(with_digest.block_hash(), BlockHash::from(digest));

        let plain = record(1, AltPowHash::all_zeros());
        assert_eq!(plain.block_hash(), plain.base().block_hash());
        assert_eq!(
            plain.block_hash().to_byte_array(),
            crate::alpha::hashes::hash(&plain.encode(), crate::alpha::hashes::Rounds::Twice)
        );
    }

    #[test]
    fn test_versioned_conversion_round_trip() {
        let r = record(0x2000_0004, AltPowHash::from_byte_array([0x55; 32]));
        let header = VersionedHeader::try_from(r).unwrap();
        assert_eq!(HeaderRecord::from(header), r);
        assert_eq!(header.encode(), r.encode());
    }

    #[test]
    fn test_serde_omits_null_digest() {
        let plain = record(1, AltPowHash::all_zeros());
        let json = serde_json::to_value(plain).unwrap();
        assert!(json.get("alt_digest").is_none());
        let back: HeaderRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, plain);

        let alt = record(0x2000_0000, AltPowHash::from_byte_array([0x66; 32]));
        let back: HeaderRecord =
            serde_json::from_str(&serde_json::to_string(&alt).unwrap()).unwrap();
        assert_eq!(back, alt);
    }
}
