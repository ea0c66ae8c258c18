//! The 80 byte Bitcoin-compatible header layout.

use bitcoin::block::Header as InnerHeader;

use crate::alpha::{
    blockdata::block::{
        BlockHash, CompactTarget, TxMerkleNode, Version,
        header::{Header, Layout},
    },
    consensus::{ConsensusCodec, Encodable},
    hashes::Hash,
};

/// The six base header fields, in wire order.
///
/// This is the whole header on Bitcoin-family chains and on Alpha before
/// RandomX activation, and the prefix of an [`ExtendedHeader`].
///
/// [`ExtendedHeader`]: super::ExtendedHeader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ConsensusCodec)]
pub struct StandardHeader {
    /// Block version. Bit 29 flags a RandomX header.
    pub version: Version,
    /// Chain hash of the previous block.
    pub prev_blockhash: BlockHash,
    /// Root of the transaction merkle tree.
    pub merkle_root: TxMerkleNode,
    /// Block timestamp.
    pub time: u32,
    /// Compact difficulty target.
    pub bits: CompactTarget,
    /// Nonce.
    pub nonce: u32,
}

impl StandardHeader {
    /// Whether the header is structurally null, i.e. `bits` is zero.
    pub fn is_null(&self) -> bool {
        self.bits.to_consensus() == 0
    }

    /// Whether the version carries the RandomX flag bit.
    pub fn is_alt_pow(&self) -> bool {
        Layout::for_version(self.version.to_consensus()) == Layout::Extended
    }
}

impl Header for StandardHeader {
    /// Bitcoin headers are always 80 bytes.
    const SIZE: usize = 4 + 32 + 32 + 4 + 4 + 4; // 80

    const LAYOUT: Layout = Layout::Standard;

    fn base(&self) -> &StandardHeader {
        self
    }

    /// Double SHA-256 over the 80 serialized bytes.
    #[allow(clippy::expect_used, reason = "Writing into a hash engine can't fail")]
    fn block_hash(&self) -> BlockHash {
        let mut engine = BlockHash::engine();
        self.consensus_encode(&mut engine)
            .expect("Writing into a hash engine can't fail");
        BlockHash::from_engine(engine)
    }
}

impl From<InnerHeader> for StandardHeader {
    fn from(header: InnerHeader) -> Self {
        Self {
            version: header.version,
            prev_blockhash: header.prev_blockhash,
            merkle_root: header.merkle_root,
            time: header.time,
            bits: header.bits,
            nonce: header.nonce,
        }
    }
}

impl From<StandardHeader> for InnerHeader {
    fn from(header: StandardHeader) -> Self {
        Self {
            version: header.version,
            prev_blockhash: header.prev_blockhash,
            merkle_root: header.merkle_root,
            time: header.time,
            bits: header.bits,
            nonce: header.nonce,
        }
    }
}
