//! Stateful header chain verification.
//!
//! [`HeaderVerifier`] is a cursor over a strictly sequential header stream.
//! Each call verifies the header at `last accepted height + 1` and, only on
//! success, records its raw bytes so the next header's previous-hash field
//! can be checked against them.
//!
//! Two entry points are provided. [`HeaderVerifier::verify_bytes`] takes raw
//! header bytes (from disk or the wire), where only the height is known, and
//! picks the layout from the chain's RandomX activation height.
//! [`HeaderVerifier::verify_record`] takes an already parsed record, whose
//! version flag bit picks the layout it is stored in. Whether the linkage
//! check runs is decided by height on both paths, so the two reach the same
//! verdict for the same header.
//!
//! Headers at or after RandomX activation are accepted without any linkage
//! check. Their proof of work is validated by the node that served them, and
//! the indexer operates inside the same trust boundary.

use bitcoin::consensus;
use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::alpha::{
    blockdata::block::{
        AltPowHash, BlockHash, ExtendedHeader, HeaderError, HeaderRecord, Layout,
        StandardHeader, VersionedHeader,
    },
    consensus::Params,
    hashes::{self, Hash, Rounds},
    network::Network,
};

/// Reasons a header is rejected.
///
/// Everything except [`VerifyError::InvariantViolation`] is caused by the
/// input and leaves the verifier untouched, so the caller can retry with
/// other bytes or drop the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The buffer is neither 80 nor 112 bytes long.
    #[error("Header verification failed for header at height {height}: wrong size ({actual} bytes)")]
    SizeMismatch {
        /// Height the header was presented at.
        height: i64,
        /// Length of the rejected buffer.
        actual: usize,
    },

    /// The bytes did not decode, or decoded to a null header.
    #[error("Header verification failed for header at height {height}: failed to deserialize ({reason})")]
    DecodeFailure {
        /// Height the header was presented at.
        height: i64,
        /// What the decoder complained about.
        reason: String,
    },

    /// The RandomX version flag and the digest field disagree.
    #[error("Header verification failed for header at height {height}: {reason}")]
    MalformedAlternateField {
        /// Height the header was presented at.
        height: i64,
        /// Which way they disagree.
        reason: &'static str,
    },

    /// The previous-hash field does not reference the last accepted header.
    #[error(
        "Header {height} 'hashPrevBlock' does not match the contents of the previous block \
         (expected {expected}, got {found})"
    )]
    LinkageMismatch {
        /// Height the header was presented at.
        height: i64,
        /// Chain hash of the last accepted header.
        expected: BlockHash,
        /// Previous-hash field of the rejected header.
        found: BlockHash,
    },

    /// The verifier's own state is inconsistent.
    ///
    /// The last accepted header carries the RandomX flag but no digest, so
    /// there is nothing to link to. Input fed through either entry point
    /// cannot cause this: a header is only linkage checked below activation,
    /// and every flagged header accepted below activation carries its
    /// digest. Seeing it means the verifier was built from state that did
    /// not come out of a verifier with the same parameters, which is a bug
    /// on the caller's side.
    #[error("Header chain state is corrupt at height {height}: {reason}")]
    InvariantViolation {
        /// Height of the header being verified when the problem surfaced.
        height: i64,
        /// What is inconsistent.
        reason: &'static str,
    },
}

impl VerifyError {
    /// Height of the header the error refers to.
    pub fn height(&self) -> i64 {
        match self {
            Self::SizeMismatch { height, .. }
            | Self::DecodeFailure { height, .. }
            | Self::MalformedAlternateField { height, .. }
            | Self::LinkageMismatch { height, .. }
            | Self::InvariantViolation { height, .. } => *height,
        }
    }

    /// Whether the error reflects corrupt internal state rather than bad
    /// input. A sync session should abort on these.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }

    fn from_header_error(height: i64, err: HeaderError) -> Self {
        match err {
            HeaderError::SizeMismatch { actual, .. } => Self::SizeMismatch { height, actual },
            HeaderError::Decode(err) => Self::DecodeFailure {
                height,
                reason: err.to_string(),
            },
            HeaderError::MalformedAlternateField(reason) => {
                Self::MalformedAlternateField { height, reason }
            }
        }
    }
}

/// Verifies that a stream of headers is well formed and hash linked.
///
/// The verifier holds no synchronization: one writer advances it, and the
/// value may be shared for reads behind whatever lock the caller uses.
/// Independent chains each get their own instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderVerifier {
    params: Params,
    prev_height: i64,
    prev: Vec<u8>,
}

impl HeaderVerifier {
    /// Creates a verifier with no accepted headers; the first header it sees
    /// is taken as height 0.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            prev_height: -1,
            prev: Vec::new(),
        }
    }

    /// Creates an empty verifier for `network`.
    pub fn for_network(network: Network) -> Self {
        Self::new(network.consensus_params())
    }

    /// Resumes verification mid-chain.
    ///
    /// `header` holds the raw bytes of the header at `height`, which the next
    /// verified header must link to. An empty `header` means there is nothing
    /// to link to, and the next header is accepted as if it were the first.
    ///
    /// # Errors
    ///
    /// * `HeaderError::SizeMismatch` - `header` is neither empty nor a
    ///   standard or extended header
    /// * `HeaderError::MalformedAlternateField` - `header` carries the RandomX
    ///   flag but no digest
    /// * `HeaderError::Decode` - the base fields do not decode
    pub fn resume(params: Params, height: i64, header: Vec<u8>) -> Result<Self, HeaderError> {
        if !header.is_empty() {
            if Layout::from_size(header.len()).is_none() {
                return Err(HeaderError::SizeMismatch {
                    expected: Layout::Standard.size(),
                    actual: header.len(),
                });
            }
            let base = standard_prefix(&header)?;
            if base.is_alt_pow() {
                ExtendedHeader::new(base, trailing_digest(&header))?;
            }
        }
        Ok(Self {
            params,
            prev_height: height,
            prev: header,
        })
    }

    /// The chain parameters in use.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Height the next verified header will be assigned.
    pub fn next_height(&self) -> i64 {
        self.prev_height.saturating_add(1)
    }

    /// Whether no header has been accepted (or seeded) yet.
    pub fn is_empty(&self) -> bool {
        self.prev.is_empty()
    }

    /// The height and raw bytes of the last accepted header.
    ///
    /// Height is `-1` and the bytes are empty before anything was accepted.
    pub fn last_header_processed(&self) -> (i64, &[u8]) {
        (self.prev_height, &self.prev)
    }

    /// Chain hash of the last accepted header, if there is one whose hash
    /// can be derived.
    pub fn tip_hash(&self) -> Option<BlockHash> {
        chain_hash(&self.prev)
    }

    /// Verifies raw header bytes for the next height.
    ///
    /// Both 80 and 112 byte buffers are accepted at any height, since older
    /// stores padded standard headers. The base fields are always read from
    /// the first 80 bytes. At and after RandomX activation the header is
    /// accepted without a linkage check.
    ///
    /// # Errors
    ///
    /// See [`VerifyError`]. The verifier is unchanged on error.
    pub fn verify_bytes(&mut self, header: &[u8]) -> Result<(), VerifyError> {
        let height = self.next_height();
        self.check_bytes(height, header)
            .inspect_err(log_rejection)?;
        self.commit(height, header.to_vec());
        Ok(())
    }

    fn check_bytes(&self, height: i64, header: &[u8]) -> Result<(), VerifyError> {
        if Layout::from_size(header.len()).is_none() {
            return Err(VerifyError::SizeMismatch {
                height,
                actual: header.len(),
            });
        }
        let base =
            standard_prefix(header).map_err(|err| VerifyError::from_header_error(height, err))?;

        if Layout::for_height(height, &self.params) == Layout::Extended {
            debug!(height, "Bypassing header validation for RandomX block");
            return Ok(());
        }

        if base.is_alt_pow() {
            // A RandomX header before activation still has to carry the
            // digest its successor will link to.
            ExtendedHeader::new(base, trailing_digest(header))
                .map_err(|err| VerifyError::from_header_error(height, err))?;
        }

        self.check_linkage(height, &base)
    }

    /// Verifies an already parsed header record for the next height.
    ///
    /// The record's version flag decides the layout it is stored in; the
    /// flag and digest must agree. As with [`HeaderVerifier::verify_bytes`],
    /// records at or after RandomX activation are accepted without a linkage
    /// check, and records below it are linkage checked whatever their flag.
    ///
    /// # Errors
    ///
    /// See [`VerifyError`]. The verifier is unchanged on error.
    pub fn verify_record(&mut self, record: &HeaderRecord) -> Result<(), VerifyError> {
        let height = self.next_height();
        let header = self
            .check_record(height, record)
            .inspect_err(log_rejection)?;
        self.commit(height, header);
        Ok(())
    }

    fn check_record(&self, height: i64, record: &HeaderRecord) -> Result<Vec<u8>, VerifyError> {
        let header = VersionedHeader::try_from(*record)
            .map_err(|err| VerifyError::from_header_error(height, err))?;
        let encoded = header.encode();
        if encoded.len() != header.layout().size() {
            return Err(VerifyError::SizeMismatch {
                height,
                actual: encoded.len(),
            });
        }

        if Layout::for_height(height, &self.params) == Layout::Extended {
            debug!(height, "Bypassing header validation for RandomX block");
            return Ok(encoded);
        }

        self.check_linkage(height, header.base())?;
        Ok(encoded)
    }

    /// Checks that `header` links to the last accepted header.
    ///
    /// Leaves state alone; committing is up to the entry points.
    fn check_linkage(&self, height: i64, header: &StandardHeader) -> Result<(), VerifyError> {
        if header.is_null() {
            return Err(VerifyError::DecodeFailure {
                height,
                reason: "header is null".to_string(),
            });
        }

        if self.prev.is_empty() {
            return Ok(());
        }

        let expected = chain_hash(&self.prev).ok_or_else(|| {
            error!(
                height,
                prev_height = self.prev_height,
                "Last accepted header has no derivable chain hash"
            );
            VerifyError::InvariantViolation {
                height,
                reason: "previous RandomX header has no alternate digest",
            }
        })?;

        if expected != header.prev_blockhash {
            return Err(VerifyError::LinkageMismatch {
                height,
                expected,
                found: header.prev_blockhash,
            });
        }
        Ok(())
    }

    fn commit(&mut self, height: i64, header: Vec<u8>) {
        trace!(height, size = header.len(), "Accepted header");
        self.prev_height = height;
        self.prev = header;
    }
}

fn log_rejection(err: &VerifyError) {
    // Fatal errors are logged where they are detected.
    if !err.is_fatal() {
        warn!(height = err.height(), "{err}");
    }
}

/// Decodes the base fields from the first 80 bytes of `header`.
fn standard_prefix(header: &[u8]) -> Result<StandardHeader, HeaderError> {
    let prefix = header
        .get(..Layout::Standard.size())
        .ok_or(HeaderError::SizeMismatch {
            expected: Layout::Standard.size(),
            actual: header.len(),
        })?;
    Ok(consensus::deserialize(prefix)?)
}

/// The digest stored after the base fields, or the null digest when the
/// bytes stop at 80.
fn trailing_digest(header: &[u8]) -> AltPowHash {
    header
        .get(Layout::Standard.size()..)
        .and_then(AltPowHash::from_slice)
        .unwrap_or_else(AltPowHash::all_zeros)
}

/// Chain hash of stored header bytes.
///
/// A RandomX header contributes its digest, read from bytes 80..112. Any
/// other header contributes the double SHA-256 of its first 80 bytes, so
/// padded standard headers hash the same as unpadded ones. Returns `None`
/// when there is nothing to hash or a RandomX header lacks its digest.
fn chain_hash(header: &[u8]) -> Option<BlockHash> {
    let base = standard_prefix(header).ok()?;
    if base.is_alt_pow() {
        let digest = trailing_digest(header);
        (!digest.is_null()).then(|| digest.into())
    } else {
        let prefix = header.get(..Layout::Standard.size())?;
        Some(BlockHash::from_byte_array(hashes::hash(prefix, Rounds::Twice)))
    }
}
