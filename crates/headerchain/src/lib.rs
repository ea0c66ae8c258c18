//! Header chain integrity layer for the Unicity Alpha indexer.
//!
//! This library turns raw block header bytes (or already parsed header
//! records) into headers that the rest of an indexer may treat as canonical
//! chain state. It provides the hash primitives, the two header layouts and
//! their versioned codec, the chain parameters that select between them, and
//! the stateful [`HeaderVerifier`](alpha::verifier::HeaderVerifier) that
//! checks hash linkage one height at a time.

#![cfg_attr(test, allow(clippy::arithmetic_side_effects))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::cast_sign_loss))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::cast_possible_truncation))]

/// Types and functions related to the Alpha header chain.
pub mod alpha;

pub use alpha::{
    blockdata::block::{
        AltPowHash, ExtendedHeader, Header, HeaderError, HeaderRecord, Layout, StandardHeader,
        VersionedHeader,
    },
    consensus::Params,
    network::{Coin, Network},
    verifier::{HeaderVerifier, VerifyError},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
