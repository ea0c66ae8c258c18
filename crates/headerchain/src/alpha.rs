/// Block header data structures and the versioned header codec.
pub mod blockdata;
/// Consensus encoding traits and chain parameters.
pub mod consensus;
/// Hash primitives used for header and address digests.
pub mod hashes;
/// I/O traits used by the consensus codec.
pub mod io;
/// Network and coin name registries.
pub mod network;
/// Stateful header chain verification.
pub mod verifier;
