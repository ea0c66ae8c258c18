//! I/O traits consumed by the consensus codec.
//!
//! The `bitcoin` consensus traits are generic over `std::io` readers and
//! writers; the derive macro refers to them through this module.

pub use std::io::{Error, Read, Write};
