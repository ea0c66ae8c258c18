/// Block header layouts, the header record and the header codec.
pub mod block;
