mod params;

pub use bitcoin::consensus::encode::{Decodable, Encodable, Error as EncodeDecodeError};
pub use params::Params;
pub use unicity_headerchain_derive::ConsensusCodec;
