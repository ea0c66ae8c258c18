use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alpha::consensus::Params;

/// Errors that can occur when parsing a chain type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChainTypeError {
    /// The provided chain type string is invalid.
    #[error("Invalid chain type: {0}")]
    InvalidChainType(String),
}

/// Name reported for a network that could not be resolved.
pub const INVALID_NET_NAME: &str = "invalid";

/// The networks a header chain can be tracked on.
///
/// The canonical names match what the backing node reports through its
/// `getblockchaininfo` RPC, which is how the indexer decides which network it
/// is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Bitcoin-family mainnet.
    Main,
    /// Testnet3 (and signet, which the indexer treats the same way).
    Test,
    /// Testnet4.
    Test4,
    /// Bitcoin Cash scalenet.
    Scale,
    /// Local regression test network.
    RegTest,
    /// Bitcoin Cash chipnet.
    Chip,
    /// Unicity Alpha mainnet.
    Alpha,
    /// Unicity Alpha testnet.
    AlphaTest,
}

/// Canonical and alternate names accepted for each network.
const NAME_TABLE: &[(&str, Network)] = &[
    ("main", Network::Main),
    ("mainnet", Network::Main),
    ("test", Network::Test),
    ("testnet3", Network::Test),
    ("signet", Network::Test),
    ("test4", Network::Test4),
    ("testnet4", Network::Test4),
    ("scale", Network::Scale),
    ("regtest", Network::RegTest),
    ("chip", Network::Chip),
    ("chipnet", Network::Chip),
    ("alpha", Network::Alpha),
    ("alphatest", Network::AlphaTest),
];

impl Network {
    /// All known networks.
    pub const ALL: [Network; 8] = [
        Network::Main,
        Network::Test,
        Network::Test4,
        Network::Scale,
        Network::RegTest,
        Network::Chip,
        Network::Alpha,
        Network::AlphaTest,
    ];

    /// Returns the canonical name of this network.
    pub fn name(self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Test => "test",
            Network::Test4 => "test4",
            Network::Scale => "scale",
            Network::RegTest => "regtest",
            Network::Chip => "chip",
            Network::Alpha => "alpha",
            Network::AlphaTest => "alphatest",
        }
    }

    /// Looks a network up by canonical or alternate name.
    ///
    /// An exact match is tried first; failing that the lookup falls back to a
    /// case-insensitive comparison, since chain names reported by different
    /// node implementations do not agree on case.
    pub fn from_name(name: &str) -> Option<Network> {
        NAME_TABLE
            .iter()
            .find(|(known, _)| *known == name)
            .or_else(|| {
                NAME_TABLE
                    .iter()
                    .find(|(known, _)| known.eq_ignore_ascii_case(name))
            })
            .map(|(_, network)| *network)
    }

    /// Returns the canonical name of `network`, or `"invalid"` when absent.
    pub fn name_or_invalid(network: Option<Network>) -> &'static str {
        network.map_or(INVALID_NET_NAME, Network::name)
    }

    /// Returns the coin that owns this network, when it is unambiguous.
    ///
    /// The Bitcoin-family names are shared by BTC, BCH and LTC, so only the
    /// Alpha networks resolve to a coin.
    pub fn coin(self) -> Option<Coin> {
        match self {
            Network::Alpha | Network::AlphaTest => Some(Coin::Alpha),
            _ => None,
        }
    }

    /// Returns the consensus parameters for this network.
    pub fn consensus_params(self) -> Params {
        match self {
            Network::Main => Params::MAIN,
            Network::Test => Params::TEST,
            Network::Test4 => Params::TEST4,
            Network::Scale => Params::SCALE,
            Network::RegTest => Params::REGTEST,
            Network::Chip => Params::CHIP,
            Network::Alpha => Params::ALPHA,
            Network::AlphaTest => Params::ALPHA_TEST,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = ChainTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::try_from(s)
    }
}

impl TryFrom<&str> for Network {
    type Error = ChainTypeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Network::from_name(s).ok_or_else(|| ChainTypeError::InvalidChainType(s.to_string()))
    }
}

impl TryFrom<String> for Network {
    type Error = ChainTypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Network::try_from(s.as_str())
    }
}

/// The coins an indexer instance may serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Coin {
    /// Bitcoin Cash.
    Bch,
    /// Bitcoin.
    Btc,
    /// Litecoin.
    Ltc,
    /// Unicity Alpha.
    Alpha,
}

impl Coin {
    /// Returns the ticker-style name of the coin.
    pub fn name(self) -> &'static str {
        match self {
            Coin::Bch => "BCH",
            Coin::Btc => "BTC",
            Coin::Ltc => "LTC",
            Coin::Alpha => "ALPHA",
        }
    }

    /// Looks a coin up by its exact name.
    pub fn from_name(name: &str) -> Option<Coin> {
        match name {
            "BCH" => Some(Coin::Bch),
            "BTC" => Some(Coin::Btc),
            "LTC" => Some(Coin::Ltc),
            "ALPHA" => Some(Coin::Alpha),
            _ => None,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_round_trip() {
        for network in Network::ALL {
            assert_eq!(Network::from_name(network.name()), Some(network));
            assert_eq!(network.to_string(), network.name());
        }
    }

    #[test]
    fn test_alternate_names() {
        assert_eq!(Network::from_name("mainnet"), Some(Network::Main));
        assert_eq!(Network::from_name("testnet3"), Some(Network::Test));
        assert_eq!(Network::from_name("signet"), Some(Network::Test));
        assert_eq!(Network::from_name("testnet4"), Some(Network::Test4));
        assert_eq!(Network::from_name("chipnet"), Some(Network::Chip));
    }

    #[test]
    fn test_case_insensitive_fallback() {
        assert_eq!(Network::from_name("ALPHA"), Some(Network::Alpha));
        assert_eq!(Network::from_name("AlphaTest"), Some(Network::AlphaTest));
        assert_eq!(Network::from_name("RegTest"), Some(Network::RegTest));
        assert_eq!(Network::from_name("nope"), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("alpha".parse::<Network>(), Ok(Network::Alpha));
        assert_eq!(
            "dogecoin".parse::<Network>(),
            Err(ChainTypeError::InvalidChainType("dogecoin".to_string()))
        );
        assert_eq!(Network::name_or_invalid(None), INVALID_NET_NAME);
        assert_eq!(Network::name_or_invalid(Some(Network::Chip)), "chip");
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        assert_eq!(
            serde_json::to_string(&Network::AlphaTest).unwrap(),
            "\"alphatest\""
        );
        assert_eq!(serde_json::to_string(&Network::RegTest).unwrap(), "\"regtest\"");
        assert_eq!(serde_json::to_string(&Coin::Alpha).unwrap(), "\"ALPHA\"");
    }

    #[test]
    fn test_coin_names_are_exact() {
        for coin in [Coin::Bch, Coin::Btc, Coin::Ltc, Coin::Alpha] {
            assert_eq!(Coin::from_name(coin.name()), Some(coin));
        }
        assert_eq!(Coin::from_name("btc"), None);
        assert_eq!(Network::Alpha.coin(), Some(Coin::Alpha));
        assert_eq!(Network::Main.coin(), None);
    }
}
