use serde::Serialize;

use crate::alpha::network::Network;

/// Chain parameters consumed by the header chain layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Params {
    /// Network for which these parameters are defined.
    pub network: Network,
    /// The block height at which RandomX (the alternate proof-of-work)
    /// becomes active. `None` on chains that never switch.
    pub randomx_height: Option<u32>,
}

impl Params {
    /// Parameters for Bitcoin-family mainnet.
    pub const MAIN: Self = Self::sha256d_only(Network::Main);
    /// Parameters for testnet3.
    pub const TEST: Self = Self::sha256d_only(Network::Test);
    /// Parameters for testnet4.
    pub const TEST4: Self = Self::sha256d_only(Network::Test4);
    /// Parameters for scalenet.
    pub const SCALE: Self = Self::sha256d_only(Network::Scale);
    /// Parameters for regtest.
    pub const REGTEST: Self = Self::sha256d_only(Network::RegTest);
    /// Parameters for chipnet.
    pub const CHIP: Self = Self::sha256d_only(Network::Chip);
    /// Parameters for Unicity Alpha mainnet.
    pub const ALPHA: Self = Self {
        network: Network::Alpha,
        randomx_height: Some(70_228), // 953181e5afbf5a0052bdf405d6a23360ba6afa9c4a5bb2eda4a9b8f5de52fdcc
    };
    /// Parameters for Unicity Alpha testnet.
    pub const ALPHA_TEST: Self = Self {
        network: Network::AlphaTest,
        randomx_height: Some(1), // Always active
    };

    const fn sha256d_only(network: Network) -> Self {
        Self {
            network,
            randomx_height: None,
        }
    }

    /// Returns the same parameters with a different activation height.
    pub const fn with_randomx_height(self, randomx_height: Option<u32>) -> Self {
        Self {
            randomx_height,
            ..self
        }
    }

    /// Whether the alternate proof-of-work is expected at `height`.
    ///
    /// Negative heights never are.
    pub fn is_randomx_active(&self, height: i64) -> bool {
        self.randomx_height
            .is_some_and(|activation| height >= i64::from(activation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_boundary() {
        let params = Params::ALPHA;
        assert!(!params.is_randomx_active(-1));
        assert!(!params.is_randomx_active(0));
        assert!(!params.is_randomx_active(70_227));
        assert!(params.is_randomx_active(70_228));
        assert!(params.is_randomx_active(1_000_000));
    }

    #[test]
    fn test_sha256d_networks_never_activate() {
        for network in [Network::Main, Network::Test, Network::RegTest, Network::Chip] {
            let params = network.consensus_params();
            assert_eq!(params.network, network);
            assert!(!params.is_randomx_active(i64::from(u32::MAX)));
        }
    }

    #[test]
    fn test_override_activation_height() {
        let params = Params::REGTEST.with_randomx_height(Some(10));
        assert_eq!(params.network, Network::RegTest);
        assert!(!params.is_randomx_active(9));
        assert!(params.is_randomx_active(10));
        assert!(Params::ALPHA_TEST.is_randomx_active(1));
        assert!(!Params::ALPHA_TEST.is_randomx_active(0));
    }
}
