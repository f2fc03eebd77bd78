use {
    alloy::primitives::{Address, keccak256},
    model::TokenPair,
};

/// Derives pair addresses of a Uniswap V2 like factory without any node
/// requests.
#[derive(Clone, Copy, Debug)]
pub struct PairProvider {
    pub factory: Address,
    pub init_code_digest: [u8; 32],
}

impl PairProvider {
    pub fn pair_address(&self, pair: &TokenPair) -> Address {
        let (token0, token1) = pair.get();

        // https://uniswap.org/docs/v2/javascript-SDK/getting-pair-addresses/
        let salt = {
            let mut buffer = [0u8; 40];
            buffer[0..20].copy_from_slice(token0.as_slice());
            buffer[20..40].copy_from_slice(token1.as_slice());
            keccak256(buffer)
        };
        create2_target_address(self.factory, &salt, &self.init_code_digest)
    }
}

fn create2_target_address(
    creator: Address,
    salt: &[u8; 32],
    init_code_digest: &[u8; 32],
) -> Address {
    let mut preimage = [0xff; 85];
    preimage[1..21].copy_from_slice(creator.as_slice());
    preimage[21..53].copy_from_slice(salt);
    preimage[53..85].copy_from_slice(init_code_digest);
    Address::from_slice(&keccak256(preimage)[12..])
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::sources::uniswap_v2::{SUSHISWAP_INIT, UNISWAP_INIT},
        alloy::primitives::address,
        testlib::tokens::{GNO, SUSHI, WETH},
    };

    #[test]
    fn uniswap_pair_address() {
        // https://info.uniswap.org/pair/0x3e8468f66d30fc99f745481d4b383f89861702c6
        let provider = PairProvider {
            factory: address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f"),
            init_code_digest: UNISWAP_INIT.0,
        };
        let pair = TokenPair::new(GNO, WETH).unwrap();
        assert_eq!(
            provider.pair_address(&pair),
            address!("3e8468f66d30fc99f745481d4b383f89861702c6")
        );
    }

    #[test]
    fn sushiswap_pair_address() {
        // https://etherscan.io/address/0x795065dcc9f64b5614c407a6efdc400da6221fb0
        let provider = PairProvider {
            factory: testlib::protocol::SUSHISWAP_FACTORY,
            init_code_digest: SUSHISWAP_INIT.0,
        };
        let pair = TokenPair::new(SUSHI, WETH).unwrap();
        assert_eq!(
            provider.pair_address(&pair),
            address!("795065dCc9f64b5614C407a6EFDC400DA6221FB0")
        );
    }
}
