//! Selection of the router function and token path for a swap.

use {
    alloy::{
        primitives::{Address, Bytes, U256},
        sol_types::SolCall,
    },
    anyhow::{Result, ensure},
    contracts::alloy::SushiSwapRouter::SushiSwapRouter::{
        swapExactETHForTokensCall,
        swapExactTokensForETHCall,
        swapExactTokensForTokensCall,
    },
    model::token::NATIVE_TOKEN,
};

/// How a token relates to the chain's native asset.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TokenKind {
    Native,
    Wrapped,
    Standard,
}

impl TokenKind {
    pub fn of(token: Address, wrapped_native: Address) -> Self {
        if token == NATIVE_TOKEN {
            Self::Native
        } else if token == wrapped_native {
            Self::Wrapped
        } else {
            Self::Standard
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum SwapRoute {
    /// `swapExactETHForTokens` over `[wrapped, second]`.
    NativeIn,
    /// `swapExactTokensForETH` over `[first, wrapped]`.
    NativeOut,
    /// `swapExactTokensForTokens` over `[first, second]`.
    Direct,
    /// `swapExactTokensForTokens` over `[first, wrapped, second]`.
    ViaWrapped,
}

impl SwapRoute {
    pub fn select(first: TokenKind, second: TokenKind) -> Self {
        match (first, second) {
            (TokenKind::Native, _) => Self::NativeIn,
            (_, TokenKind::Native) => Self::NativeOut,
            (TokenKind::Wrapped, _) | (_, TokenKind::Wrapped) => Self::Direct,
            (TokenKind::Standard, TokenKind::Standard) => Self::ViaWrapped,
        }
    }

    /// The token path handed to the router. Fails for paths the router can't
    /// execute, like swapping a token for itself.
    pub fn path(&self, first: Address, second: Address, wrapped: Address) -> Result<Vec<Address>> {
        let path = match self {
            Self::NativeIn => vec![wrapped, second],
            Self::NativeOut => vec![first, wrapped],
            Self::Direct => vec![first, second],
            Self::ViaWrapped => vec![first, wrapped, second],
        };
        ensure!(
            !path.contains(&NATIVE_TOKEN),
            "native asset can't be routed through the {self} route"
        );
        ensure!(
            path.windows(2).all(|hop| hop[0] != hop[1]),
            "degenerate swap path {path:?}"
        );
        Ok(path)
    }
}

/// Everything besides the route and path that goes into a router call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SwapParameters {
    /// Ignored for [`SwapRoute::NativeIn`] where the input is the
    /// transaction's value.
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub recipient: Address,
    /// Unix timestamp in seconds.
    pub deadline: U256,
}

/// ABI encodes the router call for `route`.
pub fn encode(route: SwapRoute, path: Vec<Address>, parameters: &SwapParameters) -> Bytes {
    let data = match route {
        SwapRoute::NativeIn => swapExactETHForTokensCall {
            amountOutMin: parameters.amount_out_min,
            path,
            to: parameters.recipient,
            deadline: parameters.deadline,
        }
        .abi_encode(),
        SwapRoute::NativeOut => swapExactTokensForETHCall {
            amountIn: parameters.amount_in,
            amountOutMin: parameters.amount_out_min,
            path,
            to: parameters.recipient,
            deadline: parameters.deadline,
        }
        .abi_encode(),
        SwapRoute::Direct | SwapRoute::ViaWrapped => swapExactTokensForTokensCall {
            amountIn: parameters.amount_in,
            amountOutMin: parameters.amount_out_min,
            path,
            to: parameters.recipient,
            deadline: parameters.deadline,
        }
        .abi_encode(),
    };
    data.into()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        hex_literal::hex,
        testlib::tokens::{DAI, SUSHI, USDC, WETH},
    };

    #[test]
    fn route_follows_native_then_wrapped_precedence() {
        use TokenKind::*;
        assert_eq!(SwapRoute::select(Native, Standard), SwapRoute::NativeIn);
        assert_eq!(SwapRoute::select(Native, Wrapped), SwapRoute::NativeIn);
        assert_eq!(SwapRoute::select(Standard, Native), SwapRoute::NativeOut);
        assert_eq!(SwapRoute::select(Wrapped, Native), SwapRoute::NativeOut);
        assert_eq!(SwapRoute::select(Wrapped, Standard), SwapRoute::Direct);
        assert_eq!(SwapRoute::select(Standard, Wrapped), SwapRoute::Direct);
        assert_eq!(SwapRoute::select(Standard, Standard), SwapRoute::ViaWrapped);
    }

    #[test]
    fn paths() {
        assert_eq!(
            SwapRoute::NativeIn.path(NATIVE_TOKEN, SUSHI, WETH).unwrap(),
            [WETH, SUSHI]
        );
        assert_eq!(
            SwapRoute::NativeOut.path(DAI, NATIVE_TOKEN, WETH).unwrap(),
            [DAI, WETH]
        );
        assert_eq!(SwapRoute::Direct.path(WETH, USDC, WETH).unwrap(), [WETH, USDC]);
        assert_eq!(
            SwapRoute::ViaWrapped.path(DAI, USDC, WETH).unwrap(),
            [DAI, WETH, USDC]
        );
    }

    #[test]
    fn rejects_degenerate_paths() {
        assert!(SwapRoute::NativeIn.path(NATIVE_TOKEN, WETH, WETH).is_err());
        assert!(SwapRoute::NativeIn.path(NATIVE_TOKEN, NATIVE_TOKEN, WETH).is_err());
        assert!(SwapRoute::Direct.path(WETH, WETH, WETH).is_err());
    }

    #[test]
    fn native_in_encodes_swap_exact_eth_for_tokens() {
        let parameters = SwapParameters {
            amount_in: U256::from(1_000),
            amount_out_min: U256::ONE,
            recipient: Address::with_last_byte(7),
            deadline: U256::from(1_700_000_000),
        };
        let data = encode(SwapRoute::NativeIn, vec![WETH, SUSHI], &parameters);

        assert_eq!(data[..4], hex!("7ff36ab5"));
        let call = swapExactETHForTokensCall::abi_decode(&data).unwrap();
        assert_eq!(call.path, [WETH, SUSHI]);
        assert_eq!(call.amountOutMin, U256::ONE);
        assert_eq!(call.to, parameters.recipient);
        assert_eq!(call.deadline, parameters.deadline);
    }

    #[test]
    fn token_routes_encode_amount_in() {
        let parameters = SwapParameters {
            amount_in: U256::from(5),
            amount_out_min: U256::from(2),
            recipient: Address::with_last_byte(7),
            deadline: U256::from(10),
        };

        let data = encode(SwapRoute::NativeOut, vec![DAI, WETH], &parameters);
        let call = swapExactTokensForETHCall::abi_decode(&data).unwrap();
        assert_eq!((call.amountIn, call.amountOutMin), (U256::from(5), U256::from(2)));

        let data = encode(SwapRoute::ViaWrapped, vec![DAI, WETH, USDC], &parameters);
        let call = swapExactTokensForTokensCall::abi_decode(&data).unwrap();
        assert_eq!(call.path, [DAI, WETH, USDC]);
        assert_eq!(call.amountIn, U256::from(5));
    }
}
