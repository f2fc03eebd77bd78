pub mod networks {
    pub const MAINNET: u64 = 1;
}

crate::bindings!(
    ERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
);

crate::bindings!(
    IUniswapLikePair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function getReserves()
            external
            view
            returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
);

crate::bindings!(
    SushiSwapRouter {
        function factory() external view returns (address);
        function WETH() external view returns (address);
        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);
        function swapExactETHForTokens(
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external payable returns (uint256[] memory amounts);
        function swapTokensForExactETH(
            uint256 amountOut,
            uint256 amountInMax,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);
        function swapExactTokensForETH(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);
    },
    maplit::hashmap! {
        MAINNET => address!("d9e1cE17f2641f24aE83637ab66a2cca9C378B9F"),
    }
);

crate::bindings!(
    Settlement {
        function hashOfOrder(
            address maker,
            address fromToken,
            address toToken,
            uint256 amountIn,
            uint256 amountOutMin,
            address recipient,
            uint256 deadline
        ) external view returns (bytes32);
    }
);

crate::bindings!(
    OrderBook {
        struct Order {
            address maker;
            address fromToken;
            address toToken;
            uint256 amountIn;
            uint256 amountOutMin;
            address recipient;
            uint256 deadline;
            uint8 v;
            bytes32 r;
            bytes32 s;
        }

        function createOrder(Order memory order) external;
    }
);

pub use alloy::providers::DynProvider as Provider;

/// Extension trait to attach some useful functions to the contract instance.
pub trait InstanceExt: Sized {
    /// Crates a contract instance at the expected address for the current
    /// network.
    fn deployed(
        provider: &Provider,
    ) -> impl std::future::Future<Output = anyhow::Result<Self>> + Send;
}

/// Generates bindings for a contract from its Solidity interface, optionally
/// with the addresses it is deployed at per chain id.
#[macro_export]
macro_rules! bindings {
    ($contract:ident { $($interface:tt)* } $(, $deployment_info:expr)? $(,)?) => {
        paste::paste! {
            // Generate the main bindings in a private module. That allows
            // us to re-export all items in our own module while also adding
            // some items ourselves.
            #[allow(non_snake_case)]
            mod [<$contract Private>] {
                alloy::sol! {
                    #[allow(missing_docs)]
                    #[sol(rpc)]
                    interface $contract {
                        $($interface)*
                    }
                }
            }

            #[allow(non_snake_case)]
            pub mod $contract {
                use alloy::providers::DynProvider;

                pub use super::[<$contract Private>]::*;
                pub type Instance = $contract::[<$contract Instance>]<DynProvider>;

                $(
                use {
                    std::{sync::LazyLock, collections::HashMap},
                    alloy::{
                        providers::Provider,
                        primitives::{address, Address},
                    },
                    anyhow::{Context, Result},
                    $crate::alloy::networks::*,
                };

                pub static DEPLOYMENT_INFO: LazyLock<HashMap<u64, Address>> = LazyLock::new(|| {
                    $deployment_info
                });

                impl $crate::alloy::InstanceExt for Instance {
                    fn deployed(provider: &DynProvider) -> impl Future<Output = Result<Self>> + Send {
                        async move {
                            let chain_id = provider
                                .get_chain_id()
                                .await
                                .context("could not fetch current chain id")?;
                            let address = DEPLOYMENT_INFO
                                .get(&chain_id)
                                .with_context(|| format!("no deployment info for chain {chain_id:?}"))?;

                            Ok(Instance::new(
                                *address,
                                provider.clone(),
                            ))
                        }
                    }
                }
                )*
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::{Address, U256},
            sol_types::SolCall,
        },
    };

    #[test]
    fn router_deployment_is_known_on_mainnet() {
        assert_eq!(
            SushiSwapRouter::DEPLOYMENT_INFO.get(&networks::MAINNET),
            Some(&testlib::protocol::SUSHISWAP_ROUTER)
        );
    }

    #[test]
    fn router_selectors_match_uniswap_v2() {
        assert_eq!(
            SushiSwapRouter::SushiSwapRouter::swapExactETHForTokensCall::SELECTOR,
            [0x7f, 0xf3, 0x6a, 0xb5]
        );
        assert_eq!(
            SushiSwapRouter::SushiSwapRouter::swapExactTokensForTokensCall::SELECTOR,
            [0x38, 0xed, 0x17, 0x39]
        );
        assert_eq!(
            SushiSwapRouter::SushiSwapRouter::swapExactTokensForETHCall::SELECTOR,
            [0x18, 0xcb, 0xaf, 0xe5]
        );
        assert_eq!(
            SushiSwapRouter::SushiSwapRouter::swapTokensForExactETHCall::SELECTOR,
            [0x4a, 0x25, 0xd9, 0x4a]
        );
    }

    #[test]
    fn erc20_approve_selector() {
        let call = ERC20::ERC20::approveCall {
            spender: Address::with_last_byte(1),
            amount: U256::MAX,
        };
        assert_eq!(&call.abi_encode()[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
    }
}
