use {
    alloy::primitives::Address,
    serde::{Deserialize, Serialize},
};

/// Address used to represent the chain's native asset.
pub const NATIVE_TOKEN: Address = Address::ZERO;

/// Static reference data of a token as found in a token list.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    #[serde(default, rename = "logoURI", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}

impl Token {
    /// The chain's native asset (Ether on mainnet).
    pub fn native() -> Self {
        Self {
            address: NATIVE_TOKEN,
            symbol: "ETH".to_string(),
            name: "Ethereum".to_string(),
            decimals: 18,
            logo_uri: None,
        }
    }

    pub fn is_native(&self) -> bool {
        self.address == NATIVE_TOKEN
    }
}

#[cfg(test)]
mod tests {
    use {super::*, testlib::tokens::USDC};

    #[test]
    fn deserializes_token_list_entry() {
        let token: Token = serde_json::from_str(
            r#"{
                "address": "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
                "symbol": "USDC",
                "name": "USD Coin",
                "decimals": 6,
                "logoURI": "ipfs://QmXfzKRvjZz3u5JRgC4v5mGVbm9ahrUiB4DgzHBsnWbTMM"
            }"#,
        )
        .unwrap();
        assert_eq!(token.address, USDC);
        assert_eq!(token.decimals, 6);
        assert!(!token.is_native());
    }

    #[test]
    fn native_token_uses_zero_address() {
        let eth = Token::native();
        assert!(eth.is_native());
        assert_eq!(eth.symbol, "ETH");
        assert_eq!(eth.decimals, 18);
    }
}
