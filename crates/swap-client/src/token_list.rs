//! Static token list used for token lookup and autocomplete.

use {
    alloy::primitives::Address,
    anyhow::{Context, Result},
    model::token::Token,
    serde::Deserialize,
    std::path::Path,
};

const EMBEDDED_LIST: &str = include_str!("assets/tokens.json");

pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    /// The list shipped with the binary.
    pub fn embedded(chain_id: u64) -> Result<Self> {
        Self::from_json(EMBEDDED_LIST, chain_id)
    }

    pub fn from_path(path: &Path, chain_id: u64) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("could not read token list {}", path.display()))?;
        Self::from_json(&json, chain_id)
    }

    fn from_json(json: &str, chain_id: u64) -> Result<Self> {
        let model: TokenListModel =
            serde_json::from_str(json).context("invalid token list json")?;
        tracing::debug!(name = %model.name, "loaded token list");
        Ok(Self::from_tokens(model.tokens, chain_id))
    }

    fn from_tokens(tokens: Vec<TokenModel>, chain_id: u64) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .filter(|token| token.chain_id == chain_id)
                .map(|token| token.token)
                .collect(),
        }
    }

    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn get(&self, address: &Address) -> Option<&Token> {
        self.tokens.iter().find(|token| token.address == *address)
    }

    /// Looks a token up by its symbol, ignoring case.
    pub fn find(&self, symbol: &str) -> Option<&Token> {
        self.tokens
            .iter()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn all(&self) -> &[Token] {
        &self.tokens
    }
}

/// Relevant parts of TokenList schema as defined in https://uniswap.org/tokenlist.schema.json
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct TokenListModel {
    name: String,
    tokens: Vec<TokenModel>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct TokenModel {
    chain_id: u64,
    #[serde(flatten)]
    token: Token,
}

/// Autocomplete over the token list by symbol prefix.
pub struct TokenFilter {
    tokens: Vec<Token>,
}

impl TokenFilter {
    /// With `without_eth` the native asset is not offered, e.g. for limit
    /// orders which only support ERC-20 tokens.
    pub fn new(list: &TokenList, without_eth: bool) -> Self {
        Self {
            tokens: list
                .all()
                .iter()
                .filter(|token| !(without_eth && token.symbol == "ETH"))
                .cloned()
                .collect(),
        }
    }

    /// Tokens whose symbol starts with `value`, ignoring case.
    pub fn filter(&self, value: &str) -> Vec<&Token> {
        let value = value.to_lowercase();
        self.tokens
            .iter()
            .filter(|token| token.symbol.to_lowercase().starts_with(&value))
            .collect()
    }

    pub fn display(token: Option<&Token>) -> String {
        token.map(|token| token.symbol.clone()).unwrap_or_default()
    }
}
