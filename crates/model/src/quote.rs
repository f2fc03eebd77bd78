use {serde::Serialize, std::collections::BTreeMap};

/// Mid-prices of the selected tokens keyed by token symbol.
///
/// Every price is denominated in the wrapped native token.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TradeQuote {
    pub tokens: BTreeMap<String, String>,
}

impl TradeQuote {
    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.tokens.get(symbol).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl FromIterator<(String, String)> for TradeQuote {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}
