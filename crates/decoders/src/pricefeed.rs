//! Price-feed lookup by synthetic token symbol.
//!
//! Some synthetics track the reciprocal of the off-chain feed they are priced
//! from (e.g. `yUSD` is priced from USD/ETH). The registry records, per token
//! symbol fragment, which feed backs the token and whether it is inverted.

/// Decides whether a token's off-chain price feed is inverted.
pub trait InversionPredicate: Send + Sync {
    /// An absent or unknown symbol is never inverted.
    fn is_inverted(&self, token_symbol: Option<&str>) -> bool;
}

impl<F> InversionPredicate for F
where
    F: Fn(Option<&str>) -> bool + Send + Sync,
{
    fn is_inverted(&self, token_symbol: Option<&str>) -> bool {
        self(token_symbol)
    }
}

/// Parameters of the off-chain feed backing a synthetic token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFeedParams {
    /// Substring of the token symbol that selects this feed
    pub symbol_fragment: String,
    /// Feed name (e.g. `usdeth`)
    pub feed: String,
    /// Whether the synthetic's price is the reciprocal of the feed's
    pub inverted_price: bool,
}

impl PriceFeedParams {
    pub fn new(symbol_fragment: &str, feed: &str, inverted_price: bool) -> Self {
        Self {
            symbol_fragment: symbol_fragment.to_string(),
            feed: feed.to_string(),
            inverted_price,
        }
    }
}

/// Ordered symbol-fragment rules; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct PriceFeedRegistry {
    feeds: Vec<PriceFeedParams>,
}

impl PriceFeedRegistry {
    /// Create a registry with the known EMP price feeds.
    pub fn new() -> Self {
        Self {
            feeds: vec![
                PriceFeedParams::new("yCOMP", "compusd", false),
                PriceFeedParams::new("ETHBTC", "ethbtc", false),
                PriceFeedParams::new("yUSD", "usdeth", true),
            ],
        }
    }

    /// Create a registry with no rules.
    pub fn empty() -> Self {
        Self { feeds: Vec::new() }
    }

    /// Append a rule. Earlier rules take precedence.
    pub fn with_feed(mut self, params: PriceFeedParams) -> Self {
        self.feeds.push(params);
        self
    }

    /// Append inverted rules for extra symbol fragments (from configuration).
    pub fn with_inverted_symbols<S: AsRef<str>>(mut self, fragments: &[S]) -> Self {
        for fragment in fragments {
            let fragment = fragment.as_ref();
            tracing::debug!(fragment, "Registered inverted price feed");
            self.feeds
                .push(PriceFeedParams::new(fragment, &fragment.to_lowercase(), true));
        }
        self
    }

    /// Find the feed backing a token symbol.
    pub fn lookup(&self, token_symbol: &str) -> Option<&PriceFeedParams> {
        self.feeds
            .iter()
            .find(|params| token_symbol.contains(params.symbol_fragment.as_str()))
    }
}

impl Default for PriceFeedRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InversionPredicate for PriceFeedRegistry {
    fn is_inverted(&self, token_symbol: Option<&str>) -> bool {
        token_symbol
            .and_then(|symbol| self.lookup(symbol))
            .is_some_and(|params| params.inverted_price)
    }
}
