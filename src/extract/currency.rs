//! Ordered currency resolution
//!
//! Salary strings name their currency in wildly inconsistent ways (symbols,
//! codes, local abbreviations). Resolution runs an explicit ordered list of
//! resolver functions and takes the first hit; order matters because some
//! markers are substrings of others ("s$" before "$").

/// A single resolver: inspects lowercased salary text, returns an ISO code
pub type CurrencyResolver = Box<dyn Fn(&str) -> Option<&'static str> + Send + Sync>;

/// An ordered chain of currency resolvers, first non-None wins
pub struct CurrencyChain {
    resolvers: Vec<CurrencyResolver>,
}

impl CurrencyChain {
    /// An empty chain; resolvers run in push order
    pub fn new() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    pub fn push(&mut self, resolver: CurrencyResolver) {
        self.resolvers.push(resolver);
    }

    /// Resolves the currency for a salary string, if any resolver matches
    pub fn resolve(&self, salary_text: &str) -> Option<&'static str> {
        let lowered = salary_text.to_lowercase();
        self.resolvers.iter().find_map(|resolver| resolver(&lowered))
    }

    /// The standard chain covering the markets the built-in profiles target
    pub fn standard() -> Self {
        let mut chain = Self::new();
        chain.push(marker_resolver(&["s$", "sgd"], "SGD"));
        chain.push(marker_resolver(&["đ", "₫", "vnd"], "VND"));
        chain.push(marker_resolver(&["rm", "myr"], "MYR"));
        chain.push(marker_resolver(&["₱", "php"], "PHP"));
        chain.push(marker_resolver(&["rp", "idr"], "IDR"));
        chain.push(marker_resolver(&["ks", "mmk", "kyat"], "MMK"));
        chain.push(marker_resolver(&["$", "usd"], "USD"));
        chain
    }
}

impl Default for CurrencyChain {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builds a resolver that matches any of `markers` as a substring
fn marker_resolver(markers: &'static [&'static str], code: &'static str) -> CurrencyResolver {
    Box::new(move |text| {
        if markers.iter().any(|marker| text.contains(marker)) {
            Some(code)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_resolution() {
        let chain = CurrencyChain::standard();
        assert_eq!(chain.resolve("15,000,000 ₫ / month"), Some("VND"));
        assert_eq!(chain.resolve("Up to $2,500"), Some("USD"));
        assert_eq!(chain.resolve("RM 8,000 - RM 12,000"), Some("MYR"));
        assert_eq!(chain.resolve("800 Ks daily"), Some("MMK"));
    }

    #[test]
    fn test_order_matters_for_overlapping_markers() {
        // "S$" contains "$"; the SGD resolver must run first.
        let chain = CurrencyChain::standard();
        assert_eq!(chain.resolve("S$4,000 - S$6,000"), Some("SGD"));
    }

    #[test]
    fn test_no_match_is_none() {
        let chain = CurrencyChain::standard();
        assert_eq!(chain.resolve("negotiable"), None);
        assert_eq!(chain.resolve(""), None);
    }

    #[test]
    fn test_custom_resolver_ordering() {
        let mut chain = CurrencyChain::new();
        chain.push(marker_resolver(&["eur", "€"], "EUR"));
        chain.push(marker_resolver(&["€"], "XXX"));
        assert_eq!(chain.resolve("€1,000"), Some("EUR"));
    }
}
