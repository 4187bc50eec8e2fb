// Currency pair domain model
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static PAIR_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}/[A-Z]{3}$").expect("pair name pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pair {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl Pair {
    pub fn new(id: i64, name: String, description: String) -> Self {
        Self {
            id,
            name,
            description,
        }
    }
}

/// Checks the `ABC/DEF` naming convention used for user-submitted pairs.
///
/// The store itself accepts any unique name; only the submission flow
/// enforces this.
pub fn is_valid_pair_name(name: &str) -> bool {
    PAIR_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_name_convention() {
        assert!(is_valid_pair_name("EUR/USD"));
        assert!(is_valid_pair_name("XYZ/FKE"));

        assert!(!is_valid_pair_name("EURUSD"));
        assert!(!is_valid_pair_name("eur/usd"));
        assert!(!is_valid_pair_name("EUR/USDX"));
        assert!(!is_valid_pair_name(" EUR/USD"));
        assert!(!is_valid_pair_name(""));
    }
}
