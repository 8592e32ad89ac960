/// Fixed association table: lowercase name fragment → known SKU list. A
/// substring match on the venue name forces `is_chain=true`,
/// `chain_confidence=95`, and fixes the product list.
#[derive(Debug, Clone)]
pub struct VerifiedChainTable {
    entries: Vec<(String, Vec<String>)>,
}

impl VerifiedChainTable {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    /// Known chains that serve planted products: Birdie Birdie is a
    /// Berlin-based plant-based fried chicken chain.
    pub fn default_table() -> Self {
        Self::new(vec![(
            "birdie birdie".to_string(),
            vec![
                "planted.chicken_burger".to_string(),
                "planted.chicken_tenders".to_string(),
            ],
        )])
    }

    pub fn lookup(&self, venue_name: &str) -> Option<&[String]> {
        let lower = venue_name.to_lowercase();
        self.entries
            .iter()
            .find(|(fragment, _)| lower.contains(fragment.as_str()))
            .map(|(_, skus)| skus.as_slice())
    }
}

/// Fixed block-list of venue names (case-insensitive) known to misuse the
/// brand name without actually serving it.
#[derive(Debug, Clone)]
pub struct BrandMisuseBlockList {
    entries: Vec<String>,
}

impl BrandMisuseBlockList {
    pub fn new(entries: Vec<String>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    pub fn default_list() -> Self {
        Self::new(vec!["goldies smashburger".to_string()])
    }

    pub fn is_blocked(&self, venue_name: &str) -> bool {
        let lower = venue_name.to_lowercase();
        self.entries.iter().any(|e| lower.contains(e.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verified_chain_matches_by_fragment() {
        let table = VerifiedChainTable::default_table();
        let skus = table.lookup("Birdie Birdie Prenzlauer Berg").unwrap();
        assert_eq!(skus.len(), 2);
        assert!(skus.contains(&"planted.chicken_burger".to_string()));
    }

    #[test]
    fn block_list_matches_case_insensitively() {
        let list = BrandMisuseBlockList::default_list();
        assert!(list.is_blocked("goldies SMASHBURGER"));
        assert!(!list.is_blocked("Birdie Birdie"));
    }
}
