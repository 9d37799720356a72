use anyhow::ensure;
use std::collections::BTreeSet;

pub const DEFAULT_CATEGORIES: [&str; 16] = [
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Entertainment",
    "Healthcare",
    "Utilities",
    "Insurance",
    "Investment",
    "Salary/Income",
    "Transfer",
    "ATM Withdrawal",
    "Online Services",
    "Education",
    "Travel",
    "Gifts",
    "Other",
];

pub const DEFAULT_CATCH_ALL: &str = "Other";

// (cues, category) pairs embedded in every prompt.
const DEFAULT_HINTS: [(&str, &str); 15] = [
    ("Zomato, Swiggy, restaurants, food delivery", "Food & Dining"),
    ("Uber, Ola, fuel, parking, metro", "Transportation"),
    ("Amazon, Flipkart, shopping malls, clothing", "Shopping"),
    ("Movies, games, streaming, entertainment", "Entertainment"),
    ("Hospitals, medicines, medical", "Healthcare"),
    ("Electricity, water, internet, phone bills", "Utilities"),
    ("Insurance companies", "Insurance"),
    ("Stock market, mutual funds, investments", "Investment"),
    ("Salary, income, payments received", "Salary/Income"),
    ("Bank transfers, NEFT, IMPS", "Transfer"),
    ("ATM withdrawals", "ATM Withdrawal"),
    ("Software, subscriptions, online services", "Online Services"),
    ("Schools, colleges, courses", "Education"),
    ("Hotels, flights, travel", "Travel"),
    ("Gifts, donations", "Gifts"),
];

/// Merchant/keyword cues that bias the model toward one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryHint {
    pub cues: String,
    pub category: String,
}

/// The closed, ordered output space of classification.
///
/// Order is load-bearing: fuzzy matching returns the first entry that matches.
/// The same value must be used for prompt construction and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    categories: Vec<String>,
    catch_all: String,
    hints: Vec<CategoryHint>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            catch_all: DEFAULT_CATCH_ALL.to_string(),
            hints: DEFAULT_HINTS
                .iter()
                .map(|(cues, category)| CategoryHint {
                    cues: cues.to_string(),
                    category: category.to_string(),
                })
                .collect(),
        }
    }
}

impl Taxonomy {
    pub fn new(
        categories: Vec<String>,
        catch_all: impl Into<String>,
        hints: Vec<CategoryHint>,
    ) -> anyhow::Result<Self> {
        let catch_all = catch_all.into();

        ensure!(!categories.is_empty(), "taxonomy must have at least one category");

        let mut seen = BTreeSet::<&str>::new();
        for category in &categories {
            ensure!(
                !category.trim().is_empty(),
                "taxonomy categories must be non-empty"
            );
            ensure!(
                seen.insert(category.as_str()),
                "duplicate taxonomy category: {category}"
            );
        }

        ensure!(
            seen.contains(catch_all.as_str()),
            "catch-all category {catch_all:?} is not in the taxonomy"
        );

        for hint in &hints {
            ensure!(
                seen.contains(hint.category.as_str()),
                "hint {:?} targets unknown category {:?}",
                hint.cues,
                hint.category
            );
        }

        Ok(Self {
            categories,
            catch_all,
            hints,
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn catch_all(&self) -> &str {
        &self.catch_all
    }

    pub fn hints(&self) -> &[CategoryHint] {
        &self.hints
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_taxonomy_is_valid() {
        let default = Taxonomy::default();
        assert_eq!(default.categories().len(), 16);
        assert_eq!(default.categories().last().map(String::as_str), Some("Other"));

        // Re-run validation over the built-in tables.
        let rebuilt = Taxonomy::new(
            default.categories().to_vec(),
            default.catch_all(),
            default.hints().to_vec(),
        )
        .unwrap();
        assert_eq!(rebuilt, default);
    }

    #[test]
    fn rejects_catch_all_outside_taxonomy() {
        let err = Taxonomy::new(labels(&["Food", "Travel"]), "Other", vec![]).unwrap_err();
        assert!(err.to_string().contains("catch-all"));
    }

    #[test]
    fn rejects_duplicate_categories() {
        assert!(Taxonomy::new(labels(&["Food", "Food", "Other"]), "Other", vec![]).is_err());
    }

    #[test]
    fn rejects_hint_for_unknown_category() {
        let hints = vec![CategoryHint {
            cues: "Uber".to_string(),
            category: "Transport".to_string(),
        }];
        assert!(Taxonomy::new(labels(&["Transportation", "Other"]), "Other", hints).is_err());
    }
}
