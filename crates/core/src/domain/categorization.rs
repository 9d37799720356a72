use crate::domain::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// Confidence attached to a single-transaction completion call.
pub const SINGLE_CALL_CONFIDENCE: f64 = 0.85;
/// Confidence attached to results read out of a batch completion reply.
pub const BATCH_CALL_CONFIDENCE: f64 = 0.8;
/// Confidence attached to the catch-all result after a failed call.
pub const FAILURE_CONFIDENCE: f64 = 0.0;

/// `category` is always a member of the taxonomy that produced it.
/// `confidence` labels the call path, it is not a probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    pub category: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    #[serde(flatten)]
    pub categorization: Categorization,
}

impl CategorizedTransaction {
    pub fn new(transaction: Transaction, categorization: Categorization) -> Self {
        Self {
            transaction,
            categorization,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::Direction;
    use serde_json::json;

    #[test]
    fn categorized_transaction_serializes_flat() {
        let item = CategorizedTransaction::new(
            Transaction::new("SWIGGY ORDER", 420.5, Direction::Debit),
            Categorization {
                category: "Food & Dining".to_string(),
                confidence: BATCH_CALL_CONFIDENCE,
            },
        );

        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({
                "description": "SWIGGY ORDER",
                "amount": 420.5,
                "type": "debit",
                "category": "Food & Dining",
                "confidence": 0.8,
            })
        );
    }
}
