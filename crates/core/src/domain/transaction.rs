use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Credit => f.write_str("credit"),
            Direction::Debit => f.write_str("debit"),
        }
    }
}

/// A caller-supplied transaction. Batch results are correlated by list position only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub direction: Direction,
}

impl Transaction {
    pub fn new(description: impl Into<String>, amount: f64, direction: Direction) -> Self {
        Self {
            description: description.into(),
            amount,
            direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn direction_is_read_from_type_key() {
        let tx: Transaction = serde_json::from_value(json!({
            "description": "UBER TRIP 482",
            "amount": 350,
            "type": "debit",
        }))
        .unwrap();
        assert_eq!(tx.direction, Direction::Debit);
        assert_eq!(tx.amount, 350.0);
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let res = serde_json::from_value::<Transaction>(json!({
            "description": "x",
            "amount": 1.0,
            "type": "refund",
        }));
        assert!(res.is_err());
    }
}
