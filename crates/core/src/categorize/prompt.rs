use crate::domain::{Taxonomy, Transaction};
use crate::llm::CompletionRequest;
use std::fmt::Write;

pub const SINGLE_MAX_TOKENS: u32 = 10;
pub const BATCH_MAX_TOKENS: u32 = 500;
pub const TEMPERATURE: f32 = 0.1;

fn category_list(taxonomy: &Taxonomy) -> String {
    taxonomy.categories().join(", ")
}

fn hint_lines(taxonomy: &Taxonomy) -> String {
    let mut out = String::from("Common patterns to help you:");
    for hint in taxonomy.hints() {
        let _ = write!(out, "\n- {} → {}", hint.cues, hint.category);
    }
    out
}

pub fn single_prompt(taxonomy: &Taxonomy, tx: &Transaction) -> String {
    [
        format!(
            "Categorize this financial transaction into one of these categories: {}",
            category_list(taxonomy)
        ),
        String::new(),
        format!("Transaction Description: {}", tx.description),
        format!("Amount: {}", tx.amount),
        format!("Type: {}", tx.direction),
        String::new(),
        hint_lines(taxonomy),
        String::new(),
        "Return only the category name, nothing else.".to_string(),
    ]
    .join("\n")
}

/// Transactions are numbered from 1 in input order; the reply must follow that order.
pub fn batch_prompt(taxonomy: &Taxonomy, txs: &[Transaction]) -> String {
    let mut out = format!(
        "Categorize these {} financial transactions into one of these categories: {}\n\n{}\n\nTransactions:",
        txs.len(),
        category_list(taxonomy),
        hint_lines(taxonomy)
    );
    for (idx, tx) in txs.iter().enumerate() {
        let _ = write!(
            out,
            "\n{}. {} (Amount: {}, Type: {})",
            idx + 1,
            tx.description,
            tx.amount,
            tx.direction
        );
    }
    out.push_str(
        "\n\nReturn a JSON array with category names in the same order as the transactions.",
    );
    out
}

pub fn single_request(taxonomy: &Taxonomy, tx: &Transaction) -> CompletionRequest {
    CompletionRequest {
        prompt: single_prompt(taxonomy, tx),
        max_tokens: SINGLE_MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

pub fn batch_request(taxonomy: &Taxonomy, txs: &[Transaction]) -> CompletionRequest {
    CompletionRequest {
        prompt: batch_prompt(taxonomy, txs),
        max_tokens: BATCH_MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}
