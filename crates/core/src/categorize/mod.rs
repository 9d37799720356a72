pub mod normalize;
pub mod prompt;

use crate::domain::categorization::{
    BATCH_CALL_CONFIDENCE, FAILURE_CONFIDENCE, SINGLE_CALL_CONFIDENCE,
};
use crate::domain::{Categorization, Taxonomy, Transaction};
use crate::llm::{json, CompletionClient};
use std::fmt;
use std::sync::Arc;

pub use normalize::normalize;

/// Maximum number of transactions sent in one batch completion call.
pub const DEFAULT_CHUNK_SIZE: usize = 50;

#[derive(Debug)]
pub enum CategorizeError {
    /// The completion call itself failed (transport, HTTP status, response shape).
    Completion(anyhow::Error),
    /// A batch reply could not be read as a list of categories.
    Parse {
        detail: String,
        raw_output: String,
    },
    /// A batch reply listed a different number of categories than transactions sent.
    LengthMismatch { expected: usize, got: usize },
}

impl fmt::Display for CategorizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategorizeError::Completion(err) => write!(f, "completion call failed: {err:#}"),
            CategorizeError::Parse { detail, .. } => write!(f, "unreadable batch reply: {detail}"),
            CategorizeError::LengthMismatch { expected, got } => write!(
                f,
                "batch reply has {got} categories for {expected} transactions"
            ),
        }
    }
}

impl std::error::Error for CategorizeError {}

impl CategorizeError {
    /// Whether the failure is confined to reading a batch reply, so the chunk can
    /// be retried one transaction at a time.
    pub fn is_batch_reply_error(&self) -> bool {
        matches!(
            self,
            CategorizeError::Parse { .. } | CategorizeError::LengthMismatch { .. }
        )
    }
}

/// Stateless categorization pipeline. Cheap to share behind an `Arc`.
#[derive(Clone)]
pub struct Categorizer {
    client: Arc<dyn CompletionClient>,
    taxonomy: Arc<Taxonomy>,
    chunk_size: usize,
}

impl fmt::Debug for Categorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Categorizer")
            .field("provider", &self.client.provider())
            .field("categories", &self.taxonomy.categories().len())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl Categorizer {
    pub fn new(client: Arc<dyn CompletionClient>, taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            client,
            taxonomy,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// One completion call for one transaction.
    pub async fn try_categorize(
        &self,
        tx: &Transaction,
    ) -> Result<Categorization, CategorizeError> {
        let req = prompt::single_request(&self.taxonomy, tx);
        let reply = self
            .client
            .complete(req)
            .await
            .map_err(CategorizeError::Completion)?;

        Ok(Categorization {
            category: normalize(&self.taxonomy, &reply).to_string(),
            confidence: SINGLE_CALL_CONFIDENCE,
        })
    }

    /// Like [`Categorizer::try_categorize`], but any failure degrades to the catch-all.
    pub async fn categorize(&self, tx: &Transaction) -> Categorization {
        match self.try_categorize(tx).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    description = %tx.description,
                    error = %err,
                    "categorization failed; using catch-all category"
                );
                self.failure()
            }
        }
    }

    /// Categorizes `txs` in chunks. The result has the same length and order as `txs`.
    ///
    /// A chunk whose reply cannot be read (or lines up with the wrong number of
    /// transactions) is redone with one call per transaction. A failed chunk call is
    /// returned as an error.
    pub async fn categorize_batch(
        &self,
        txs: &[Transaction],
    ) -> Result<Vec<Categorization>, CategorizeError> {
        let mut out = Vec::with_capacity(txs.len());

        for (chunk_idx, chunk) in txs.chunks(self.chunk_size).enumerate() {
            match self.categorize_chunk(chunk).await {
                Ok(results) => out.extend(results),
                Err(err) if err.is_batch_reply_error() => {
                    tracing::warn!(
                        chunk = chunk_idx,
                        chunk_len = chunk.len(),
                        error = %err,
                        "batch reply unusable; falling back to per-transaction calls"
                    );
                    if let CategorizeError::Parse { raw_output, .. } = &err {
                        tracing::debug!(chunk = chunk_idx, %raw_output, "unusable batch reply");
                    }
                    for tx in chunk {
                        out.push(self.categorize(tx).await);
                    }
                }
                Err(err) => {
                    tracing::error!(
                        chunk = chunk_idx,
                        chunk_len = chunk.len(),
                        error = %err,
                        "batch completion call failed"
                    );
                    return Err(err);
                }
            }
        }

        debug_assert_eq!(out.len(), txs.len());
        Ok(out)
    }

    async fn categorize_chunk(
        &self,
        chunk: &[Transaction],
    ) -> Result<Vec<Categorization>, CategorizeError> {
        let req = prompt::batch_request(&self.taxonomy, chunk);
        let reply = self
            .client
            .complete(req)
            .await
            .map_err(CategorizeError::Completion)?;

        let categories =
            json::parse_category_list(&reply).map_err(|err| CategorizeError::Parse {
                detail: format!("{err:#}"),
                raw_output: reply.clone(),
            })?;

        if categories.len() != chunk.len() {
            return Err(CategorizeError::LengthMismatch {
                expected: chunk.len(),
                got: categories.len(),
            });
        }

        Ok(categories
            .iter()
            .map(|raw| Categorization {
                category: normalize(&self.taxonomy, raw).to_string(),
                confidence: BATCH_CALL_CONFIDENCE,
            })
            .collect())
    }

    fn failure(&self) -> Categorization {
        Categorization {
            category: self.taxonomy.catch_all().to_string(),
            confidence: FAILURE_CONFIDENCE,
        }
    }
}
