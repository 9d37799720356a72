pub mod categorization;
pub mod taxonomy;
pub mod transaction;

pub use categorization::{CategorizedTransaction, Categorization};
pub use taxonomy::{CategoryHint, Taxonomy};
pub use transaction::{Direction, Transaction};
