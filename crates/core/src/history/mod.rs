//! Persistent search and grab history.
//!
//! Records which basenames were already searched and which results were
//! already grabbed per tracker, so repeated runs stay idempotent.

mod store;

pub use store::{details_path, HistoryError, HistoryStore, SearchHistory};
