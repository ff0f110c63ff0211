//! Per-result fetch/skip decisions.

mod decision;

pub use decision::{decide, GrabDecision, GrabPolicy};
