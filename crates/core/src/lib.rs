//! Domain types shared by every SRD crate.
//!
//! Nothing in here performs I/O: the alert-rule builder and threshold
//! validation are pure so they can be exercised without a runtime.

pub mod alert_rules;
pub mod error;
pub mod roles;
pub mod thresholds;
pub mod types;
