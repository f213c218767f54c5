//! Shared primitive types used across the desk.

/// A stable, unique identifier for an application record (`app_<n>`).
pub type RecordId = String;

/// A credit score. Generated and clamped within the configured score bounds.
pub type CreditScore = i32;

/// Population generation counter. Generation 0 is the initial seed population;
/// every regeneration increments it.
pub type Generation = u64;

/// Commit counter published with every change notification.
pub type Revision = u64;
