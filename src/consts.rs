//! Naming-core configuration constants and default values.
//!
//! This module defines the credit budget handed to freshly created
//! components and the initial capacities of the bookkeeping tables used
//! during parcel serialization.
//!
//! # Categories
//!
//! - **Global Credit**: The credit budget backing distributed reference
//!   counting
//! - **Memory Allocation**: Initial capacities for archive data structures

// -----------------------------------------------------------------------------
// Global Credit
// -----------------------------------------------------------------------------

/// Base-2 logarithm of [`INITIAL_GLOBAL_CREDIT`].
///
/// The credit share of an identifier is stored as a base-2 logarithm in a
/// five-bit field, so this value must stay below 32.
pub const LOG2_INITIAL_GLOBAL_CREDIT: u16 = 16;

/// Global credit assumed by every freshly created component.
///
/// A new component starts its life with exactly one handle holding this
/// full budget. The budget is divided in half on every split and
/// replenished from the address service once a share is exhausted. The
/// sum of all outstanding credit shares for one component, plus whatever
/// the address service holds on its behalf, always equals this value.
pub const INITIAL_GLOBAL_CREDIT: i64 = 1 << LOG2_INITIAL_GLOBAL_CREDIT;

// -----------------------------------------------------------------------------
// Memory Allocation
// -----------------------------------------------------------------------------

/// Initial capacity of an output archive's split-gid table.
///
/// Most parcels carry a handful of identifiers at most; the table grows
/// on demand for larger messages.
pub const CAP_SPLIT_GIDS: usize = 4;

/// Initial capacity of an output archive's pending-split set.
pub const CAP_PENDING_SPLITS: usize = 4;

/// Initial capacity of an input archive's loaded-handle table.
pub const CAP_LOADED_GIDS: usize = 4;

/// Initial capacity of an output archive's byte buffer.
pub const CAP_ARCHIVE_BYTES: usize = 64;
