use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Fault categorization for naming-core errors.
///
/// The category decides how a fault propagates: user-facing entry points
/// surface faults to their callers, while deleters and fire-and-forget
/// paths log and swallow them.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum FaultKind {
  /// A malformed input was passed to a public entry point.
  BadParameter,
  /// An operation was attempted at the wrong lifecycle phase.
  InvalidStatus,
  /// A deserialized value lies outside the known encoding set.
  VersionTooNew,
  /// The address service is no longer usable (runtime shutting down).
  ServiceUnavailable,
}

impl Display for FaultKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::BadParameter => f.write_str("bad parameter"),
      Self::InvalidStatus => f.write_str("invalid status"),
      Self::VersionTooNew => f.write_str("version too new"),
      Self::ServiceUnavailable => f.write_str("service unavailable"),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
