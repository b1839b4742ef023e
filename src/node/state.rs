use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Lifecycle state of a locality.
///
/// The state only ever moves forward; a stopped locality never comes
/// back. The naming core consults it in two places: deleters degrade to
/// a local free once the address service is gone, and a destroy request
/// racing the stop sequence is silently dropped.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum RunState {
  /// The locality is fully operational.
  Running = 0,
  /// Shutdown has begun; the address service still answers.
  Stopping = 1,
  /// The address service is no longer reachable.
  Stopped = 2,
}

impl RunState {
  #[inline]
  pub(crate) const fn from_bits(bits: u8) -> Self {
    match bits {
      0 => Self::Running,
      1 => Self::Stopping,
      _ => Self::Stopped,
    }
  }
}

impl Display for RunState {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::Running => f.write_str("running"),
      Self::Stopping => f.write_str("stopping"),
      Self::Stopped => f.write_str("stopped"),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
