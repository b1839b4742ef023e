use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

use crate::error::FaultKind;

/// A structured naming-core fault with kind, message, and backtrace.
///
/// # Display Format
///
/// Faults format as: `{kind} - {message}`
///
/// Example: `invalid status - can't check-point managed ids`
pub struct Fault {
  kind: FaultKind,
  error: String,
  trace: Backtrace,
}

impl Fault {
  /// Creates a new fault with the given kind and message.
  ///
  /// Automatically captures a backtrace at the call site for debugging.
  ///
  /// # Examples
  ///
  /// ```
  /// use mizar::error::{Fault, FaultKind};
  ///
  /// let fault = Fault::new(FaultKind::BadParameter, "credit must be non-zero");
  /// ```
  #[inline]
  pub fn new<T>(kind: FaultKind, error: T) -> Self
  where
    T: Display,
  {
    Self {
      kind,
      error: error.to_string(),
      trace: Backtrace::capture(),
    }
  }

  /// Returns the fault's category.
  #[inline]
  pub const fn kind(&self) -> FaultKind {
    self.kind
  }

  /// Returns the human-readable error message.
  #[inline]
  pub const fn error(&self) -> &str {
    self.error.as_str()
  }

  /// Returns the captured backtrace.
  ///
  /// Backtrace availability depends on the `RUST_BACKTRACE` environment
  /// variable and platform support.
  #[inline]
  pub const fn trace(&self) -> &Backtrace {
    &self.trace
  }
}

impl Debug for Fault {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Display::fmt(self, f)
  }
}

impl Display for Fault {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    write!(f, "{} - {}", self.kind, self.error)
  }
}

impl Error for Fault {}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
