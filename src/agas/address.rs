use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Resolved physical location of a component.
///
/// # Format
///
/// Addresses display as `#Addr<L.K.P>` where `L` is the hosting
/// locality, `K` the component kind, and `P` the in-process pointer
/// bits in hex.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Address {
  locality: u32,
  kind: u32,
  local: u64,
}

impl Address {
  /// Creates an address from its parts.
  #[inline]
  pub const fn new(locality: u32, kind: u32, local: u64) -> Self {
    Self {
      locality,
      kind,
      local,
    }
  }

  /// Returns the locality hosting the component.
  #[inline]
  pub const fn locality(&self) -> u32 {
    self.locality
  }

  /// Returns the component-kind tag.
  #[inline]
  pub const fn kind(&self) -> u32 {
    self.kind
  }

  /// Returns the in-process location bits.
  #[inline]
  pub const fn local(&self) -> u64 {
    self.local
  }
}

impl Debug for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Display::fmt(self, f)
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    write!(f, "#Addr<{}.{}.{:x}>", self.locality, self.kind, self.local)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
