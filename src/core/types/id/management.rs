use std::fmt::Display;
use std::fmt::Formatter;

use crate::error::Fault;
use crate::error::FaultKind;

/// Management discipline of a handle.
///
/// The discipline decides what happens when the last local copy of a
/// handle goes out of scope, and how the handle behaves when it is
/// serialized into a parcel.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[repr(u8)]
pub enum Management {
  /// No garbage collection is performed on behalf of this handle.
  ///
  /// Unmanaged handles carry no credit and create no global refcount
  /// obligation; dropping the last copy frees the local record only.
  Unmanaged = 0,
  /// All copies are globally tracked through the credit protocol.
  ///
  /// The referenced target is destroyed after the last managed handle
  /// anywhere in the system is dropped.
  Managed = 1,
  /// Managed, but serialization moves the entire remaining credit to
  /// the peer instead of splitting it.
  ///
  /// After the move the local handle holds no credit and its drop is a
  /// no-op. The peer observes an ordinary managed handle.
  ManagedMoveCredit = 2,
}

impl Management {
  /// Returns `true` for the globally tracked disciplines.
  #[inline]
  pub const fn is_managed(self) -> bool {
    !matches!(self, Self::Unmanaged)
  }

  /// Decodes a management discipline from its wire encoding.
  ///
  /// Only `unmanaged` and `managed` travel on the wire; a move-credit
  /// handle is indistinguishable from a managed one to its receiver.
  /// Values outside the known set fail with
  /// [`VersionTooNew`][FaultKind::VersionTooNew].
  #[inline]
  pub fn from_wire(value: u8) -> Result<Self, Fault> {
    match value {
      0 => Ok(Self::Unmanaged),
      1 => Ok(Self::Managed),
      _ => Err(Fault::new(
        FaultKind::VersionTooNew,
        format!("unknown management encoding: {value}"),
      )),
    }
  }

  /// Returns the wire encoding of this discipline.
  #[inline]
  pub(crate) const fn to_wire(self) -> u8 {
    match self {
      Self::Unmanaged => 0,
      Self::Managed | Self::ManagedMoveCredit => 1,
    }
  }
}

impl Display for Management {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Unmanaged => f.write_str("unmanaged"),
      Self::Managed => f.write_str("managed"),
      Self::ManagedMoveCredit => f.write_str("managed_move_credit"),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
