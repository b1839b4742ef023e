use std::sync::Arc;
use tokio::sync::Mutex;

use crate::agas::Address;
use crate::core::Gid;
use crate::core::GidCell;
use crate::core::Management;
use crate::error::FaultKind;
use crate::node::Locality;

/// Shared state behind every local copy of an [`Id`].
///
/// The record owns exactly one raw identifier. Copying a handle bumps
/// the local reference count only; the record itself is dropped once the
/// last local copy goes out of scope, at which point the deleter
/// matching the management discipline runs.
///
/// [`Id`]: crate::types::Id
pub(crate) struct IdRecord {
  gid: GidCell,
  management: Management,
  node: Arc<Locality>,
  refill: Mutex<()>,
}

impl IdRecord {
  #[inline]
  pub(crate) fn new(gid: Gid, management: Management, node: Arc<Locality>) -> Self {
    Self {
      gid: GidCell::new(gid),
      management,
      node,
      refill: Mutex::new(()),
    }
  }

  /// Returns the lockable identifier storage.
  #[inline]
  pub(crate) fn cell(&self) -> &GidCell {
    &self.gid
  }

  /// Returns the management discipline installed at construction.
  #[inline]
  pub(crate) const fn management(&self) -> Management {
    self.management
  }

  /// Returns the locality this record was created on.
  #[inline]
  pub(crate) fn node(&self) -> &Arc<Locality> {
    &self.node
  }

  /// Returns the mutex serializing credit replenishment for this record.
  #[inline]
  pub(crate) fn refill(&self) -> &Mutex<()> {
    &self.refill
  }
}

impl Drop for IdRecord {
  fn drop(&mut self) {
    match self.management {
      Management::Unmanaged => {}
      Management::Managed | Management::ManagedMoveCredit => managed_drop(self),
    }
  }
}

// -----------------------------------------------------------------------------
// Managed Deleter
// -----------------------------------------------------------------------------

/// Returns this record's credit share to the system.
///
/// Runs when the last local copy of a managed handle goes out of scope.
/// Deleters never propagate: every fault taken here is logged at error
/// level and swallowed, and no blocking call is made.
fn managed_drop(record: &IdRecord) {
  let gid: Gid = record.cell().get();

  // A credit of zero means the target is not globally reference counted
  // through this identifier; nothing is left to give back. Move-credit
  // handles end up here after their credit went out with a parcel.
  if !gid.has_credits() {
    return;
  }

  // Too late in the game; the local record is all there is to free.
  let Some(agas) = record.node().agas() else {
    return;
  };

  // Talk to the address service only if this identifier was split at
  // some point, i.e. a reference actually left the creating locality,
  // or if the target cannot be resolved locally.
  let address: Option<Address> = if gid.was_split() {
    None
  } else {
    agas.resolve_cached(gid)
  };

  match address {
    None => {
      let credits: i64 = gid.credit();
      debug_assert!(credits > 0);

      // Fire-and-forget: return our share of the global refcount.
      if let Err(fault) = agas.decref(gid, credits) {
        tracing::error!(gid = %gid, %fault, "unhandled fault while returning credit");
      }
    }
    Some(address) => {
      // Never split and locally resolvable: the target is fully local
      // and this was the last handle anywhere in the system.
      if let Err(fault) = agas.destroy_component(gid, &address) {
        // The request may come in after the locality started stopping;
        // the shutdown path reaps the target instead.
        if fault.kind() == FaultKind::InvalidStatus && record.node().is_stopping() {
          return;
        }

        tracing::error!(gid = %gid, %fault, "unhandled fault while destroying component");
      }
    }
  }
}
