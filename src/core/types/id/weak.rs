use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Arc;

use crate::agas::Address;
use crate::core::Gid;
use crate::node::Locality;

/// A non-owning reference to a component.
///
/// Weak handles carry no credit and keep nothing alive; they resolve by
/// address-cache lookup only and observe whether the target still
/// exists on this locality. Use them to break reference cycles that the
/// credit protocol cannot collect.
#[derive(Clone)]
pub struct WeakId {
  gid: Gid,
  node: Arc<Locality>,
}

impl WeakId {
  #[inline]
  pub(crate) fn new(gid: Gid, node: &Arc<Locality>) -> Self {
    Self {
      gid,
      node: Arc::clone(node),
    }
  }

  /// Returns the identity form of the referenced identifier.
  #[inline]
  pub const fn gid(&self) -> Gid {
    self.gid
  }

  /// Probes the local address cache for the referenced target.
  ///
  /// Returns `None` if the target is unknown to the cache or the
  /// runtime has shut down. A `Some` answer is a snapshot; the target
  /// may be destroyed the moment after.
  #[inline]
  pub fn resolve(&self) -> Option<Address> {
    self.node.agas()?.resolve_cached(self.gid)
  }
}

impl Debug for WeakId {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Display::fmt(self, f)
  }
}

impl Display for WeakId {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Display::fmt(&self.gid, f)
  }
}
