use std::sync::Arc;

use crate::agas::AddressService;
use crate::core::Gid;
use crate::loom::sync::atomic::AtomicU8;
use crate::loom::sync::atomic::AtomicU64;
use crate::loom::sync::atomic::Ordering;
use crate::node::RunState;

/// One node of the distributed runtime, as seen by the naming core.
///
/// Centralizes the capabilities the core needs: the address service and
/// the shutdown lifecycle state. Handles hold a shared reference to
/// their locality instead of consulting process-wide state, which keeps
/// the core free of globals and directly testable.
pub struct Locality {
  id: u32,
  agas: Arc<dyn AddressService>,
  state: AtomicU8,
  next_lsb: AtomicU64,
}

impl Locality {
  /// Creates a running locality backed by the given address service.
  pub fn new(id: u32, agas: Arc<dyn AddressService>) -> Arc<Self> {
    Arc::new(Self {
      id,
      agas,
      state: AtomicU8::new(RunState::Running as u8),
      next_lsb: AtomicU64::new(1),
    })
  }

  /// Returns the id of this locality.
  #[inline]
  pub const fn id(&self) -> u32 {
    self.id
  }

  /// Returns the address service, or `None` once the locality stopped.
  ///
  /// The service keeps answering while the locality is merely
  /// *stopping*; deleters that lose that race handle it case by case.
  #[inline]
  pub fn agas(&self) -> Option<&dyn AddressService> {
    if self.state() == RunState::Stopped {
      None
    } else {
      Some(self.agas.as_ref())
    }
  }

  /// Returns the current lifecycle state.
  #[inline]
  pub fn state(&self) -> RunState {
    RunState::from_bits(self.state.load(Ordering::Acquire))
  }

  /// Advances the lifecycle state.
  ///
  /// The state is monotonic; an attempt to move backwards is ignored.
  pub fn set_state(&self, state: RunState) {
    self.state.fetch_max(state as u8, Ordering::AcqRel);
  }

  /// Returns `true` while shutdown is in progress but not complete.
  #[inline]
  pub fn is_stopping(&self) -> bool {
    self.state() == RunState::Stopping
  }

  /// Mints a fresh identifier naming a new object on this locality.
  ///
  /// The identifier carries identity only; wrap it with
  /// [`Id::create`][crate::types::Id::create] to start the target's
  /// managed lifetime.
  #[inline]
  pub fn fresh_gid(&self, kind: u32) -> Gid {
    Gid::from_locality(self.id, kind, self.next_lsb.fetch_add(1, Ordering::Relaxed))
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
