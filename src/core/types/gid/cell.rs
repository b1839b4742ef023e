use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ops::Deref;
use std::ops::DerefMut;

use crate::core::Gid;
use crate::loom::hint::spin_loop;
use crate::loom::sync::atomic::AtomicU64;
use crate::loom::sync::atomic::Ordering;

/// Lockable storage for a raw identifier inside a shared handle record.
///
/// Every mutable bit of an identifier lives in its most-significant half:
/// the credit field, the flags, and the spinlock itself. The
/// least-significant half is fixed at construction, so the cell stores it
/// as a plain integer next to the atomic half.
///
/// The embedded spinlock is the only per-target lock in the core; there
/// is no global table keyed by identifier.
pub(crate) struct GidCell {
  msb: AtomicU64,
  lsb: u64,
}

impl GidCell {
  /// Creates a cell holding `gid`.
  #[inline]
  pub(crate) fn new(gid: Gid) -> Self {
    debug_assert!(!gid.is_locked());

    Self {
      msb: AtomicU64::new(gid.msb()),
      lsb: gid.lsb(),
    }
  }

  /// Returns an unlocked snapshot of the stored identifier.
  ///
  /// The snapshot may observe the lock bit of a concurrent holder; credit
  /// reads through it are only meaningful at quiescent points, such as
  /// the final drop of the owning record.
  #[inline]
  pub(crate) fn get(&self) -> Gid {
    Gid::new(self.msb.load(Ordering::Acquire), self.lsb)
  }

  /// Acquires the embedded spinlock.
  ///
  /// The lock is held for O(1) wall time only; callers must not reach the
  /// address service while holding the guard.
  pub(crate) fn lock(&self) -> GidGuard<'_> {
    'acquire: loop {
      let current: u64 = self.msb.load(Ordering::Relaxed);

      if current & Gid::LOCK_MASK != 0 {
        spin_loop();
        continue 'acquire;
      }

      match self.msb.compare_exchange_weak(
        current,
        current | Gid::LOCK_MASK,
        Ordering::Acquire,
        Ordering::Relaxed,
      ) {
        Ok(_) => {
          break 'acquire GidGuard {
            cell: self,
            gid: Gid::new(current, self.lsb),
          };
        }
        Err(_) => continue 'acquire,
      }
    }
  }
}

impl Debug for GidCell {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Debug::fmt(&self.get(), f)
  }
}

// -----------------------------------------------------------------------------
// Gid Guard
// -----------------------------------------------------------------------------

/// Exclusive access to the credit bits of a [`GidCell`].
///
/// The guard works on a lock-stripped copy of the identifier and writes
/// the copy back with release ordering when dropped, clearing the lock
/// bit in the same store.
pub(crate) struct GidGuard<'a> {
  cell: &'a GidCell,
  gid: Gid,
}

impl GidGuard<'_> {
  /// Returns a copy of the guarded identifier with the lock bit clear.
  #[inline]
  pub(crate) fn gid(&self) -> Gid {
    self.gid
  }
}

impl Deref for GidGuard<'_> {
  type Target = Gid;

  #[inline]
  fn deref(&self) -> &Self::Target {
    &self.gid
  }
}

impl DerefMut for GidGuard<'_> {
  #[inline]
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.gid
  }
}

impl Drop for GidGuard<'_> {
  fn drop(&mut self) {
    debug_assert!(!self.gid.is_locked());

    self.cell.msb.store(self.gid.msb(), Ordering::Release);
  }
}

// -----------------------------------------------------------------------------
// Loom Models
// -----------------------------------------------------------------------------


// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
