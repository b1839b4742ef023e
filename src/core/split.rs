//! The credit-splitting protocol.
//!
//! Sending a handle to another locality divides its credit share in two:
//! one part stays behind, the other travels with the parcel and becomes
//! the global refcount share of the remote copy. As long as enough
//! credit is left to halve, a split is a purely local operation; only an
//! exhausted share has to be replenished from the address service, and
//! that replenishment is the sole suspension point of the protocol.
//!
//! All mutations of a single identifier's credit field happen under its
//! embedded spinlock. The lock is never held across a service call.

use crate::consts::INITIAL_GLOBAL_CREDIT;
use crate::consts::LOG2_INITIAL_GLOBAL_CREDIT;
use crate::core::Gid;
use crate::core::GidCell;
use crate::core::GidGuard;
use crate::core::IdRecord;
use crate::error::Fault;
use crate::error::FaultKind;

/// Produces an identifier to hand off to another locality, updating the
/// source so the global credit sum stays unchanged.
///
/// Three cases:
///
/// - Credit tracking disabled: the identifier is returned as-is.
/// - Enough credit to halve: both sides take half, marked as split.
/// - Exhausted share: the was-split flag is set, the spinlock dropped,
///   and fresh credit requested from the address service. Concurrent
///   exhausted splitters coalesce on the record's refill mutex so a
///   burst of sends issues exactly one `incref`; the losers re-enter
///   the protocol once the share is restored.
pub(crate) async fn split_gid_if_needed(record: &IdRecord) -> Result<Gid, Fault> {
  'split: loop {
    {
      let mut guard: GidGuard<'_> = record.cell().lock();

      if !guard.has_credits() {
        // The caller opted out of tracking; nothing to divide.
        break 'split Ok(guard.gid());
      }

      let log2: u16 = guard.log2_credit();
      debug_assert!(log2 > 0);

      if log2 > 1 {
        break 'split Ok(split_credits_locked(&mut guard));
      }

      // Exhaustion. Garbage collection for the target is no longer a
      // local affair, even if the replenishment below never completes.
      guard.mark_split();
    }

    let _permit = record.refill().lock().await;

    {
      // A replenisher that held the permit before us may already have
      // restored the share; go round again and halve it normally.
      let guard: GidGuard<'_> = record.cell().lock();

      if !guard.has_credits() || guard.log2_credit() > 1 {
        continue 'split;
      }
    }

    break 'split replenish_split(record).await;
  }
}

/// Divides the guarded credit share in half, returning the new sibling.
///
/// Both the identifier staying behind and the returned one end up with
/// half the share and the was-split flag set.
pub(crate) fn split_credits_locked(guard: &mut GidGuard<'_>) -> Gid {
  let log2: u16 = guard.log2_credit();
  debug_assert!(log2 > 0);

  let mut new_gid: Gid = guard.gid();

  guard.set_log2_credit(log2 - 1);
  guard.mark_split();

  new_gid.set_log2_credit(log2 - 1);
  new_gid.mark_split();

  new_gid
}

/// Requests fresh credit for an exhausted identifier and builds the
/// departing sibling from it.
///
/// The requested amount covers a full budget for the sibling plus a full
/// budget minus the two remaining units for the source.
async fn replenish_split(record: &IdRecord) -> Result<Gid, Fault> {
  let base: Gid = record.cell().lock().gid();
  debug_assert!(base.is_valid());

  let credits: i64 = 2 * (INITIAL_GLOBAL_CREDIT - 1);

  let Some(agas) = record.node().agas() else {
    return Err(shutdown_fault());
  };

  tracing::trace!(gid = %base, credits, "replenishing exhausted credit");

  agas.incref(base, credits).await?;

  Ok(postprocess_incref(record))
}

/// Reconciles an identifier after its replenishment `incref` completed.
///
/// While the spinlock was dropped for the service call, other splitters
/// may have divided the share further; the source credit is therefore
/// re-read and the surplus beyond a full budget handed back through an
/// asynchronous `decref`.
fn postprocess_incref(record: &IdRecord) -> Gid {
  let (new_gid, overflow) = {
    let mut guard: GidGuard<'_> = record.cell().lock();

    let mut new_gid: Gid = guard.gid();
    debug_assert!(new_gid.is_valid());
    debug_assert!(guard.was_split());

    new_gid.set_log2_credit(LOG2_INITIAL_GLOBAL_CREDIT);
    new_gid.mark_split();

    let src_credit: i64 = guard.credit();
    debug_assert!(src_credit >= 2);

    let merged: i64 = src_credit + (INITIAL_GLOBAL_CREDIT - 2);
    let overflow: i64 = merged - INITIAL_GLOBAL_CREDIT;

    guard.set_credit(merged.min(INITIAL_GLOBAL_CREDIT));

    (new_gid, overflow)
  };

  if overflow > 0 {
    debug_assert!(overflow <= INITIAL_GLOBAL_CREDIT - 1);

    // Give the surplus back; fire-and-forget.
    if let Some(agas) = record.node().agas() {
      if let Err(fault) = agas.decref(new_gid, overflow) {
        tracing::error!(gid = %new_gid, %fault, "unhandled fault while returning overflow credit");
      }
    }
  }

  new_gid
}

/// Moves the entire credit share out of `cell`, returning the identifier
/// as it was before the move.
///
/// The cell is left credit-less but still names the target; dropping the
/// owning handle afterwards is a purely local operation.
pub(crate) fn move_gid(cell: &GidCell) -> Gid {
  let mut guard: GidGuard<'_> = cell.lock();
  let new_gid: Gid = guard.gid();

  if guard.has_credits() {
    guard.strip_credits();
  }

  new_gid
}

/// Refills an identifier whose credit share reached zero back to the
/// full budget, synchronizing with the address service.
pub(crate) async fn replenish_credits(record: &IdRecord) -> Result<i64, Fault> {
  let (base, added) = {
    let mut guard: GidGuard<'_> = record.cell().lock();
    debug_assert_eq!(guard.credit(), 0);

    let added: i64 = guard.fill_credit(INITIAL_GLOBAL_CREDIT);
    guard.mark_split();

    (guard.gid(), added)
  };

  let Some(agas) = record.node().agas() else {
    return Err(shutdown_fault());
  };

  agas.incref(base, added).await?;

  Ok(added)
}

fn shutdown_fault() -> Fault {
  Fault::new(
    FaultKind::ServiceUnavailable,
    "address service is no longer reachable",
  )
}
