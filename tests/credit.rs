//! End-to-end credit protocol scenarios against a recording service.

mod support;

use std::sync::Arc;

use mizar::agas::Address;
use mizar::consts::INITIAL_GLOBAL_CREDIT;
use mizar::consts::LOG2_INITIAL_GLOBAL_CREDIT;
use mizar::error::FaultKind;
use mizar::node::Locality;
use mizar::node::RunState;
use mizar::types::Gid;
use mizar::types::Id;
use mizar::types::Management;

use support::Event;
use support::fixture;

fn managed_with_log2(node: &Arc<Locality>, log2: u16) -> Id {
  let mut gid: Gid = node.fresh_gid(7);
  gid.set_log2_credit(log2);

  Id::new(gid, Management::Managed, node).unwrap()
}

// -----------------------------------------------------------------------------
// Creation
// -----------------------------------------------------------------------------

#[tokio::test]
async fn create_starts_with_full_budget() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();

  assert_eq!(id.management(), Management::Managed);
  assert_eq!(id.gid().log2_credit(), LOG2_INITIAL_GLOBAL_CREDIT);
  assert_eq!(id.gid().credit(), INITIAL_GLOBAL_CREDIT);
  assert!(!id.gid().was_split());
  assert!(service.events().is_empty());
}

#[tokio::test]
async fn create_rejects_bad_identifiers() {
  let (_service, node) = fixture(1);

  let fault = Id::create(Gid::INVALID, &node).unwrap_err();
  assert_eq!(fault.kind(), FaultKind::BadParameter);

  let mut tainted: Gid = node.fresh_gid(7);
  tainted.set_log2_credit(3);

  let fault = Id::create(tainted, &node).unwrap_err();
  assert_eq!(fault.kind(), FaultKind::BadParameter);
}

#[tokio::test]
async fn managed_handle_requires_credit() {
  let (_service, node) = fixture(1);

  for management in [Management::Managed, Management::ManagedMoveCredit] {
    let fault = Id::new(node.fresh_gid(7), management, &node).unwrap_err();

    assert_eq!(fault.kind(), FaultKind::BadParameter);
  }

  assert!(Id::new(node.fresh_gid(7), Management::Unmanaged, &node).is_ok());
}

#[tokio::test]
async fn local_copies_share_one_record() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();
  let copy: Id = id.clone();

  assert_eq!(id.local_count(), 2);
  assert_eq!(copy.gid(), id.gid());
  assert_eq!(id.gid().credit(), INITIAL_GLOBAL_CREDIT);
  assert!(service.events().is_empty());

  drop(copy);

  assert_eq!(id.local_count(), 1);
  assert!(service.events().is_empty());
}

// -----------------------------------------------------------------------------
// Local Splits
// -----------------------------------------------------------------------------

#[tokio::test]
async fn local_split_halves_both_sides() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();

  let sibling: Gid = id.split_gid().await.unwrap();

  assert_eq!(sibling.log2_credit(), LOG2_INITIAL_GLOBAL_CREDIT - 1);
  assert_eq!(id.gid().log2_credit(), LOG2_INITIAL_GLOBAL_CREDIT - 1);
  assert!(sibling.was_split());
  assert!(id.gid().was_split());

  // A split with credit to spare is a purely local operation.
  assert!(service.events().is_empty());
}

#[tokio::test]
async fn split_chain_conserves_the_budget() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();

  let mut total: i64 = 0;

  for _ in 0..3 {
    total += id.split_gid().await.unwrap().credit();
  }

  total += id.gid().credit();

  assert_eq!(total, INITIAL_GLOBAL_CREDIT);
  assert!(service.events().is_empty());
}

#[tokio::test]
async fn split_of_untracked_identifier_is_a_no_op() {
  let (service, node) = fixture(1);
  let id: Id = Id::new(node.fresh_gid(7), Management::Unmanaged, &node).unwrap();

  let sibling: Gid = id.split_gid().await.unwrap();

  assert_eq!(sibling, id.gid());
  assert!(!sibling.has_credits());
  assert!(service.events().is_empty());
}

// -----------------------------------------------------------------------------
// Exhaustion & Replenishment
// -----------------------------------------------------------------------------

#[tokio::test]
async fn exhausted_split_replenishes_synchronously() {
  let (service, node) = fixture(1);
  let id: Id = managed_with_log2(&node, 1);
  let identity: Gid = id.gid().strip_internal_bits();

  let sibling: Gid = id.split_gid().await.unwrap();

  assert_eq!(
    service.increfs(),
    vec![(identity, 2 * (INITIAL_GLOBAL_CREDIT - 1))]
  );
  assert_eq!(sibling.log2_credit(), LOG2_INITIAL_GLOBAL_CREDIT);
  assert_eq!(id.gid().log2_credit(), LOG2_INITIAL_GLOBAL_CREDIT);
  assert!(sibling.was_split());
  assert!(id.gid().was_split());
  assert!(service.decrefs().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_exhausted_splits_coalesce() {
  let (service, node) = fixture(1);
  let id: Id = managed_with_log2(&node, 1);

  let first = {
    let id: Id = id.clone();
    tokio::spawn(async move { id.split_gid().await.unwrap() })
  };

  let second = {
    let id: Id = id.clone();
    tokio::spawn(async move { id.split_gid().await.unwrap() })
  };

  let first: Gid = first.await.unwrap();
  let second: Gid = second.await.unwrap();

  // A burst of exhausted splitters issues exactly one incref.
  assert_eq!(service.increfs().len(), 1);

  // Conservation: the three shares plus any returned overflow cover the
  // original two units plus everything the service granted.
  let live: i64 = first.credit() + second.credit() + id.gid().credit();
  let returned: i64 = service.decrefs().iter().map(|(_, credits)| credits).sum();

  assert_eq!(live + returned, 2 * INITIAL_GLOBAL_CREDIT);
}

#[tokio::test]
async fn failed_replenish_surfaces_and_leaks() {
  let (service, node) = fixture(1);
  let id: Id = managed_with_log2(&node, 1);

  service.fail_increfs();

  let fault = id.split_gid().await.unwrap_err();

  assert_eq!(fault.kind(), FaultKind::ServiceUnavailable);

  // The identifier stays marked; its remaining share is reaped at exit.
  assert!(id.gid().was_split());
  assert_eq!(id.gid().credit(), 2);
}

#[tokio::test]
async fn no_identifier_lock_is_held_across_service_calls() {
  let (service, node) = fixture(1);
  let id: Id = managed_with_log2(&node, 1);

  service.set_probe({
    let id: Id = id.clone();

    Box::new(move || assert!(!id.gid().is_locked()))
  });

  let _sibling: Gid = id.split_gid().await.unwrap();

  service.clear_probe();
  drop(id);

  assert_eq!(service.increfs().len(), 1);
  assert_eq!(service.decrefs().len(), 1);
}

// -----------------------------------------------------------------------------
// Deleters
// -----------------------------------------------------------------------------

#[tokio::test]
async fn unmanaged_drop_causes_no_traffic() {
  let (service, node) = fixture(1);
  let id: Id = Id::new(node.fresh_gid(7), Management::Unmanaged, &node).unwrap();

  drop(id);

  assert!(service.events().is_empty());
}

#[tokio::test]
async fn split_handles_return_their_shares() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();
  let identity: Gid = id.gid().strip_internal_bits();

  // Resolvable or not, a split identifier always goes through decref.
  service.insert_resolvable(id.gid(), Address::new(1, 7, 0x100));

  let sibling: Gid = id.split_gid().await.unwrap();
  let sibling: Id = Id::new(sibling, Management::Managed, &node).unwrap();

  let half: i64 = INITIAL_GLOBAL_CREDIT / 2;

  drop(sibling);
  assert_eq!(service.events(), vec![Event::Decref(identity, half)]);

  drop(id);
  assert_eq!(
    service.events(),
    vec![
      Event::Decref(identity, half),
      Event::Decref(identity, half),
    ]
  );
}

#[tokio::test]
async fn local_target_is_destroyed_in_process() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();
  let identity: Gid = id.gid().strip_internal_bits();

  service.insert_resolvable(id.gid(), Address::new(1, 7, 0x100));

  let copy: Id = id.clone();

  drop(copy);
  drop(id);

  // Never split, locally resolvable: one destroy, zero decrefs.
  assert_eq!(service.events(), vec![Event::Destroy(identity)]);
}

#[tokio::test]
async fn unresolvable_target_returns_credit_instead() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();
  let identity: Gid = id.gid().strip_internal_bits();

  drop(id);

  assert_eq!(
    service.events(),
    vec![Event::Decref(identity, INITIAL_GLOBAL_CREDIT)]
  );
}

#[tokio::test]
async fn unmoved_move_credit_handle_still_pays_up() {
  let (service, node) = fixture(1);

  let mut gid: Gid = node.fresh_gid(7);
  gid.set_log2_credit(LOG2_INITIAL_GLOBAL_CREDIT);

  let identity: Gid = gid.strip_internal_bits();
  let id: Id = Id::new(gid, Management::ManagedMoveCredit, &node).unwrap();

  drop(id);

  assert_eq!(
    service.events(),
    vec![Event::Decref(identity, INITIAL_GLOBAL_CREDIT)]
  );
}

#[tokio::test]
async fn drop_after_shutdown_degrades_to_local_free() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();

  node.set_state(RunState::Stopped);
  drop(id);

  assert!(service.events().is_empty());
}

#[tokio::test]
async fn destroy_racing_shutdown_is_swallowed() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();

  service.insert_resolvable(id.gid(), Address::new(1, 7, 0x100));
  service.fail_next_destroy(FaultKind::InvalidStatus);
  node.set_state(RunState::Stopping);

  drop(id);

  assert!(service.events().is_empty());
}

#[tokio::test]
async fn destroy_fault_outside_shutdown_is_logged_not_thrown() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();

  service.insert_resolvable(id.gid(), Address::new(1, 7, 0x100));
  service.fail_next_destroy(FaultKind::InvalidStatus);

  // Still running: the fault is logged at error level and swallowed;
  // deleters never propagate.
  drop(id);

  assert!(service.destroys().is_empty());
}

// -----------------------------------------------------------------------------
// Weak Handles
// -----------------------------------------------------------------------------

#[tokio::test]
async fn weak_handles_resolve_by_lookup_only() {
  let (service, node) = fixture(1);
  let id: Id = Id::create(node.fresh_gid(7), &node).unwrap();
  let weak = id.downgrade();

  assert!(weak.resolve().is_none());

  let address: Address = Address::new(1, 7, 0x100);
  service.insert_resolvable(id.gid(), address);

  assert_eq!(weak.resolve(), Some(address));
  assert!(service.events().is_empty());

  node.set_state(RunState::Stopped);

  assert!(weak.resolve().is_none());
}
