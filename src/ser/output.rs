use hashbrown::HashMap;
use hashbrown::HashSet;
use parking_lot::Mutex;
use std::mem;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::consts::CAP_ARCHIVE_BYTES;
use crate::consts::CAP_PENDING_SPLITS;
use crate::consts::CAP_SPLIT_GIDS;
use crate::core::Gid;
use crate::core::Id;
use crate::error::Fault;
use crate::error::FaultKind;
use crate::node::Locality;
use crate::ser::Save;

/// Table of resolved post-split identifiers, shared with the split
/// tasks. Keyed by handle *record*, not by identifier bits: splitting
/// mutates the source bits, and distinct handles to one target must
/// split independently.
type SplitGids = Arc<Mutex<HashMap<usize, Gid>>>;

#[derive(PartialEq, Eq)]
enum Pass {
  Preprocess,
  Save,
}

/// An output archive producing the wire form of a parcel.
///
/// The archive runs two passes over the same object graph. The
/// preprocessing pass discovers every managed handle the parcel will
/// carry and reserves its post-split credit, possibly suspending on the
/// address service; [`settle`][Self::settle] completes it. The save
/// pass then writes bytes without ever blocking.
///
/// Dropping an archive whose bytes were never taken reconciles any
/// credit that was reserved for the wire but will never travel.
pub struct OutputArchive {
  node: Arc<Locality>,
  pass: Pass,
  checkpoint: bool,
  finished: bool,
  bytes: Vec<u8>,
  split_gids: SplitGids,
  requested: HashSet<usize>,
  pending: Vec<JoinHandle<Result<(), Fault>>>,
}

impl OutputArchive {
  /// Creates an archive for an ordinary parcel.
  pub fn new(node: Arc<Locality>) -> Self {
    Self::with_checkpoint(node, false)
  }

  /// Creates an archive targeting a durable checkpoint.
  ///
  /// Managed handles cannot enter a checkpoint; preprocessing one fails
  /// with [`InvalidStatus`][FaultKind::InvalidStatus].
  pub fn for_checkpoint(node: Arc<Locality>) -> Self {
    Self::with_checkpoint(node, true)
  }

  fn with_checkpoint(node: Arc<Locality>, checkpoint: bool) -> Self {
    Self {
      node,
      pass: Pass::Preprocess,
      checkpoint,
      finished: false,
      bytes: Vec::with_capacity(CAP_ARCHIVE_BYTES),
      split_gids: Arc::new(Mutex::new(HashMap::with_capacity(CAP_SPLIT_GIDS))),
      requested: HashSet::with_capacity(CAP_SPLIT_GIDS),
      pending: Vec::with_capacity(CAP_PENDING_SPLITS),
    }
  }

  /// Returns `true` while the archive is in its preprocessing pass.
  #[inline]
  pub fn is_preprocessing(&self) -> bool {
    self.pass == Pass::Preprocess
  }

  /// Returns `true` if the archive targets a durable checkpoint.
  #[inline]
  pub fn is_checkpointing(&self) -> bool {
    self.checkpoint
  }

  /// Appends a byte to the parcel. Ignored during preprocessing.
  #[inline]
  pub fn write_u8(&mut self, value: u8) {
    if self.pass == Pass::Save {
      self.bytes.push(value);
    }
  }

  /// Appends a little-endian word to the parcel. Ignored during
  /// preprocessing.
  #[inline]
  pub fn write_u64(&mut self, value: u64) {
    if self.pass == Pass::Save {
      self.bytes.extend_from_slice(&value.to_le_bytes());
    }
  }

  /// Returns the post-split identifier reserved for the given record.
  pub(crate) fn split_gid_for(&self, key: usize) -> Option<Gid> {
    self.split_gids.lock().get(&key).copied()
  }

  /// Spawns the credit split for `id` and registers it with the
  /// archive's pending set.
  ///
  /// Idempotent per record: a handle appearing several times in one
  /// message splits once, and later occurrences reuse the reserved
  /// identifier. The task runs detached: even if the archive is dropped
  /// mid-pass, the split completes and its credit is reconciled.
  pub(crate) fn await_split(&mut self, id: &Id) -> Result<(), Fault> {
    let key: usize = id.record_key();

    if !self.requested.insert(key) {
      return Ok(());
    }

    let handle: Handle = Handle::try_current().map_err(|_| {
      Fault::new(
        FaultKind::InvalidStatus,
        "parcel serialization requires a runtime context",
      )
    })?;
    let table: SplitGids = Arc::clone(&self.split_gids);
    let id: Id = id.clone();

    let task: JoinHandle<Result<(), Fault>> = handle.spawn(async move {
      let gid: Gid = id.split_gid().await?;
      table.lock().insert(key, gid);

      Ok(())
    });

    self.pending.push(task);

    Ok(())
  }

  /// Completes the preprocessing pass.
  ///
  /// Suspends until every reserved split has resolved, then switches
  /// the archive into its save pass. The first fault aborts the save;
  /// splits still in flight at that point are reconciled when the
  /// archive is dropped.
  pub async fn settle(&mut self) -> Result<(), Fault> {
    debug_assert!(self.is_preprocessing());

    while let Some(task) = self.pending.pop() {
      match task.await {
        Ok(Ok(())) => {}
        Ok(Err(fault)) => return Err(fault),
        Err(error) => {
          return Err(Fault::new(
            FaultKind::InvalidStatus,
            format!("credit split task failed: {error}"),
          ));
        }
      }
    }

    self.pass = Pass::Save;

    Ok(())
  }

  /// Takes the finished parcel bytes.
  ///
  /// Ownership of every credit embedded in the bytes moves to the
  /// caller; the archive will no longer reconcile it.
  pub fn finish(&mut self) -> Result<Vec<u8>, Fault> {
    if self.is_preprocessing() {
      return Err(Fault::new(
        FaultKind::InvalidStatus,
        "parcel bytes requested before the save pass",
      ));
    }

    self.finished = true;

    Ok(mem::take(&mut self.bytes))
  }
}

impl Drop for OutputArchive {
  fn drop(&mut self) {
    if self.finished {
      return;
    }

    let pending: Vec<JoinHandle<Result<(), Fault>>> = mem::take(&mut self.pending);

    if pending.is_empty() && self.split_gids.lock().is_empty() {
      return;
    }

    // Credit was reserved for a parcel that never went out. Await the
    // in-flight splits, then give every reserved share back.
    let table: SplitGids = Arc::clone(&self.split_gids);
    let node: Arc<Locality> = Arc::clone(&self.node);

    match Handle::try_current() {
      Ok(handle) => {
        handle.spawn(async move {
          reconcile(pending, table, node).await;
        });
      }
      Err(_) => {
        tracing::error!("parcel dropped outside the runtime; reserved credit leaks");
      }
    }
  }
}

/// Returns reserved-but-untransmitted credit to the address service.
async fn reconcile(
  pending: Vec<JoinHandle<Result<(), Fault>>>,
  table: SplitGids,
  node: Arc<Locality>,
) {
  for task in pending {
    if let Err(error) = task.await {
      tracing::error!(%error, "credit split task failed during reconciliation");
    }
  }

  let reserved: Vec<Gid> = table.lock().drain().map(|(_, gid)| gid).collect();

  let Some(agas) = node.agas() else {
    return;
  };

  for gid in reserved {
    let credits: i64 = gid.credit();

    if credits > 0 {
      if let Err(fault) = agas.decref(gid, credits) {
        tracing::error!(gid = %gid, %fault, "unhandled fault while returning reserved credit");
      }
    }
  }
}

// -----------------------------------------------------------------------------
// Serialization Drivers
// -----------------------------------------------------------------------------

/// Serializes `value` into parcel bytes, driving both archive passes.
pub async fn serialize<T>(value: &T, node: &Arc<Locality>) -> Result<Vec<u8>, Fault>
where
  T: Save + ?Sized,
{
  serialize_with(OutputArchive::new(Arc::clone(node)), value).await
}

/// Serializes `value` into checkpoint bytes.
///
/// Fails with [`InvalidStatus`][FaultKind::InvalidStatus] if the value
/// contains any managed handle.
pub async fn serialize_checkpoint<T>(value: &T, node: &Arc<Locality>) -> Result<Vec<u8>, Fault>
where
  T: Save + ?Sized,
{
  serialize_with(OutputArchive::for_checkpoint(Arc::clone(node)), value).await
}

async fn serialize_with<T>(mut archive: OutputArchive, value: &T) -> Result<Vec<u8>, Fault>
where
  T: Save + ?Sized,
{
  // Preprocessing pass: discover handles and reserve their credit.
  value.save(&mut archive)?;
  archive.settle().await?;

  // Save pass: emit bytes over the resolved tables.
  value.save(&mut archive)?;

  archive.finish()
}
