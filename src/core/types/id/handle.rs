use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Arc;
use triomphe::Arc as RecordArc;

use crate::consts::LOG2_INITIAL_GLOBAL_CREDIT;
use crate::core::Gid;
use crate::core::IdRecord;
use crate::core::Management;
use crate::core::WeakId;
use crate::core::split;
use crate::error::Fault;
use crate::error::FaultKind;
use crate::node::Locality;

/// A distributed, credit-bearing reference to a component.
///
/// An `Id` is a shared pointer over an internal record maintaining two
/// reference counts: a local one, bumped on every [`Clone`] and dropped
/// on every `Drop`, and a share of the global one, carried as *credit*
/// inside the identifier bits. Copies are free; only transmitting a
/// handle to another locality splits the credit, and only the last
/// local drop of a managed handle talks to the address service.
///
/// # Cyclic references
///
/// The credit protocol does not collect cycles. Two components holding
/// managed handles to each other keep each other alive forever; breaking
/// such cycles (or avoiding them) is the application's responsibility.
/// [`WeakId`] exists for exactly that purpose.
#[derive(Clone)]
pub struct Id {
  repr: RecordArc<IdRecord>,
}

impl Id {
  /// Mints the first handle of a freshly created target.
  ///
  /// The handle is managed and holds the full initial credit budget with
  /// the split flag clear; as long as it is never transmitted, the whole
  /// lifetime of the target stays a local affair.
  ///
  /// # Errors
  ///
  /// Fails with [`BadParameter`][FaultKind::BadParameter] if `gid` is
  /// the null identifier or already carries internal window bits.
  pub fn create(gid: Gid, node: &Arc<Locality>) -> Result<Self, Fault> {
    if !gid.is_valid() {
      return Err(Fault::new(
        FaultKind::BadParameter,
        "cannot create a component from the null identifier",
      ));
    }

    if gid.internal_bits() != 0 {
      return Err(Fault::new(
        FaultKind::BadParameter,
        "fresh identifier already carries bookkeeping bits",
      ));
    }

    let mut gid: Gid = gid;
    gid.set_log2_credit(LOG2_INITIAL_GLOBAL_CREDIT);

    Ok(Self::from_parts(gid, Management::Managed, node))
  }

  /// Wraps an identifier in a handle with the given discipline.
  ///
  /// # Errors
  ///
  /// Fails with [`BadParameter`][FaultKind::BadParameter] if a managed
  /// discipline is requested for an identifier that carries no credit;
  /// managed handles always hold a share of the global refcount.
  pub fn new(gid: Gid, management: Management, node: &Arc<Locality>) -> Result<Self, Fault> {
    if management.is_managed() && !gid.has_credits() {
      return Err(Fault::new(
        FaultKind::BadParameter,
        format!("{management} handle requires a credit-bearing identifier"),
      ));
    }

    Ok(Self::from_parts(gid, management, node))
  }

  /// Reconstructs a handle from its wire form.
  ///
  /// The lock bit is stripped from the incoming identifier.
  ///
  /// # Errors
  ///
  /// Fails with [`VersionTooNew`][FaultKind::VersionTooNew] if the
  /// management byte lies outside the known set.
  pub fn from_wire(gid: Gid, management: u8, node: &Arc<Locality>) -> Result<Self, Fault> {
    let management: Management = Management::from_wire(management)?;

    let mut gid: Gid = gid;
    gid.strip_lock();

    Ok(Self::from_parts(gid, management, node))
  }

  #[inline]
  fn from_parts(gid: Gid, management: Management, node: &Arc<Locality>) -> Self {
    Self {
      repr: RecordArc::new(IdRecord::new(gid, management, Arc::clone(node))),
    }
  }

  /// Returns a snapshot of the underlying raw identifier.
  #[inline]
  pub fn gid(&self) -> Gid {
    self.repr.cell().get()
  }

  /// Returns the management discipline of this handle.
  #[inline]
  pub fn management(&self) -> Management {
    self.repr.management()
  }

  /// Returns the locality this handle was created on.
  #[inline]
  pub fn node(&self) -> &Arc<Locality> {
    self.repr.node()
  }

  /// Returns the number of local copies of this handle.
  #[inline]
  pub fn local_count(&self) -> usize {
    RecordArc::count(&self.repr)
  }

  /// Returns a non-owning reference to the same target.
  #[inline]
  pub fn downgrade(&self) -> WeakId {
    WeakId::new(self.gid().strip_internal_bits(), self.node())
  }

  /// Produces an identifier to hand off to another locality.
  ///
  /// The credit of this handle is divided so that the returned
  /// identifier carries a share of the global refcount; the sum over
  /// both stays unchanged. When the local share is exhausted the call
  /// suspends while fresh credit is requested from the address service.
  ///
  /// # Errors
  ///
  /// Fails with [`ServiceUnavailable`][FaultKind::ServiceUnavailable]
  /// if replenishment is needed while the runtime is shutting down; the
  /// credit already reserved is reaped at process exit.
  #[inline]
  pub async fn split_gid(&self) -> Result<Gid, Fault> {
    split::split_gid_if_needed(&self.repr).await
  }

  /// Refills an exhausted identifier back to the full credit budget.
  ///
  /// The identifier must currently hold no credit (for example after its
  /// credit moved out with a parcel). The added amount is accounted for
  /// with the address service before this returns.
  #[inline]
  pub async fn replenish_credits(&self) -> Result<i64, Fault> {
    split::replenish_credits(&self.repr).await
  }

  /// Returns the shared record backing this handle.
  #[inline]
  pub(crate) fn record(&self) -> &IdRecord {
    &self.repr
  }

  /// Returns a key identifying the shared record, not the identifier
  /// bits: credit mutations leave it untouched, and distinct handles to
  /// the same target keep distinct keys.
  #[inline]
  pub(crate) fn record_key(&self) -> usize {
    let record: &IdRecord = &self.repr;

    record as *const IdRecord as usize
  }
}

impl Debug for Id {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Display::fmt(self, f)
  }
}

impl Display for Id {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Display::fmt(&self.gid(), f)
  }
}
