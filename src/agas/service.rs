use std::future::Future;
use std::pin::Pin;

use crate::agas::Address;
use crate::core::Gid;
use crate::error::Fault;

/// Future returned by asynchronous address-service calls.
pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = Result<T, Fault>> + Send + 'static>>;

/// Typed façade over the global address service.
///
/// The naming core consumes exactly these four operations; everything
/// else the service does (resolution protocols, range allocation,
/// transport) is invisible here. Implementations must be thread-safe
/// and should key their state by [`Gid::strip_internal_bits`], since
/// credit and flag bits differ between shares of the same target.
pub trait AddressService: Send + Sync {
  /// Increases the global credit held on behalf of `gid` by `credits`.
  ///
  /// Asynchronous; the returned future resolves to the credit total
  /// after the increment. Callers must not hold any identifier lock
  /// while awaiting it.
  fn incref(&self, gid: Gid, credits: i64) -> ServiceFuture<i64>;

  /// Decreases the global credit held on behalf of `gid` by `credits`.
  ///
  /// Fire-and-forget semantics: callers log failures and never
  /// propagate them. A total reaching zero destroys the target.
  fn decref(&self, gid: Gid, credits: i64) -> Result<(), Fault>;

  /// Non-blocking probe of the local address cache.
  ///
  /// Returns `None` when the target is not locally known; a miss says
  /// nothing about whether the target exists elsewhere.
  fn resolve_cached(&self, gid: Gid) -> Option<Address>;

  /// Destroys the component named by `gid` in-process.
  ///
  /// Synchronous local call, valid only when the target lives at
  /// `address` on this locality.
  fn destroy_component(&self, gid: Gid, address: &Address) -> Result<(), Fault>;
}
