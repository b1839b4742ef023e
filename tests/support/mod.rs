//! A recording address service for end-to-end credit tests.

#![allow(dead_code)]

use hashbrown::HashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use mizar::agas::Address;
use mizar::agas::AddressService;
use mizar::agas::ServiceFuture;
use mizar::error::Fault;
use mizar::error::FaultKind;
use mizar::types::Gid;

/// One observed address-service call.
///
/// Identifiers are recorded in their identity form so assertions don't
/// depend on the credit bits the caller happened to hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
  Incref(Gid, i64),
  Decref(Gid, i64),
  Destroy(Gid),
}

type Probe = Box<dyn Fn() + Send + Sync>;

/// Address service double that records every call it receives.
#[derive(Default)]
pub struct RecordingService {
  events: Mutex<Vec<Event>>,
  resolvable: Mutex<HashMap<Gid, Address>>,
  fail_incref: Mutex<bool>,
  destroy_fault: Mutex<Option<FaultKind>>,
  probe: Mutex<Option<Probe>>,
}

impl RecordingService {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  /// Makes `gid` resolvable through the local address cache.
  pub fn insert_resolvable(&self, gid: Gid, address: Address) {
    self
      .resolvable
      .lock()
      .insert(gid.strip_internal_bits(), address);
  }

  /// Makes every following `incref` fail.
  pub fn fail_increfs(&self) {
    *self.fail_incref.lock() = true;
  }

  /// Makes the next `destroy_component` fail with the given kind.
  pub fn fail_next_destroy(&self, kind: FaultKind) {
    *self.destroy_fault.lock() = Some(kind);
  }

  /// Installs a hook invoked at the start of every service call.
  pub fn set_probe(&self, probe: Probe) {
    *self.probe.lock() = Some(probe);
  }

  /// Removes the installed hook, dropping whatever it captured.
  pub fn clear_probe(&self) {
    *self.probe.lock() = None;
  }

  /// Returns every call observed so far, in order.
  pub fn events(&self) -> Vec<Event> {
    self.events.lock().clone()
  }

  /// Returns the observed `incref` calls.
  pub fn increfs(&self) -> Vec<(Gid, i64)> {
    self
      .events()
      .into_iter()
      .filter_map(|event| match event {
        Event::Incref(gid, credits) => Some((gid, credits)),
        _ => None,
      })
      .collect()
  }

  /// Returns the observed `decref` calls.
  pub fn decrefs(&self) -> Vec<(Gid, i64)> {
    self
      .events()
      .into_iter()
      .filter_map(|event| match event {
        Event::Decref(gid, credits) => Some((gid, credits)),
        _ => None,
      })
      .collect()
  }

  /// Returns the observed `destroy_component` calls.
  pub fn destroys(&self) -> Vec<Gid> {
    self
      .events()
      .into_iter()
      .filter_map(|event| match event {
        Event::Destroy(gid) => Some(gid),
        _ => None,
      })
      .collect()
  }

  /// Returns credit granted minus credit returned, as seen by the
  /// service. At quiescence this plus the credit held by live handles
  /// equals the initial budget of every tracked target.
  pub fn net_credit(&self) -> i64 {
    self
      .events()
      .into_iter()
      .map(|event| match event {
        Event::Incref(_, credits) => credits,
        Event::Decref(_, credits) => -credits,
        Event::Destroy(_) => 0,
      })
      .sum()
  }

  fn observe(&self, event: Event) {
    if let Some(probe) = self.probe.lock().as_ref() {
      probe();
    }

    self.events.lock().push(event);
  }
}

impl AddressService for RecordingService {
  fn incref(&self, gid: Gid, credits: i64) -> ServiceFuture<i64> {
    self.observe(Event::Incref(gid.strip_internal_bits(), credits));

    let fail: bool = *self.fail_incref.lock();

    Box::pin(async move {
      if fail {
        Err(Fault::new(FaultKind::ServiceUnavailable, "incref refused"))
      } else {
        Ok(credits)
      }
    })
  }

  fn decref(&self, gid: Gid, credits: i64) -> Result<(), Fault> {
    self.observe(Event::Decref(gid.strip_internal_bits(), credits));

    Ok(())
  }

  fn resolve_cached(&self, gid: Gid) -> Option<Address> {
    self
      .resolvable
      .lock()
      .get(&gid.strip_internal_bits())
      .copied()
  }

  fn destroy_component(&self, gid: Gid, _address: &Address) -> Result<(), Fault> {
    if let Some(kind) = self.destroy_fault.lock().take() {
      return Err(Fault::new(kind, "destroy refused"));
    }

    self.observe(Event::Destroy(gid.strip_internal_bits()));

    Ok(())
  }
}

/// Builds a running locality backed by a fresh recording service.
pub fn fixture(locality: u32) -> (Arc<RecordingService>, Arc<mizar::node::Locality>) {
  let service: Arc<RecordingService> = RecordingService::new();
  let agas: Arc<dyn AddressService> = Arc::clone(&service) as Arc<dyn AddressService>;

  (service, mizar::node::Locality::new(locality, agas))
}
