//! Address-service adapter.
//!
//! The address service is the external registry tracking global credit
//! totals and resolving identifiers to physical addresses. The core
//! only ever talks to it through the [`AddressService`] trait, injected
//! via [`Locality`][crate::node::Locality]; tests substitute a mock.

mod address;
mod service;

pub use self::address::Address;
pub use self::service::AddressService;
pub use self::service::ServiceFuture;
