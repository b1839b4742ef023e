//! Mizar - the naming core of a distributed runtime.
//!
//! Components live on one of many cooperating localities and are
//! referenced through portable handles ([`Id`][types::Id]). A managed
//! handle keeps its target alive exactly as long as some copy of it
//! exists anywhere in the system, then triggers destruction exactly
//! once.
//!
//! # How distributed garbage collection works
//!
//! Every handle maintains two reference counts: a local count, bumped
//! and dropped as the handle is copied within one process, and a share
//! of a global count, carried inside the identifier bits as *credit*.
//! Credit is issued in power-of-two chunks, so a handle can travel to
//! another locality by simply halving its share and sending one half
//! along, without consulting the address service. Only when a share is
//! exhausted is fresh credit requested, and only when the last local
//! copy drops is the share given back. A target whose identifier never
//! left its creating locality is destroyed entirely locally.
//!
//! The price of this scheme is that the address service cannot tell a
//! live-but-untracked target from a destroyed one; conservation of the
//! credit sum is what makes the protocol sound.
//!
//! # Cyclic references are not collected
//!
//! The reference graph is assumed acyclic. Components that hold managed
//! handles to each other will never be reclaimed; break such cycles
//! with a [`WeakId`][types::WeakId] or avoid them outright.

mod core;
mod loom;

pub mod agas;
pub mod consts;
pub mod node;
pub mod ser;

pub mod error {
  //! Naming-core errors.

  pub use crate::core::Fault;
  pub use crate::core::FaultKind;
}

pub mod types {
  //! Core types of the mizar naming system.

  pub use crate::core::Gid;
  pub use crate::core::Id;
  pub use crate::core::Management;
  pub use crate::core::WeakId;
}
