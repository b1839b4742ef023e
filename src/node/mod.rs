//! Locality environment.
//!
//! A [`Locality`] is the injected capability record standing between
//! the naming core and the surrounding runtime: it owns the address
//! service handle and the shutdown lifecycle state.

mod locality;
mod state;

pub use self::locality::Locality;
pub use self::state::RunState;
