//! Parcel serialization.
//!
//! Serializing a message is the moment handles leave their locality, so
//! this is where credit splitting happens. The hard constraint is that
//! the byte-emitting pass must never suspend; all blocking work (the
//! replenishing `incref` a split may need) is hoisted into a dedicated
//! preprocessing pass over the same archive. The save pass then copies
//! resolved bits out of the archive's split table.

mod input;
mod output;
mod traits;

pub use self::input::InputArchive;
pub use self::output::OutputArchive;
pub use self::output::serialize;
pub use self::output::serialize_checkpoint;
pub use self::traits::Load;
pub use self::traits::Save;
