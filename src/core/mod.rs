mod error;
mod types;

pub(crate) mod split;

pub(crate) use self::types::GidCell;
pub(crate) use self::types::GidGuard;
pub(crate) use self::types::IdRecord;

pub use self::error::Fault;
pub use self::error::FaultKind;
pub use self::types::Gid;
pub use self::types::Id;
pub use self::types::Management;
pub use self::types::WeakId;
