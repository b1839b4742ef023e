mod gid;
mod id;

pub(crate) use self::gid::GidCell;
pub(crate) use self::gid::GidGuard;
pub(crate) use self::id::IdRecord;

pub use self::gid::Gid;
pub use self::id::Id;
pub use self::id::Management;
pub use self::id::WeakId;
