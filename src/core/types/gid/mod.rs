mod cell;
mod credit;
mod raw;

pub(crate) use self::cell::GidCell;
pub(crate) use self::cell::GidGuard;

pub use self::raw::Gid;
