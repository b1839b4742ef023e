use crate::core::Gid;
use crate::error::Fault;
use crate::ser::InputArchive;
use crate::ser::OutputArchive;

/// A value that can be written into an output archive.
///
/// Serialization runs in two passes over one archive: a preprocessing
/// pass that front-loads every operation that may suspend, then a save
/// pass that only emits bytes. `save` is invoked once per pass; types
/// whose passes differ branch on [`OutputArchive::is_preprocessing`].
/// Primitive writes are ignored during preprocessing.
pub trait Save {
  fn save(&self, archive: &mut OutputArchive) -> Result<(), Fault>;
}

/// A value that can be read back from an input archive.
pub trait Load: Sized {
  fn load(archive: &mut InputArchive) -> Result<Self, Fault>;
}

impl Save for u8 {
  #[inline]
  fn save(&self, archive: &mut OutputArchive) -> Result<(), Fault> {
    archive.write_u8(*self);

    Ok(())
  }
}

impl Load for u8 {
  #[inline]
  fn load(archive: &mut InputArchive) -> Result<Self, Fault> {
    archive.read_u8()
  }
}

impl Save for u64 {
  #[inline]
  fn save(&self, archive: &mut OutputArchive) -> Result<(), Fault> {
    archive.write_u64(*self);

    Ok(())
  }
}

impl Load for u64 {
  #[inline]
  fn load(archive: &mut InputArchive) -> Result<Self, Fault> {
    archive.read_u64()
  }
}

impl Save for Gid {
  /// Writes both halves; the lock bit never reaches the wire.
  #[inline]
  fn save(&self, archive: &mut OutputArchive) -> Result<(), Fault> {
    let mut gid: Gid = *self;
    gid.strip_lock();

    archive.write_u64(gid.msb());
    archive.write_u64(gid.lsb());

    Ok(())
  }
}

impl Load for Gid {
  /// Reads both halves, stripping the lock bit upon receive.
  #[inline]
  fn load(archive: &mut InputArchive) -> Result<Self, Fault> {
    let msb: u64 = archive.read_u64()?;
    let lsb: u64 = archive.read_u64()?;

    let mut gid: Gid = Gid::new(msb, lsb);
    gid.strip_lock();

    Ok(gid)
  }
}
