use hashbrown::HashMap;
use std::sync::Arc;

use crate::consts::CAP_LOADED_GIDS;
use crate::core::Gid;
use crate::core::Id;
use crate::core::Management;
use crate::error::Fault;
use crate::error::FaultKind;
use crate::node::Locality;
use crate::ser::Load;

/// An input archive reading back the wire form of a parcel.
///
/// Identifier records are tracked across the whole parcel: when the
/// same identifier appears several times, every occurrence resolves to
/// one shared record, so the credit carried by the parcel is counted
/// exactly once no matter how many copies the sender wrote.
pub struct InputArchive {
  node: Arc<Locality>,
  bytes: Vec<u8>,
  cursor: usize,
  loaded: HashMap<Gid, Id>,
}

impl InputArchive {
  /// Creates an archive over received parcel bytes.
  pub fn new(bytes: Vec<u8>, node: Arc<Locality>) -> Self {
    Self {
      node,
      bytes,
      cursor: 0,
      loaded: HashMap::with_capacity(CAP_LOADED_GIDS),
    }
  }

  /// Reads the next value from the archive.
  #[inline]
  pub fn read<T>(&mut self) -> Result<T, Fault>
  where
    T: Load,
  {
    T::load(self)
  }

  /// Returns the number of bytes not yet consumed.
  #[inline]
  pub fn remaining(&self) -> usize {
    self.bytes.len() - self.cursor
  }

  /// Reads one byte.
  #[inline]
  pub fn read_u8(&mut self) -> Result<u8, Fault> {
    self.take::<1>().map(|bytes| bytes[0])
  }

  /// Reads one little-endian word.
  #[inline]
  pub fn read_u64(&mut self) -> Result<u64, Fault> {
    self.take::<8>().map(u64::from_le_bytes)
  }

  fn take<const N: usize>(&mut self) -> Result<[u8; N], Fault> {
    let Some(slice) = self.bytes.get(self.cursor..self.cursor + N) else {
      return Err(Fault::new(FaultKind::BadParameter, "truncated parcel"));
    };

    let mut out: [u8; N] = [0; N];
    out.copy_from_slice(slice);

    self.cursor += N;

    Ok(out)
  }

  /// Materializes a handle for a received identifier record.
  ///
  /// Repeated occurrences of the same identifier share one record;
  /// unknown management encodings fail with
  /// [`VersionTooNew`][FaultKind::VersionTooNew].
  pub(crate) fn adopt(&mut self, gid: Gid, wire: u8) -> Result<Id, Fault> {
    let management: Management = Management::from_wire(wire)?;

    let mut gid: Gid = gid;
    gid.strip_lock();

    if let Some(existing) = self.loaded.get(&gid) {
      if existing.management() == management {
        return Ok(existing.clone());
      }
    }

    let id: Id = Id::from_wire(gid, wire, &self.node)?;

    self.loaded.insert(gid, id.clone());

    Ok(id)
  }
}
