use crate::core::Gid;
use crate::core::Id;
use crate::core::Management;
use crate::core::split;
use crate::error::Fault;
use crate::error::FaultKind;
use crate::ser::InputArchive;
use crate::ser::Load;
use crate::ser::OutputArchive;
use crate::ser::Save;

/// Wire form of a handle: `{ msb: u64, lsb: u64, management: u8 }` with
/// the lock bit clear. During the preprocessing pass a managed handle
/// reserves its post-split identifier asynchronously; the save pass only
/// copies the resolved bits.
impl Save for Id {
  fn save(&self, archive: &mut OutputArchive) -> Result<(), Fault> {
    if archive.is_preprocessing() {
      return preprocess_gid(self, archive);
    }

    let management: Management = self.management();

    if management.is_managed() && archive.is_checkpointing() {
      return Err(checkpoint_fault());
    }

    let gid: Gid = match management {
      Management::Unmanaged => self.gid(),
      Management::ManagedMoveCredit => {
        // All credits are moved to the serialized identifier; the peer
        // just sees a managed handle with our former share.
        split::move_gid(self.record().cell())
      }
      Management::Managed => match archive.split_gid_for(self.record_key()) {
        Some(gid) => gid,
        None => {
          return Err(Fault::new(
            FaultKind::InvalidStatus,
            "identifier credit was not preprocessed",
          ));
        }
      },
    };

    gid.save(archive)?;
    archive.write_u8(management.to_wire());

    Ok(())
  }
}

impl Load for Id {
  fn load(archive: &mut InputArchive) -> Result<Self, Fault> {
    let gid: Gid = Gid::load(archive)?;
    let management: u8 = u8::load(archive)?;

    archive.adopt(gid, management)
  }
}

/// Resolves the future credit of a managed handle before any byte of the
/// parcel is written.
fn preprocess_gid(id: &Id, archive: &mut OutputArchive) -> Result<(), Fault> {
  let management: Management = id.management();

  // Unmanaged handles require no special handling.
  if management == Management::Unmanaged {
    return Ok(());
  }

  if archive.is_checkpointing() {
    return Err(checkpoint_fault());
  }

  debug_assert!(id.gid().has_credits());

  // Move-credit handles give up their whole share at save time; only
  // plain managed handles split, and each record splits at most once
  // per archive no matter how often it appears in the message.
  if management == Management::Managed {
    archive.await_split(id)?;
  }

  Ok(())
}

fn checkpoint_fault() -> Fault {
  Fault::new(
    FaultKind::InvalidStatus,
    "can't check-point managed ids, use a client wrapper instead",
  )
}
