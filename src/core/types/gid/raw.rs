use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ops::Add;
use std::ops::Sub;
use std::str::FromStr;

use crate::error::Fault;
use crate::error::FaultKind;

/// The raw bits of a global identifier.
///
/// A `Gid` is a 128-bit value viewed as two 64-bit halves. The
/// least-significant half carries object identity; the most-significant
/// half packs the creating locality, the component-kind tag, and an
/// internal window of bookkeeping bits:
///
/// - **Kind**: Component-kind tag (20 bits)
/// - **Credit**: Base-2 logarithm of the current credit share (5 bits)
/// - **Lock**: Embedded spinlock guarding credit mutations (1 bit)
/// - **Valid**: Whether the credit field is meaningful (1 bit)
/// - **Split**: Whether this identifier was ever duplicated (1 bit)
/// - **Locality**: Id of the node that created the target (32 bits)
///
/// # Format
///
/// Identifiers display as `{<msb>, <lsb>}` with both halves as
/// zero-padded lower-case hex, or `{invalid}` for the null identifier.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Gid {
  msb: u64,
  lsb: u64,
}

impl Gid {
  /// Bit width of the component-kind tag.
  pub(crate) const KIND_BITS: u32 = 20;

  /// Bitmask for extracting the component-kind tag.
  pub(crate) const KIND_MASK: u64 = (1 << Self::KIND_BITS) - 1;

  /// Bit position of the credit field.
  pub(crate) const CREDIT_SHIFT: u32 = 24;

  /// Unshifted bitmask of the five-bit credit field.
  pub(crate) const CREDIT_BASE_MASK: u64 = 0x1f;

  /// Bitmask for extracting the credit field.
  pub(crate) const CREDIT_MASK: u64 = Self::CREDIT_BASE_MASK << Self::CREDIT_SHIFT;

  /// Bitmask of the embedded spinlock bit.
  pub(crate) const LOCK_MASK: u64 = 1 << 29;

  /// Bitmask of the credit-valid flag.
  pub(crate) const CREDIT_VALID_MASK: u64 = 1 << 30;

  /// Bitmask of the was-split flag.
  pub(crate) const SPLIT_MASK: u64 = 1 << 31;

  /// Bitmask covering the whole internal window (credit and flags).
  pub(crate) const INTERNAL_MASK: u64 = 0x0000_0000_ff00_0000;

  /// Bit position of the locality tag.
  pub(crate) const LOCALITY_SHIFT: u32 = 32;

  /// The null identifier.
  pub const INVALID: Self = Self::new(0, 0);

  /// Creates a global identifier from its raw halves.
  #[inline]
  pub const fn new(msb: u64, lsb: u64) -> Self {
    Self { msb, lsb }
  }

  /// Creates an identifier naming an object on the given locality.
  ///
  /// The returned identifier carries no credit; see
  /// [`Id::create`][crate::types::Id::create] for minting the first
  /// credit-bearing handle of a fresh target.
  #[inline]
  pub const fn from_locality(locality: u32, kind: u32, lsb: u64) -> Self {
    debug_assert!(kind as u64 <= Self::KIND_MASK);

    let mut msb: u64 = (locality as u64) << Self::LOCALITY_SHIFT;
    msb |= kind as u64 & Self::KIND_MASK;

    Self::new(msb, lsb)
  }

  /// Returns the most-significant half of the identifier.
  #[inline]
  pub const fn msb(self) -> u64 {
    self.msb
  }

  /// Returns the least-significant half of the identifier.
  #[inline]
  pub const fn lsb(self) -> u64 {
    self.lsb
  }

  /// Returns the id of the locality that created the target.
  #[inline]
  pub const fn locality_id(self) -> u32 {
    (self.msb >> Self::LOCALITY_SHIFT) as u32
  }

  /// Returns the component-kind tag.
  #[inline]
  pub const fn kind(self) -> u32 {
    (self.msb & Self::KIND_MASK) as u32
  }

  /// Returns `true` if the identifier is not the null identifier.
  #[inline]
  pub const fn is_valid(self) -> bool {
    self.msb != 0 || self.lsb != 0
  }

  /// Returns the internal window bits of the identifier.
  #[inline]
  pub(crate) const fn internal_bits(self) -> u64 {
    self.msb & Self::INTERNAL_MASK
  }

  /// Returns the identity form of the identifier.
  ///
  /// The internal window is cleared so that two credit shares of the same
  /// target compare equal. Address-service implementations key their
  /// tables by this form.
  #[must_use]
  #[inline]
  pub const fn strip_internal_bits(self) -> Self {
    Self::new(self.msb & !Self::INTERNAL_MASK, self.lsb)
  }
}

impl Add for Gid {
  type Output = Gid;

  /// 128-bit unsigned addition with `lsb → msb` carry.
  ///
  /// The right operand must not carry internal window bits, and the
  /// result keeps the left operand's window intact.
  fn add(self, rhs: Gid) -> Gid {
    debug_assert_eq!(rhs.internal_bits(), 0, "rhs carries internal bits");

    let lsb: u64 = self.lsb.wrapping_add(rhs.lsb);
    let mut msb: u64 = self.msb.wrapping_add(rhs.msb);

    if lsb < self.lsb {
      msb = msb.wrapping_add(1);
    }

    let out: Gid = Gid::new(msb, lsb);
    debug_assert_eq!(out.internal_bits(), self.internal_bits());

    out
  }
}

impl Sub for Gid {
  type Output = Gid;

  /// 128-bit unsigned subtraction with `msb ← lsb` borrow.
  ///
  /// Symmetric to [`Add`]: the right operand must not carry internal
  /// window bits, and the result keeps the left operand's window intact.
  fn sub(self, rhs: Gid) -> Gid {
    debug_assert_eq!(rhs.internal_bits(), 0, "rhs carries internal bits");

    let lsb: u64 = self.lsb.wrapping_sub(rhs.lsb);
    let mut msb: u64 = self.msb.wrapping_sub(rhs.msb);

    if lsb > self.lsb {
      msb = msb.wrapping_sub(1);
    }

    let out: Gid = Gid::new(msb, lsb);
    debug_assert_eq!(out.internal_bits(), self.internal_bits());

    out
  }
}

impl Debug for Gid {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Display::fmt(self, f)
  }
}

impl Display for Gid {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    if self.is_valid() {
      write!(f, "{{{:016x}, {:016x}}}", self.msb, self.lsb)
    } else {
      f.write_str("{invalid}")
    }
  }
}

impl FromStr for Gid {
  type Err = Fault;

  fn from_str(input: &str) -> Result<Self, Self::Err> {
    fn malformed() -> Fault {
      Fault::new(FaultKind::BadParameter, "malformed identifier literal")
    }

    if input == "{invalid}" {
      return Ok(Self::INVALID);
    }

    let body: &str = input
      .strip_prefix('{')
      .and_then(|value| value.strip_suffix('}'))
      .ok_or_else(malformed)?;

    let (msb, lsb) = body.split_once(", ").ok_or_else(malformed)?;

    if msb.len() != 16 || lsb.len() != 16 {
      return Err(malformed());
    }

    let msb: u64 = u64::from_str_radix(msb, 16).map_err(|_| malformed())?;
    let lsb: u64 = u64::from_str_radix(lsb, 16).map_err(|_| malformed())?;

    Ok(Self::new(msb, lsb))
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
