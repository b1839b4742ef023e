use crate::core::Gid;

/// Credit codec over the internal window of a [`Gid`].
///
/// The credit share is stored as a base-2 logarithm: splits always halve
/// the share, so halving is a field decrement and the whole share fits in
/// five bits. All operations here are total; none reach the network.
impl Gid {
  /// Returns `true` if the credit field is meaningful.
  #[inline]
  pub const fn has_credits(self) -> bool {
    self.msb() & Self::CREDIT_VALID_MASK != 0
  }

  /// Returns `true` if this identifier, or some ancestor it was copied
  /// from, has ever been duplicated across localities.
  #[inline]
  pub const fn was_split(self) -> bool {
    self.msb() & Self::SPLIT_MASK != 0
  }

  /// Returns `true` if the embedded spinlock bit is set.
  #[inline]
  pub const fn is_locked(self) -> bool {
    self.msb() & Self::LOCK_MASK != 0
  }

  /// Returns the base-2 logarithm of the current credit share.
  #[inline]
  pub const fn log2_credit(self) -> u16 {
    ((self.msb() >> Self::CREDIT_SHIFT) & Self::CREDIT_BASE_MASK) as u16
  }

  /// Returns the current credit share.
  ///
  /// A credit of zero means the target is not globally reference counted
  /// through this identifier.
  #[inline]
  pub const fn credit(self) -> i64 {
    if self.has_credits() {
      1 << self.log2_credit()
    } else {
      0
    }
  }

  /// Stores `log2` in the credit field and marks the field meaningful.
  #[inline]
  pub fn set_log2_credit(&mut self, log2: u16) {
    debug_assert!((log2 as u64) <= Self::CREDIT_BASE_MASK);

    let mut msb: u64 = self.msb() & !Self::CREDIT_MASK;
    msb |= (log2 as u64) << Self::CREDIT_SHIFT;
    msb |= Self::CREDIT_VALID_MASK;

    *self = Self::new(msb, self.lsb());
  }

  /// Stores the given credit share, which must be zero or a power of two.
  #[inline]
  pub fn set_credit(&mut self, credit: i64) {
    if credit == 0 {
      self.strip_credits();
      return;
    }

    debug_assert!(credit > 0);
    debug_assert_eq!(credit & (credit - 1), 0, "credit must be a power of two");

    self.set_log2_credit(credit.ilog2() as u16);
  }

  /// Sets the was-split flag.
  ///
  /// The flag is never cleared by any core operation; once an identifier
  /// leaves its locality, garbage collection for the target can no longer
  /// be assumed to be purely local.
  #[inline]
  pub fn mark_split(&mut self) {
    *self = Self::new(self.msb() | Self::SPLIT_MASK, self.lsb());
  }

  /// Clears the credit field and the credit-valid flag.
  ///
  /// The was-split flag is preserved.
  #[inline]
  pub fn strip_credits(&mut self) {
    let msb: u64 = self.msb() & !(Self::CREDIT_MASK | Self::CREDIT_VALID_MASK);

    *self = Self::new(msb, self.lsb());
  }

  /// Clears the embedded spinlock bit.
  ///
  /// Serialized identifiers must never carry the lock bit on the wire.
  #[inline]
  pub(crate) fn strip_lock(&mut self) {
    *self = Self::new(self.msb() & !Self::LOCK_MASK, self.lsb());
  }

  /// Raises the credit share to the largest power of two not exceeding
  /// `credits`, returning the amount of credit added.
  #[inline]
  pub fn fill_credit(&mut self, credits: i64) -> i64 {
    debug_assert!(credits > 0);

    let current: i64 = self.credit();
    let target: i64 = 1 << credits.ilog2();
    debug_assert!(current <= target);

    self.set_log2_credit(target.ilog2() as u16);

    target - current
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
