//! Short decimal identifiers for user-facing display.
//!
//! Taking the last `n` decimal digits of a Snowflake ID throws away the
//! timestamp's high bits, so two IDs roughly `10^n / 2^22` milliseconds apart
//! can truncate to the same value. [`ShortIdIssuer`] keeps track of every
//! value it hands out and draws a fresh ID whenever truncation lands on one
//! that is already taken.

use std::collections::HashSet;

use crate::{
    Error, IdGenerator, Result,
    generator::{Mutex, MutexGuard},
};

/// Width of the user ids the marketplace has always issued.
pub const DEFAULT_SHORT_ID_DIGITS: u32 = 11;

/// How many IDs [`ShortIdIssuer::issue`] draws before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Widest short id: every 63-bit value fits in 19 decimal digits.
pub const MAX_SHORT_ID_DIGITS: u32 = 19;

/// Issues fixed-width decimal ids derived from a generator, refusing
/// duplicates.
///
/// The set of issued values lives in memory. A service that already stores
/// short ids (for example in its user table) should load them with
/// [`ShortIdIssuer::reserve`] at startup.
///
/// # Example
///
/// ```
/// use idworker::{LockIdWorker, ShortIdIssuer, SystemClock};
///
/// let issuer = ShortIdIssuer::new(LockIdWorker::new(1, 1, SystemClock::default())?);
/// let user_id = issuer.issue()?;
/// assert_eq!(user_id.len(), 11);
/// # Ok::<(), idworker::Error>(())
/// ```
#[derive(Debug)]
pub struct ShortIdIssuer<G> {
    generator: G,
    digits: u32,
    modulus: u64,
    max_attempts: u32,
    issued: Mutex<HashSet<u64>>,
}

impl<G> ShortIdIssuer<G>
where
    G: IdGenerator,
{
    /// Creates an issuer for [`DEFAULT_SHORT_ID_DIGITS`]-digit ids.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            digits: DEFAULT_SHORT_ID_DIGITS,
            modulus: 10u64.pow(DEFAULT_SHORT_ID_DIGITS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            issued: Mutex::new(HashSet::new()),
        }
    }

    /// Creates an issuer for `digits`-digit ids.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShortIdWidth`] unless `digits` is in
    /// `1..=19`.
    pub fn with_digits(generator: G, digits: u32) -> Result<Self> {
        if digits == 0 || digits > MAX_SHORT_ID_DIGITS {
            return Err(Error::InvalidShortIdWidth { digits });
        }
        Ok(Self {
            digits,
            modulus: 10u64.pow(digits),
            ..Self::new(generator)
        })
    }

    /// Sets how many IDs to draw before reporting a collision. At least one
    /// draw is always made.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub const fn digits(&self) -> u32 {
        self.digits
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Issues a new zero-padded short id.
    ///
    /// # Errors
    ///
    /// - [`Error::ShortIdCollision`] if every draw truncated to a value that
    ///   was already issued.
    /// - Any error from the generator, unchanged.
    pub fn issue(&self) -> Result<String> {
        let mut issued = self.lock()?;
        for _attempt in 1..=self.max_attempts {
            let short = self.generator.next_id()?.to_raw() % self.modulus;
            if issued.insert(short) {
                return Ok(self.render(short));
            }
            #[cfg(feature = "tracing")]
            tracing::warn!(short, attempt = _attempt, "short id collision, drawing again");
        }
        Err(Error::ShortIdCollision {
            attempts: self.max_attempts,
        })
    }

    /// Marks an externally issued short id as taken. Returns `false` if it
    /// was already known, or if it is not a `digits`-wide decimal string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] for a poisoned std mutex.
    ///
    /// [`Error::LockPoisoned`]: crate::Error
    pub fn reserve(&self, short_id: &str) -> Result<bool> {
        if short_id.len() != self.digits as usize || !short_id.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(false);
        }
        let Ok(value) = short_id.parse::<u64>() else {
            return Ok(false);
        };
        Ok(self.lock()?.insert(value))
    }

    /// Number of short ids issued or reserved so far.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] for a poisoned std mutex.
    ///
    /// [`Error::LockPoisoned`]: crate::Error
    pub fn issued_count(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    fn render(&self, short: u64) -> String {
        format!("{short:0width$}", width = self.digits as usize)
    }

    #[allow(clippy::unnecessary_wraps)]
    fn lock(&self) -> Result<MutexGuard<'_, HashSet<u64>>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.issued.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.issued.lock()?)
        }
    }
}
