//! # Order numbers
//!
//! Merchant trade numbers are the local date, a short seller code, and a
//! freshly minted [`SnowflakeId`] in decimal:
//!
//! ```text
//! 20240611PF1796245170932101120
//! |------||-||-----------------|
//!   date  code    snowflake id
//! ```
//!
//! The numeric suffix carries all of the uniqueness; the date and code are for
//! humans reading a receipt.

use core::{fmt, str::FromStr};

use chrono::{Local, NaiveDate};

use crate::{BasicIdWorker, Error, IdGenerator, Result, SnowflakeId, SystemClock, TWITTER_EPOCH};

/// Seller code used when none is configured ("PF", short for productpix).
pub const DEFAULT_SELLER_CODE: &str = "PF";

/// Longest accepted seller code.
pub const MAX_SELLER_CODE_LEN: usize = 8;

const DATE_FORMAT: &str = "%Y%m%d";
const DATE_LEN: usize = 8;

/// Builds order numbers from a generator and a seller code.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use idworker::{LockIdWorker, OrderNumberFormatter, SystemClock};
///
/// let formatter = OrderNumberFormatter::new(LockIdWorker::new(1, 2, SystemClock::default())?);
/// let date = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
/// let order_no = formatter.order_number_on(date)?;
/// assert!(order_no.starts_with("20240611PF"));
/// # Ok::<(), idworker::Error>(())
/// ```
#[derive(Debug)]
pub struct OrderNumberFormatter<G> {
    generator: G,
    seller_code: String,
}

impl<G> OrderNumberFormatter<G>
where
    G: IdGenerator,
{
    /// Creates a formatter using [`DEFAULT_SELLER_CODE`].
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            seller_code: DEFAULT_SELLER_CODE.to_owned(),
        }
    }

    /// Creates a formatter with a custom seller code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSellerCode`] unless the code is 1 to
    /// [`MAX_SELLER_CODE_LEN`] ASCII letters. Digits are refused so the code
    /// can never run into the numeric suffix.
    pub fn with_seller_code(generator: G, seller_code: impl Into<String>) -> Result<Self> {
        let seller_code = seller_code.into();
        validate_seller_code(&seller_code)?;
        Ok(Self {
            generator,
            seller_code,
        })
    }

    pub fn seller_code(&self) -> &str {
        &self.seller_code
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Mints an order number dated with the current local date.
    ///
    /// # Errors
    ///
    /// Propagates any error from the generator's `next_id`.
    pub fn next_order_number(&self) -> Result<String> {
        self.order_number_on(Local::now().date_naive())
    }

    /// Mints an order number carrying `date`.
    ///
    /// # Errors
    ///
    /// Propagates any error from the generator's `next_id`.
    pub fn order_number_on(&self, date: NaiveDate) -> Result<String> {
        let id = self.generator.next_id()?;
        Ok(OrderNumber {
            date,
            seller_code: self.seller_code.clone(),
            id,
        }
        .to_string())
    }
}

/// Mints a merchant trade number with a throwaway worker `(1, 2)` on the
/// system clock.
///
/// Every call builds a new worker, so two calls landing in the same
/// millisecond produce the same number. Services issuing orders concurrently
/// should keep one [`OrderNumberFormatter`] around instead.
///
/// # Errors
///
/// Propagates any error from the generator.
pub fn generate_out_trade_no() -> Result<String> {
    let worker = BasicIdWorker::new(1, 2, SystemClock::with_epoch(TWITTER_EPOCH)?)?;
    OrderNumberFormatter::new(worker).next_order_number()
}

/// An order number split back into its parts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderNumber {
    pub date: NaiveDate,
    pub seller_code: String,
    pub id: SnowflakeId,
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.date.format(DATE_FORMAT),
            self.seller_code,
            self.id
        )
    }
}

impl FromStr for OrderNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_order_number(s)
    }
}

/// Splits an order number into date, seller code, and ID.
///
/// # Errors
///
/// Returns [`Error::InvalidOrderNumber`] if `input` is not
/// `YYYYMMDD` + letters + a decimal ID that fits in 63 bits.
pub fn parse_order_number(input: &str) -> Result<OrderNumber> {
    let invalid = || Error::InvalidOrderNumber {
        input: input.to_owned(),
    };

    if !input.is_ascii() || input.len() <= DATE_LEN {
        return Err(invalid());
    }
    let (date, rest) = input.split_at(DATE_LEN);
    if !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid())?;

    let code_len = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
    let (seller_code, digits) = rest.split_at(code_len);
    if validate_seller_code(seller_code).is_err()
        || digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let raw: u64 = digits.parse().map_err(|_| invalid())?;
    if raw > i64::MAX as u64 {
        return Err(invalid());
    }

    Ok(OrderNumber {
        date,
        seller_code: seller_code.to_owned(),
        id: SnowflakeId::from_raw(raw),
    })
}

fn validate_seller_code(code: &str) -> Result<()> {
    if code.is_empty()
        || code.len() > MAX_SELLER_CODE_LEN
        || !code.bytes().all(|b| b.is_ascii_alphabetic())
    {
        return Err(Error::InvalidSellerCode {
            code: code.to_owned(),
        });
    }
    Ok(())
}
