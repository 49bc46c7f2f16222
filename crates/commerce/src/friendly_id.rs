//! Short, customer friendly codes for numeric ids (invoice and order
//! numbers).
//!
//! An id is first scrambled with a perfect hash over a field of `size + 1`
//! values, then written in the base of a restricted alphabet that avoids
//! characters easily confused in print or over the phone. Consecutive ids
//! produce unrelated codes, so a code does not leak how many sales were made.
//!
//! The field grows with the id: it starts at `chars^minimum_length - 1` and
//! is multiplied by the alphabet size until the id fits, which adds one
//! character per step. Every code decodes back to its id.
use crate::{ResultSummary, SummaryError};

/// Uppercase alphanumerics without look-alikes (`1/I`, `0/O`, `Z/2`, ...).
pub const DEFAULT_VALID_CHARS: &str = "3456789ACDEFGHJKLQRSTUVWXY";
/// Share of the field the hash is shifted by.
pub const DEFAULT_OFFSET_PERCENT: u32 = 30;
/// With the default alphabet five characters cover about 11 million ids.
pub const DEFAULT_MINIMUM_LENGTH: u32 = 5;

/// Encoder and decoder of friendly ids.
///
/// # Examples
///
/// ```rust
/// use commerce::FriendlyId;
///
/// let ids = FriendlyId::default();
/// assert_eq!(ids.encode(1).unwrap(), "F5USF");
/// assert_eq!(ids.decode("F5USF").unwrap(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FriendlyId {
    chars: Vec<char>,
    offset_percent: u32,
    string_length: usize,
    minimum_size: u128,
}

impl Default for FriendlyId {
    fn default() -> Self {
        let chars: Vec<char> = DEFAULT_VALID_CHARS.chars().collect();
        let minimum_size = (chars.len() as u128).pow(DEFAULT_MINIMUM_LENGTH) - 1;
        Self {
            chars,
            offset_percent: DEFAULT_OFFSET_PERCENT,
            string_length: 0,
            minimum_size,
        }
    }
}

impl FriendlyId {
    /// Return a builder for `FriendlyId`.
    #[must_use]
    pub fn builder() -> FriendlyIdBuilder {
        FriendlyIdBuilder::default()
    }

    #[must_use]
    pub fn valid_chars(&self) -> String {
        self.chars.iter().collect()
    }

    /// Encodes an id.
    pub fn encode(&self, id: u64) -> ResultSummary<String> {
        let size = self.size(id);
        let hash = self.perfect_hash(u128::from(id), size)?;
        Ok(self.friendly_string(hash, size))
    }

    /// Decodes a code produced by [`FriendlyId::encode`].
    pub fn decode(&self, code: &str) -> ResultSummary<u64> {
        let unknown = || SummaryError::InvalidValue(format!("{code:?} is not a friendly id"));
        let base = self.base();
        let length = code.chars().count();

        let mut digits = 0_u128;
        for c in code.chars() {
            let digit = self
                .chars
                .iter()
                .position(|valid| *valid == c)
                .ok_or_else(unknown)?;
            digits = digits
                .checked_mul(base)
                .and_then(|digits| digits.checked_add(digit as u128))
                .ok_or_else(unknown)?;
        }

        let mut size = self.minimum_size;
        while natural_length(base, size) <= length {
            if self.length(size) == length
                && let Some(id) = self.unhash(digits, length, size)?
                && self.encode(id)? == code
            {
                return Ok(id);
            }
            match size.checked_mul(base) {
                Some(next) => size = next,
                None => break,
            }
        }
        Err(unknown())
    }

    fn base(&self) -> u128 {
        self.chars.len() as u128
    }

    /// Smallest field holding `id`.
    fn size(&self, id: u64) -> u128 {
        let id = u128::from(id);
        let mut size = self.minimum_size;
        while id > size {
            size *= self.base();
        }
        size
    }

    /// A factor of `size`, preferring ones close to half the alphabet.
    fn period(&self, size: u128) -> ResultSummary<u128> {
        let len = self.base();
        let start = if len > 14 { len / 2 } else { 13 };
        (8..=start)
            .rev()
            .chain((start + 2..=size.isqrt()).rev())
            .chain([6, 5, 4, 3, 2])
            .find(|period| size % period == 0)
            .ok_or_else(|| SummaryError::InvalidValue(format!("no period divides {size}")))
    }

    fn offset(&self, size: u128) -> u128 {
        (size * u128::from(self.offset_percent) / 100) % (size + 1)
    }

    /// Maps `id` onto `1..=size + 1`, one to one.
    fn perfect_hash(&self, id: u128, size: u128) -> ResultSummary<u128> {
        let field = size + 1;
        let step = size / self.period(size)?;
        let shifted = (id + self.offset(size) + size) % field;
        Ok(mul_mod(shifted, step, field) + 1)
    }

    /// Inverse of [`Self::perfect_hash`] for one field size.
    fn unhash(&self, digits: u128, length: usize, size: u128) -> ResultSummary<Option<u64>> {
        let field = size + 1;
        // A hash of `field` is written as all zero digits.
        let hash = match digits {
            0 => u32::try_from(length)
                .ok()
                .and_then(|length| self.base().checked_pow(length)),
            digits => Some(digits),
        };
        let Some(hash) = hash.filter(|hash| (1..=field).contains(hash)) else {
            return Ok(None);
        };
        let step = size / self.period(size)?;
        let Some(inverse) = inverse_mod(step, field) else {
            return Ok(None);
        };
        let shifted = mul_mod(hash - 1, inverse, field);
        let id = (shifted + 1 + field - self.offset(size)) % field;
        Ok(u64::try_from(id).ok())
    }

    fn length(&self, size: u128) -> usize {
        natural_length(self.base(), size).max(self.string_length)
    }

    /// Writes `hash` in the alphabet's base, left padded to the field length.
    fn friendly_string(&self, mut hash: u128, size: u128) -> String {
        let base = self.base();
        let mut code = Vec::with_capacity(self.length(size));
        for _ in 0..self.length(size) {
            code.push(self.chars[(hash % base) as usize]);
            hash /= base;
        }
        code.iter().rev().collect()
    }
}

/// Characters needed to write every value up to `size`.
fn natural_length(base: u128, size: u128) -> usize {
    let mut length = 0;
    let mut power = 1_u128;
    while power <= size {
        length += 1;
        match power.checked_mul(base) {
            Some(next) => power = next,
            None => break,
        }
    }
    length
}

/// `a * b % m` without overflowing.
fn mul_mod(mut a: u128, mut b: u128, m: u128) -> u128 {
    let mut result = 0;
    a %= m;
    while b > 0 {
        if b & 1 == 1 {
            result = (result + a) % m;
        }
        a = (a << 1) % m;
        b >>= 1;
    }
    result
}

fn inverse_mod(value: u128, modulus: u128) -> Option<u128> {
    let (mut old_r, mut r) = (i128::try_from(value).ok()?, i128::try_from(modulus).ok()?);
    let (mut old_s, mut s) = (1_i128, 0_i128);
    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_s, s) = (s, old_s - quotient * s);
    }
    if old_r != 1 {
        return None;
    }
    u128::try_from(old_s.rem_euclid(i128::try_from(modulus).ok()?)).ok()
}

/// Collects the encoder settings; validation happens in
/// [`FriendlyIdBuilder::build`].
#[derive(Clone, Debug)]
pub struct FriendlyIdBuilder {
    valid_chars: String,
    offset_percent: u32,
    string_length: usize,
    minimum_length: u32,
}

impl Default for FriendlyIdBuilder {
    fn default() -> Self {
        Self {
            valid_chars: DEFAULT_VALID_CHARS.to_string(),
            offset_percent: DEFAULT_OFFSET_PERCENT,
            string_length: 0,
            minimum_length: DEFAULT_MINIMUM_LENGTH,
        }
    }
}

impl FriendlyIdBuilder {
    #[must_use]
    pub fn valid_chars(mut self, valid_chars: &str) -> Self {
        self.valid_chars = valid_chars.to_string();
        self
    }

    #[must_use]
    pub fn offset_percent(mut self, offset_percent: u32) -> Self {
        self.offset_percent = offset_percent;
        self
    }

    /// Pads codes to at least `string_length` characters. Rarely needed:
    /// the length already follows the size of the id.
    #[must_use]
    pub fn string_length(mut self, string_length: usize) -> Self {
        self.string_length = string_length;
        self
    }

    #[must_use]
    pub fn minimum_length(mut self, minimum_length: u32) -> Self {
        self.minimum_length = minimum_length;
        self
    }

    pub fn build(self) -> ResultSummary<FriendlyId> {
        let chars: Vec<char> = self.valid_chars.chars().collect();
        if chars.len() < 2 {
            return Err(SummaryError::Config(
                "friendly id: at least two valid characters are needed".to_string(),
            ));
        }
        if let Some((index, c)) = chars
            .iter()
            .enumerate()
            .find(|(index, c)| chars[..*index].contains(*c))
        {
            return Err(SummaryError::Config(format!(
                "friendly id: {c:?} repeated at position {index}"
            )));
        }
        if self.minimum_length == 0 {
            return Err(SummaryError::Config(
                "friendly id: minimum length must be positive".to_string(),
            ));
        }
        // Leaves room for growing the field past any u64 id.
        let minimum_size = (chars.len() as u128)
            .checked_pow(self.minimum_length)
            .filter(|power| power.checked_mul(u128::from(u64::MAX)).is_some())
            .ok_or_else(|| {
                SummaryError::Config(format!(
                    "friendly id: minimum length {} is too large",
                    self.minimum_length
                ))
            })?
            - 1;

        Ok(FriendlyId {
            chars,
            offset_percent: self.offset_percent,
            string_length: self.string_length,
            minimum_size,
        })
    }
}
