//! CPF (Cadastro de Pessoas Físicas) taxpayer number.
//!
//! A CPF is an 11-digit number whose last two digits are check digits
//! computed with a mod-11 weighted sum over the preceding digits. It is
//! commonly written with punctuation (`123.456.789-09`), which is stripped
//! before validation.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Number of digits in a CPF.
const CPF_LENGTH: usize = 11;

/// Number of leading digits that carry the registration number.
const BODY_LENGTH: usize = 9;

/// Errors that can occur when parsing a [`Cpf`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CpfError {
    /// The input is empty (after stripping punctuation).
    #[error("CPF cannot be empty")]
    Empty,
    /// The input does not have exactly 11 characters.
    #[error("CPF must have {CPF_LENGTH} digits (got {len})")]
    InvalidLength {
        /// Number of characters found after stripping punctuation.
        len: usize,
    },
    /// The input contains something other than digits, `.` or `-`.
    #[error("CPF must contain only digits")]
    NonDigit,
    /// All digits are identical (e.g. `000.000.000-00`).
    #[error("CPF cannot be a repeated digit sequence")]
    RepeatedDigits,
    /// The check digits do not match.
    #[error("CPF check digits do not match")]
    Checksum,
}

/// A validated CPF, stored in normalized form (11 digits, no punctuation).
///
/// ## Examples
///
/// ```
/// use deliveries_core::Cpf;
///
/// let cpf = Cpf::parse("123.456.789-09").unwrap();
/// assert_eq!(cpf.as_str(), "12345678909");
/// assert_eq!(cpf.formatted(), "123.456.789-09");
///
/// assert!(Cpf::parse("111.111.111-11").is_err()); // repeated digits
/// assert!(Cpf::parse("123.456.789-00").is_err()); // wrong check digits
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    /// Parse a `Cpf`, accepting both `12345678909` and `123.456.789-09`.
    ///
    /// # Errors
    ///
    /// Returns an error if the normalized input:
    /// - Is empty
    /// - Does not have exactly 11 characters
    /// - Contains a non-digit character
    /// - Is a single repeated digit
    /// - Has check digits that do not match the first nine digits
    pub fn parse(s: &str) -> Result<Self, CpfError> {
        let normalized = normalize_cpf(s);

        if normalized.is_empty() {
            return Err(CpfError::Empty);
        }

        let len = normalized.chars().count();
        if len != CPF_LENGTH {
            return Err(CpfError::InvalidLength { len });
        }

        let mut first = None;
        if normalized.chars().all(|c| *first.get_or_insert(c) == c) {
            return Err(CpfError::RepeatedDigits);
        }

        let digits = normalized
            .chars()
            .map(|c| c.to_digit(10))
            .collect::<Option<Vec<u32>>>()
            .ok_or(CpfError::NonDigit)?;

        let (body, _) = digits.split_at(BODY_LENGTH);
        let (with_first_check, _) = digits.split_at(BODY_LENGTH + 1);
        let expected = [check_digit(body), check_digit(with_first_check)];

        if digits.get(BODY_LENGTH..) != Some(&expected[..]) {
            return Err(CpfError::Checksum);
        }

        Ok(Self(normalized))
    }

    /// Returns the 11 digits as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the CPF in the conventional `000.000.000-00` layout.
    #[must_use]
    pub fn formatted(&self) -> String {
        let (first, rest) = self.0.split_at(3);
        let (second, rest) = rest.split_at(3);
        let (third, check) = rest.split_at(3);
        format!("{first}.{second}.{third}-{check}")
    }
}

/// Check whether `input` is a valid CPF.
///
/// The characters `.` and `-` are ignored. No other normalization happens:
/// whitespace or any other character makes the input invalid.
#[must_use]
pub fn validate_cpf(input: &str) -> bool {
    Cpf::parse(input).is_ok()
}

/// Strip the `.` and `-` separators from a CPF.
#[must_use]
pub fn normalize_cpf(input: &str) -> String {
    input.chars().filter(|c| !matches!(c, '.' | '-')).collect()
}

/// Mod-11 check digit over `digits`, weighting the first digit with
/// `digits.len() + 1` and decreasing by one per position.
fn check_digit(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((2..=u32::try_from(digits.len() + 1).unwrap_or(u32::MAX)).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();

    match sum % 11 {
        remainder @ 2.. => 11 - remainder,
        _ => 0,
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Cpf {
    type Err = CpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cpf {
    type Error = CpfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

impl AsRef<str> for Cpf {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Cpf {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Cpf {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Cpf {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
