//! Date and date-time wrappers around `chrono`.

use chrono::{DateTime as ChronoDateTime, Datelike, FixedOffset, NaiveDate as ChronoNaiveDate};

use crate::core::ValidationError;

pub(crate) const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `date-time = DQUOTE date-day-fixed "-" date-month "-" date-year SP time SP zone DQUOTE`
///
/// The year is restricted to four digits so that every value has a rendering.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct DateTime(pub(crate) ChronoDateTime<FixedOffset>);

impl DateTime {
    pub fn verify(value: &ChronoDateTime<FixedOffset>) -> Result<(), ValidationError> {
        if (0..=9999).contains(&value.year()) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange)
        }
    }

    pub(crate) fn unvalidated(value: ChronoDateTime<FixedOffset>) -> Self {
        debug_assert!(Self::verify(&value).is_ok());
        Self(value)
    }
}

impl TryFrom<ChronoDateTime<FixedOffset>> for DateTime {
    type Error = ValidationError;

    fn try_from(value: ChronoDateTime<FixedOffset>) -> Result<Self, Self::Error> {
        Self::verify(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<ChronoDateTime<FixedOffset>> for DateTime {
    fn as_ref(&self) -> &ChronoDateTime<FixedOffset> {
        &self.0
    }
}

/// `date = date-text / DQUOTE date-text DQUOTE` (used by SEARCH)
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NaiveDate(pub(crate) ChronoNaiveDate);

impl NaiveDate {
    pub fn verify(value: &ChronoNaiveDate) -> Result<(), ValidationError> {
        if (0..=9999).contains(&value.year()) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange)
        }
    }

    pub(crate) fn unvalidated(value: ChronoNaiveDate) -> Self {
        debug_assert!(Self::verify(&value).is_ok());
        Self(value)
    }
}

impl TryFrom<ChronoNaiveDate> for NaiveDate {
    type Error = ValidationError;

    fn try_from(value: ChronoNaiveDate) -> Result<Self, Self::Error> {
        Self::verify(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<ChronoNaiveDate> for NaiveDate {
    fn as_ref(&self) -> &ChronoNaiveDate {
        &self.0
    }
}
