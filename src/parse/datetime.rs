//! Date and date-time parsing.

use abnf_core::{is_digit, streaming::dquote};
use chrono::{
    FixedOffset, LocalResult, NaiveDate as ChronoNaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case, take_while_m_n},
    combinator::{map, value},
    sequence::{delimited, preceded, tuple},
};

use crate::{
    parse::{WireErrorKind, WireParseError, WireResult},
    types::datetime::{DateTime, NaiveDate},
};

use super::core::sp;

/// `date = date-text / DQUOTE date-text DQUOTE`
pub(crate) fn date(input: &[u8]) -> WireResult<NaiveDate> {
    alt((date_text, delimited(dquote, date_text, dquote)))(input)
}

/// `date-text = date-day "-" date-month "-" date-year`
fn date_text(input: &[u8]) -> WireResult<NaiveDate> {
    let mut parser = tuple((digit_1_2, tag(b"-"), date_month, tag(b"-"), digit_4));

    let (remaining, (day, _, month, _, year)) = parser(input)?;

    match ChronoNaiveDate::from_ymd_opt(year.into(), month.into(), day.into()) {
        Some(date) => Ok((remaining, NaiveDate::unvalidated(date))),
        None => Err(nom::Err::Failure(WireParseError {
            input,
            kind: WireErrorKind::BadDateTime,
        })),
    }
}

/// `date-month = "Jan" / "Feb" / "Mar" / "Apr" / "May" / "Jun" /
///               "Jul" / "Aug" / "Sep" / "Oct" / "Nov" / "Dec"`
fn date_month(input: &[u8]) -> WireResult<u8> {
    alt((
        value(1, tag_no_case(b"Jan")),
        value(2, tag_no_case(b"Feb")),
        value(3, tag_no_case(b"Mar")),
        value(4, tag_no_case(b"Apr")),
        value(5, tag_no_case(b"May")),
        value(6, tag_no_case(b"Jun")),
        value(7, tag_no_case(b"Jul")),
        value(8, tag_no_case(b"Aug")),
        value(9, tag_no_case(b"Sep")),
        value(10, tag_no_case(b"Oct")),
        value(11, tag_no_case(b"Nov")),
        value(12, tag_no_case(b"Dec")),
    ))(input)
}

/// `time = 2DIGIT ":" 2DIGIT ":" 2DIGIT`
fn time(input: &[u8]) -> WireResult<Option<NaiveTime>> {
    let mut parser = tuple((digit_2, tag(b":"), digit_2, tag(b":"), digit_2));

    let (remaining, (hour, _, minute, _, second)) = parser(input)?;

    Ok((
        remaining,
        NaiveTime::from_hms_opt(hour.into(), minute.into(), second.into()),
    ))
}

/// `date-time = DQUOTE date-day-fixed "-" date-month "-" date-year SP time SP zone DQUOTE`
pub(crate) fn date_time(input: &[u8]) -> WireResult<DateTime> {
    let mut parser = delimited(
        dquote,
        tuple((
            date_day_fixed,
            tag(b"-"),
            date_month,
            tag(b"-"),
            digit_4,
            sp,
            time,
            sp,
            zone,
        )),
        dquote,
    );

    let (remaining, (day, _, month, _, year, _, time, _, zone)) = parser(input)?;

    let date = ChronoNaiveDate::from_ymd_opt(year.into(), month.into(), day.into());

    match (date, time, zone) {
        (Some(date), Some(time), Some(zone)) => {
            let local = NaiveDateTime::new(date, time);
            if let LocalResult::Single(datetime) = zone.from_local_datetime(&local) {
                Ok((remaining, DateTime::unvalidated(datetime)))
            } else {
                Err(nom::Err::Failure(WireParseError {
                    input,
                    kind: WireErrorKind::BadDateTime,
                }))
            }
        }
        _ => Err(nom::Err::Failure(WireParseError {
            input,
            kind: WireErrorKind::BadDateTime,
        })),
    }
}

/// `date-day-fixed = (SP DIGIT) / 2DIGIT`
fn date_day_fixed(input: &[u8]) -> WireResult<u8> {
    alt((preceded(sp, digit_1), digit_2))(input)
}

/// `zone = ("+" / "-") 4DIGIT`
fn zone(input: &[u8]) -> WireResult<Option<FixedOffset>> {
    let mut parser = tuple((alt((tag(b"+"), tag(b"-"))), digit_2, digit_2));

    let (remaining, (sign, hours, minutes)) = parser(input)?;

    let seconds = i32::from(hours) * 3600 + i32::from(minutes) * 60;
    let offset = if sign == b"+" {
        FixedOffset::east_opt(seconds)
    } else {
        FixedOffset::west_opt(seconds)
    };

    Ok((remaining, offset))
}

fn digits<const MIN: usize, const MAX: usize>(input: &[u8]) -> WireResult<&[u8]> {
    take_while_m_n(MIN, MAX, is_digit)(input)
}

fn to_number(digits: &[u8]) -> u16 {
    digits
        .iter()
        .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'))
}

fn digit_1(input: &[u8]) -> WireResult<u8> {
    map(digits::<1, 1>, |d| to_number(d) as u8)(input)
}

fn digit_1_2(input: &[u8]) -> WireResult<u8> {
    map(digits::<1, 2>, |d| to_number(d) as u8)(input)
}

fn digit_2(input: &[u8]) -> WireResult<u8> {
    map(digits::<2, 2>, |d| to_number(d) as u8)(input)
}

fn digit_4(input: &[u8]) -> WireResult<u16> {
    map(digits::<4, 4>, to_number)(input)
}
