//! Parsing of raw boundary strings into domain values.

use chrono::NaiveDate;
use medminder_domain::{
    check_amount, ClockTime, DoseInstance, MedMinderError, MedicationId, Result, UserId,
};
use num_rational::Rational64;

fn non_empty<'a>(field: &str, raw: &'a str) -> Result<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MedMinderError::InvalidInput(format!("{field} is required")));
    }
    Ok(trimmed)
}

pub fn parse_user(raw: &str) -> Result<UserId> {
    non_empty("user id", raw).map(UserId::new)
}

pub fn parse_medication_id(raw: &str) -> Result<MedicationId> {
    non_empty("medication id", raw).map(MedicationId::new)
}

/// ISO `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| MedMinderError::InvalidInput(format!("malformed date: {raw:?}")))
}

pub fn parse_time(raw: &str) -> Result<ClockTime> {
    raw.parse()
}

pub fn parse_dose(medication_id: &str, date: &str, time: &str) -> Result<DoseInstance> {
    Ok(DoseInstance::new(parse_medication_id(medication_id)?, parse_date(date)?, parse_time(time)?))
}

/// Servings as an integer (`2`), a fraction (`1/2`) or a decimal (`0.25`).
///
/// Amounts finer than a thousandth of a serving are rejected.
pub fn parse_amount(raw: &str) -> Result<Rational64> {
    let amount = parse_rational(raw.trim())
        .ok_or_else(|| MedMinderError::InvalidInput(format!("malformed dose amount: {raw:?}")))?;
    check_amount(amount, "dose amount")?;
    Ok(amount)
}

fn parse_rational(raw: &str) -> Option<Rational64> {
    if let Some((numer, denom)) = raw.split_once('/') {
        let numer = numer.trim().parse::<i64>().ok()?;
        let denom = denom.trim().parse::<i64>().ok()?;
        if denom <= 0 {
            return None;
        }
        return Some(Rational64::new(numer, denom));
    }

    if let Some((whole, frac)) = raw.split_once('.') {
        if frac.is_empty() || frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let (negative, whole) = match whole.strip_prefix('-') {
            Some(magnitude) => (true, magnitude),
            None => (false, whole),
        };
        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        if whole < 0 {
            return None;
        }
        let scale = 10_i64.checked_pow(u32::try_from(frac.len()).ok()?)?;
        let frac = frac.parse::<i64>().ok()?;
        let magnitude = Rational64::new(whole.checked_mul(scale)?.checked_add(frac)?, scale);
        return Some(if negative { -magnitude } else { magnitude });
    }

    raw.parse::<i64>().ok().map(Rational64::from_integer)
}
