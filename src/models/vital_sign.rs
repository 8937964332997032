use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::VitalType;

/// A single vital sign measurement.
///
/// `value` is free text whose shape depends on the type ("120/80" for blood
/// pressure, "95" for sugar). Readings are never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalReading {
    pub id: Uuid,
    pub date: NaiveDate,
    pub vital_type: VitalType,
    pub value: String,
    pub unit: String,
}

impl VitalReading {
    /// Create a reading with a fresh id; the unit is derived from the type.
    pub fn new(vital_type: VitalType, date: NaiveDate, value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            vital_type,
            value: value.into().trim().to_string(),
            unit: vital_type.unit().to_string(),
        }
    }

    /// Systolic and diastolic parts of a "120/80" blood pressure value.
    pub fn blood_pressure(&self) -> Option<(u32, u32)> {
        if self.vital_type != VitalType::BloodPressure {
            return None;
        }
        let (sys, dia) = self.value.split_once('/')?;
        Some((sys.trim().parse().ok()?, dia.trim().parse().ok()?))
    }

    /// Leading integer of the value, the way a chart axis reads it.
    ///
    /// Blood pressure yields the systolic number. Decimals are truncated
    /// ("98.6" → 98); a value with no leading digits yields `None`.
    pub fn leading_integer(&self) -> Option<i64> {
        let head = match self.vital_type {
            VitalType::BloodPressure => self.value.split('/').next()?,
            _ => self.value.as_str(),
        };
        let head = head.trim_start();
        let (sign, digits) = match head.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, head),
        };
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        if end == 0 {
            return None;
        }
        digits[..end].parse::<i64>().ok().map(|n| sign * n)
    }
}
