//! Dashboard trend chart data.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{VitalReading, VitalType};

/// Number of most recent points the dashboard chart shows.
pub const CHART_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    /// Axis label, e.g. "Oct 1".
    pub label: String,
    pub date: NaiveDate,
    pub value: i64,
    pub vital_type: VitalType,
}

/// Sugar and blood-pressure (systolic) points for the trend chart.
///
/// Readings keep insertion order. Blood pressure without a `/` and values
/// with no leading number are skipped. Only the last `CHART_WINDOW` points
/// are returned.
pub fn chart_points(vitals: &[VitalReading]) -> Vec<ChartPoint> {
    let points: Vec<ChartPoint> = vitals
        .iter()
        .filter(|v| match v.vital_type {
            VitalType::Sugar => true,
            VitalType::BloodPressure => v.value.contains('/'),
            _ => false,
        })
        .filter_map(|v| {
            Some(ChartPoint {
                label: v.date.format("%b %-d").to_string(),
                date: v.date,
                value: v.leading_integer()?,
                vital_type: v.vital_type,
            })
        })
        .collect();

    let skip = points.len().saturating_sub(CHART_WINDOW);
    points.into_iter().skip(skip).collect()
}
