use serde::{Deserialize, Serialize};

/// Parse failure for one of the string-backed enums below.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: '{value}'")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// Kind of vital sign a family member can log.
    VitalType {
        BloodPressure => "blood_pressure",
        Sugar => "sugar",
        Weight => "weight",
        HeartRate => "heart_rate",
        Temperature => "temperature",
    }
);

str_enum!(
    /// Processing state of an uploaded report.
    ReportStatus {
        Pending => "pending",
        Analyzing => "analyzing",
        Completed => "completed",
        Failed => "failed",
    }
);

str_enum!(
    /// Screen the shell is showing.
    AppView {
        Dashboard => "dashboard",
        Upload => "upload",
        Vitals => "vitals",
        ReportDetail => "report_detail",
    }
);

impl VitalType {
    pub const ALL: [VitalType; 5] = [
        VitalType::BloodPressure,
        VitalType::Sugar,
        VitalType::Weight,
        VitalType::HeartRate,
        VitalType::Temperature,
    ];

    /// Unit shown next to a reading of this type.
    pub fn unit(self) -> &'static str {
        match self {
            VitalType::BloodPressure => "mmHg",
            VitalType::Sugar => "mg/dL",
            VitalType::Weight => "kg",
            VitalType::HeartRate => "bpm",
            VitalType::Temperature => "°F",
        }
    }
}

impl Default for AppView {
    fn default() -> Self {
        AppView::Dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn vital_type_round_trips_through_str() {
        for vt in VitalType::ALL {
            assert_eq!(VitalType::from_str(vt.as_str()).unwrap(), vt);
        }
    }

    #[test]
    fn vital_units_follow_type() {
        assert_eq!(VitalType::BloodPressure.unit(), "mmHg");
        assert_eq!(VitalType::Sugar.unit(), "mg/dL");
        assert_eq!(VitalType::Weight.unit(), "kg");
        assert_eq!(VitalType::HeartRate.unit(), "bpm");
        assert_eq!(VitalType::Temperature.unit(), "°F");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = ReportStatus::from_str("done").unwrap_err();
        assert_eq!(err.field, "ReportStatus");
        assert_eq!(err.value, "done");
        assert!(err.to_string().contains("'done'"));
    }

    #[test]
    fn enums_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&VitalType::HeartRate).unwrap(),
            "\"heart_rate\""
        );
        assert_eq!(
            serde_json::to_string(&AppView::ReportDetail).unwrap(),
            "\"report_detail\""
        );
        let status: ReportStatus = serde_json::from_str("\"analyzing\"").unwrap();
        assert_eq!(status, ReportStatus::Analyzing);
    }

    #[test]
    fn default_view_is_dashboard() {
        assert_eq!(AppView::default(), AppView::Dashboard);
    }
}
