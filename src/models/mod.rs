pub mod analysis;
pub mod enums;
pub mod image;
pub mod report;
pub mod vital_sign;

pub use analysis::AnalysisResult;
pub use enums::{AppView, InvalidEnum, ReportStatus, VitalType};
pub use image::{title_from_file_name, ImageError, ImagePayload};
pub use report::{InvalidTransition, MedicalReport, DEFAULT_REPORT_TITLE};
pub use vital_sign::VitalReading;
