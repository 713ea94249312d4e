pub mod report;
pub mod service;
pub mod snapshot;

pub use crate::report::HabitReport;
pub use crate::service::{HabitService, HabitServiceBuilder, ReportOptions};
