//! Business logic services for the Solar Performance Monitor

pub mod alerts;
pub mod evaluation;
pub mod notification;
pub mod reporting;

pub use alerts::AlertService;
pub use evaluation::EvaluationService;
pub use notification::AlertNotifier;
pub use reporting::ReportingService;
