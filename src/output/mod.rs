//! Output and reporting module

pub mod formatter;
pub mod report;

pub use formatter::ReportGenerator;
pub use report::AnalysisReport;
