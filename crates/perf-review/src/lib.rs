//! Performance appraisal scoring: the pure scoring engine plus the appraisal store,
//! service, and HTTP router built on top of it.

pub mod appraisals;
pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;

pub use error::AppError;
