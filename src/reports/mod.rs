//! Read-side projections: aging report and delivery alerts.

pub mod aging;
pub mod alerts;

pub use aging::{build_report, AgeBucket, AgingReport, BucketSummary, OutstandingShipment};
pub use alerts::{classify, evaluate, AlertLevel, DeliveryAlert};
