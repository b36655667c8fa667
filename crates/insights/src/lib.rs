//! Aggregation and view state for the insights dashboard.

pub mod controller;
pub mod hero;
pub mod metrics;
pub mod session;

pub use controller::{Command, Dashboard, InsightsController, LoadState, LoadingView, Outcome, Ticket};
pub use hero::{select_background, ImageVariant};
pub use metrics::{compute_metrics, completion_rate, format_rupees, Totals};
pub use session::InsightsSession;
