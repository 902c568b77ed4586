//! Campaign Executor
//!
//! Runs the composed suites against a device and renders the results.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Runner (suites registered via #[suite])
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Stream results, progress bar, build Report
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Sequential campaign execution with live progress
//! - [`formatting`] - Human-readable output formatting

mod execution;
mod formatting;

pub use execution::{CampaignOutcome, device_name, execute_campaign};
pub use formatting::{format_human_output, format_result_details, format_result_line};
