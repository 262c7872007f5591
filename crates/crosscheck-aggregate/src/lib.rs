//! Crosscheck Aggregation Engine
//!
//! Compares the fact-check reports of every agent that answered in a
//! session and produces one `ComparisonReport`: rankings, claim and source
//! statistics, uncertainty, neutral (opinion-only) agents, claim-weighted
//! bias and improvement suggestions.
//!
//! [`compare_reports_at`] is a pure function of its inputs. Zero reports
//! yield `ComparisonOutcome::Unavailable`, never a division by zero.

#![warn(missing_docs)]

mod compare;
mod thresholds;

pub use compare::{compare_reports, compare_reports_at, NO_REPORTS_MESSAGE};
pub use thresholds::AggregationThresholds;
