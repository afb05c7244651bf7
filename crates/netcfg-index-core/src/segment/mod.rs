//! Vendor-aware configuration segmentation.
//!
//! [`segment_config`] is the single entry point used by the pipeline: it
//! picks a [`SectionStrategy`] for the vendor's [`Dialect`] and runs it
//! through [`segment_with_fallback`], which never fails. When a dialect
//! strategy returns an error or panics, the document is re-segmented with
//! the fixed-size [`FallbackChunkSegmenter`] and a warning is logged.
//!
//! All strategies consume **masked** text (see [`crate::mask`]).

pub mod cli;
pub mod fallback;
pub mod junos;

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

use crate::models::{Section, Vendor};
use crate::vendor::Dialect;

pub use cli::CliBlockSegmenter;
pub use fallback::{FallbackChunkSegmenter, FALLBACK_CHUNK_LINES};
pub use junos::JunosSetSegmenter;

/// Failure of a dialect strategy on one document.
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("strategy '{strategy}' failed: {reason}")]
    StrategyFailure {
        strategy: &'static str,
        reason: String,
    },
    #[error("strategy '{strategy}' panicked: {message}")]
    Panicked {
        strategy: &'static str,
        message: String,
    },
}

/// A way of cutting masked configuration text into sections.
pub trait SectionStrategy {
    /// Short identifier used in log events.
    fn name(&self) -> &'static str;

    fn segment(
        &self,
        masked_text: &str,
        device_name: &str,
        vendor: Vendor,
    ) -> Result<Vec<Section>, SegmentError>;
}

/// Built-in strategy for a dialect.
pub fn strategy_for(dialect: Dialect) -> &'static dyn SectionStrategy {
    match dialect {
        Dialect::CliBlock => &CliBlockSegmenter,
        Dialect::JunosSet => &JunosSetSegmenter,
        Dialect::Fallback => &FallbackChunkSegmenter,
    }
}

/// Segment masked configuration text using the vendor's dialect strategy.
pub fn segment_config(masked_text: &str, device_name: &str, vendor: Vendor) -> Vec<Section> {
    let strategy = strategy_for(Dialect::for_vendor(vendor));
    segment_with_fallback(strategy, masked_text, device_name, vendor)
}

/// Run `strategy`, falling back to fixed-size chunks on error or panic.
pub fn segment_with_fallback(
    strategy: &dyn SectionStrategy,
    masked_text: &str,
    device_name: &str,
    vendor: Vendor,
) -> Vec<Section> {
    match run_contained(strategy, masked_text, device_name, vendor) {
        Ok(sections) => sections,
        Err(e) => {
            tracing::warn!(
                device = device_name,
                vendor = %vendor,
                error = %e,
                "segmentation failed, using fallback chunks"
            );
            fallback::segment_fallback(masked_text, device_name, vendor)
        }
    }
}

fn run_contained(
    strategy: &dyn SectionStrategy,
    masked_text: &str,
    device_name: &str,
    vendor: Vendor,
) -> Result<Vec<Section>, SegmentError> {
    let name = strategy.name();
    panic::catch_unwind(AssertUnwindSafe(|| {
        strategy.segment(masked_text, device_name, vendor)
    }))
    .unwrap_or_else(|payload| {
        Err(SegmentError::Panicked {
            strategy: name,
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
