//! Periodic status snapshots pushed to a telemetry sink.
//!
//! The [`monitor::Monitor`] loop polls the shared protocol client at a fixed
//! interval, defaults each attribute independently on failure, and posts the
//! assembled [`sample::TelemetrySample`] to a [`sink::TelemetrySink`]. The
//! loop never terminates on its own; an owning controller stops it through a
//! watch channel.

pub mod monitor;
pub mod sample;
pub mod sink;

pub use monitor::Monitor;
pub use sample::TelemetrySample;
pub use sink::{SinkError, TagoSink, TelemetrySink};
