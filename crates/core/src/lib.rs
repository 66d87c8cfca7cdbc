//! Domain model for the runtime-provider task orchestration core.
//!
//! Pure data types and codecs with no I/O: job and task records, the
//! cluster topology carried in a job directive, the per-task directive
//! codec, and the default wait timeouts. The async orchestration built on
//! top of these lives in `helmrp-provider`.

pub mod action;
pub mod cluster;
pub mod credential;
pub mod directive;
pub mod error;
pub mod job;
pub mod task;
pub mod timeouts;
