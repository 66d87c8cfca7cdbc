//! Task orchestration for the cluster runtime provider.
//!
//! Splits jobs into staged task plans, dispatches each task to one backend
//! operation, and waits for the backend to settle with a bounded polling
//! loop whose status classification tells transient backend trouble apart
//! from terminal failures and from "already gone" outcomes.
//!
//! Backends are reached only through the capability traits in [`backend`],
//! resolved per runtime id through a [`registry::BackendRegistry`] the
//! caller supplies. [`service::RuntimeProvider`] is the upward surface.

pub mod backend;
pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod service;
pub mod splitter;
pub mod values;
pub mod wait;
