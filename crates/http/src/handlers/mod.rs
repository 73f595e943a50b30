#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

pub mod entries;
pub mod queue;
pub mod queue_processor;
