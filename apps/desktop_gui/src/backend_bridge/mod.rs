//! Backend worker: a dedicated thread with its own tokio runtime, fed by the
//! UI command queue.

pub mod commands;
pub mod runtime;
