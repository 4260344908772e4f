//! Application-level orchestration.
//!
//! This module owns the job lifecycle (submit, poll, review actions, reset) and the
//! processing that runs once a job finishes. UI/CLI layers send commands in and render
//! the events coming back, keeping all job state in one place.

mod controller;
mod post_process;
mod session;
#[cfg(test)]
pub(crate) mod tests_support;
mod view;

pub(crate) use controller::{run_controller, UiCommand};
pub(crate) use post_process::process_job_completion;
pub use session::SessionSnapshot;
