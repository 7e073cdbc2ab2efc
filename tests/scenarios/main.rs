//! Scenario-based tests for the deploy pipeline
//!
//! Every scenario drives the real engine against a scripted tool runner, so
//! no git, rustup, cargo, or trunk is ever actually spawned.

mod helpers;

mod build_failure;
mod failure_handling;
mod manual_dispatch;
mod skipped_publish;
mod success_publish;
