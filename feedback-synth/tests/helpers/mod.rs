//! Test Helper Utilities
//!
//! Shared utilities for testing feedback-synth

#![allow(dead_code, unused_imports)]

pub mod db_utils;
pub mod fake_generator;

pub use db_utils::{
    add_feedback, add_reviewer, add_subject, setup, setup_on_disk, setup_with, summary_fingerprint,
    TestContext,
};
pub use fake_generator::ScriptedGenerator;
