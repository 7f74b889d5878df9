//! Socratix - Socratic Tutoring Dialogue Engine
//!
//! This crate runs turn-based Socratic dialogues: it asks opening questions,
//! stores learner answers, adapts difficulty from how the learner writes, and
//! evaluates the dialogue once enough answers have been given.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
