//! # Interface Layer
//!
//! The process entry surface: command-line parsing.

pub mod cli;
