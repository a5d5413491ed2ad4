#![forbid(unsafe_code)]

//! `jupii-tr`: command-line access to Jupii translation catalogs.
//!
//! Looks up strings the way the application does, summarizes catalog
//! coverage, checks translations for placeholder mistakes, and compiles TS
//! files into JSON snapshots.

pub mod cli;
pub mod commands;
pub mod logging;
