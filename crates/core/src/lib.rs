//! Domain logic for the runbook service.
//!
//! Covers script catalog loading and validation plus parameter binding
//! (sanitization, canonical stringification, shell quoting). Everything in
//! this crate is pure -- no network or process I/O -- so a request can be
//! validated to completion before any externally visible action happens.

pub mod catalog;
pub mod params;
