//! `toi-transit` library crate.
//!
//! Turns a raw TESS Objects of Interest table into an aligned, fully valid
//! table and enriches each candidate with its next predicted transit and a
//! colour for chart encoding.
//!
//! The binaries are thin wrappers: `toi-transit` (see [`cli`]) and
//! `generate_sample`.

pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod ephemeris;
pub mod features;
pub mod state;
