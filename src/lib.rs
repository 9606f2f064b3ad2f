//! Interactive continuum normalization of 1-D stellar spectra.

pub mod app;
pub mod cli;
pub mod data;
pub mod error;
pub mod fit;
pub mod session;
pub mod state;
pub mod ui;
