//! Preparation of along-track satellite altimetry for the DIVA interpolation tool.
//!
//! Tracks are read from scientific-array files, their longitudes brought back
//! to [-180, 180), weighted by their distance in time from the analysis date
//! and appended to the point files consumed by DIVA.

pub mod constants;
pub mod functions;
pub mod helpers;
pub mod io;
pub mod models;
