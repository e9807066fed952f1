// src/lib.rs

//! Kindergarten vacancy watcher library.
//!
//! Polls the Oslo kommune vacancy page, extracts spots for the youngest age
//! band per district, and reports districts whose spots are new or changed.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
