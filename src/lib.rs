//! predsweep — sequential whole-dataset evaluation of a prediction service.
//!
//! Drives one prediction request per tick against `POST /predict`, renders
//! the running correct/incorrect counts as a two-category bar chart, and
//! collects images of misclassified samples. See `predsweep run --help`.

pub mod analytics;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gallery;
pub mod render;
pub mod tester;
pub mod web;
