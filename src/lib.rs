// src/lib.rs

//! CloudFront real-time log transformer library.

pub mod config;
pub mod error;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod stream;
pub mod utils;
