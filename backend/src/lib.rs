//! FakeyNews backend: a single `/predict` endpoint that labels news text as
//! fake or real, optionally reading the text out of an uploaded image first.

pub mod classifier;
pub mod config;
pub mod error;
pub mod ocr;
pub mod resolver;
pub mod routes;
pub mod service;
pub mod upload;
