//! Core types and trait definitions for the movie dataset loader.
//!
//! This crate knows the dataset layout, the record-normalisation policy and
//! the five fixed reports. It has no database dependency; storage backends
//! implement [`store::MovieStore`].

// Native `async fn` in traits; the trait spells out `Send` bounds explicitly.
#![allow(async_fn_in_trait)]

pub mod dataset;
pub mod error;
pub mod loader;
pub mod parse;
pub mod record;
pub mod report;
pub mod store;

pub use error::{Error, Result};
