//! Core types and rules for the blogshelf article store.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the `Article` shape, the normalization rules applied on every read and
//! write, and [`service::ArticleService`], which implements the admin and
//! public operations on top of any [`store::ArticleStore`] backend.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod article;
pub mod clock;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod service;
pub mod store;

pub use error::{Error, Result};
