//! HTTP client layer — `MarketHttp`.

pub mod client;

pub use client::MarketHttp;
