pub mod client;
pub mod error;

pub use biasbuster_api;
pub use client::ApiClient;
pub use error::ApiError;
pub use reqwest::StatusCode;
