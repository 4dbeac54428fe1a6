//! Credential decorators for [`HttpClient`](super::HttpClient).
//!
//! [`UrlParam`] appends an API key as a query parameter (OpenWeatherMap's
//! `appid`). [`ApiKey`] injects it as an HTTP header (GitHub's
//! `Authorization: Bearer`).

mod api_key;
mod url_param;

pub use api_key::ApiKey;
pub use url_param::UrlParam;
