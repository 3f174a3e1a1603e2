//! Delivery layer for sending webhook requests to external endpoints.
//!
//! This module provides types and traits for:
//! - Building HTTP requests from untrusted job data ([`HttpRequest`])
//! - Handling HTTP responses ([`HttpResponse`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - Classifying and describing failures ([`HttpError`], [`StatusPolicy`])

mod client;
mod error;
mod http;


pub use client::{ReqwestClient, StatusPolicy};
pub use error::HttpError;
pub use http::{HttpClient, HttpRequest, HttpResponse, JSON_CONTENT_TYPE};
