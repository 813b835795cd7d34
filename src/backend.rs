/// Backend query service HTTP client module.
///
/// This module provides a blocking HTTP client for the RAG backend's `/query`
/// endpoint, the transport trait used to mock it, and its error type.
mod client;

pub use client::{
    BackendClient, BackendClientBuilder, BackendError, DEFAULT_BACKEND_URL, QueryTransport,
};
