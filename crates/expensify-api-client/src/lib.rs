mod client;
mod errors;
mod transport;
mod types;

pub use client::ExpensifyClient;
pub use errors::{Error, Result};
pub use transport::{
    HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError, DEFAULT_API_URL,
};
pub use types::*;
