mod header_source;
mod transport;

pub use header_source::{Auth, HeaderSource, Headers};
pub use transport::{Method, RawResponse, Transport};
