// exposure-api: typed requests and wire models for the exposure-notification backend

pub mod error;
pub mod executor;
pub mod models;
pub mod request;
pub mod requests;
pub mod transport;

pub use error::Error;
pub use executor::{HttpExecutor, RequestExecutor};
pub use request::{Decoder, Header, HttpRequest, Method, RequestDescriptor};
pub use transport::{TlsMode, TransportConfig};
