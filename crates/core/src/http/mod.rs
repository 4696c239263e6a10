//! Request and response descriptors exchanged between the router, the
//! strategies, the network and the cache stores.
//!
//! A [`Request`] is immutable once captured and doubles as a cache key. A
//! [`Response`] owns a single-consumption body: it is not `Clone`, reading
//! the body consumes it, and a response needed in two places must be split
//! with [`Response::tee`] first.

mod headers;
mod request;
mod response;

pub use headers::Headers;
pub use request::{Destination, Request, RequestMode};
pub use response::Response;
