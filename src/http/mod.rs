//! HTTP protocol layer module
//!
//! Response shape and builders shared by every routing branch, plus the
//! conversion from router replies to hyper responses.

pub mod convert;
pub mod response;

pub use convert::into_http_response;
pub use response::Reply;
