//! Request handler module
//!
//! Hosting surfaces around the routing core: the HTTP server entry point and
//! the one-shot event mode used by the command line.

pub mod event;
pub mod request;

// Re-export main entry points
pub use event::handle_event;
pub use request::handle_request;
