//! Routing module
//!
//! The three-way routing decision and the responders behind it:
//! - Delegate invocation for the special path prefix
//! - Maintenance page rendering with storage fallback
//! - Operational pass-through

mod delegate;
mod maintenance;
mod router;
pub mod template;

#[cfg(test)]
pub(crate) mod testing;

pub use router::Router;
