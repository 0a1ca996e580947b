//! Request handler module
//!
//! Responsible for request dispatch and the single mounted route.

pub mod mount;
pub mod router;

// Re-export main entry point
pub use mount::MountPrefix;
pub use router::handle_request;
