//! HTTP protocol layer module
//!
//! Response construction, decoupled from routing and middleware.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_error_response, build_payload_response, build_stuff_response,
};
