//! Request middleware
//!
//! Stages every request passes through before routing: CORS handling and
//! JSON body parsing.

pub mod cors;
pub mod json_body;

pub use cors::CorsPolicy;
pub use json_body::{read_json_body, BodyError};
