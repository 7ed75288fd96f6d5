pub mod types;
pub mod error;
pub mod transform;
pub mod render;
pub mod detector;
pub mod session;
