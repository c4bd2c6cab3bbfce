pub mod marker_handler;

pub use marker_handler::*;
