pub mod marker;

pub use marker::{Marker, MarkerChanges, NewMarker};
