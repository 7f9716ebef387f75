pub mod camera;
#[cfg(feature = "controller")]
pub mod controller;
#[cfg(feature = "d2")]
pub mod d2;
#[cfg(feature = "d3")]
pub mod d3;
pub mod editor;
pub mod frame;
#[cfg(any(feature = "d2", feature = "d3"))]
pub mod util;
