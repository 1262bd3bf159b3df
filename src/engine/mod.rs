//! Pure timeline math: no canvas, no DOM. Everything here runs in host tests.

pub mod color;
pub mod interaction;
pub mod layers;
pub mod mood;
pub mod pins;
pub mod story;
pub mod time_map;
pub mod wave;

pub use interaction::EngineRequest;
