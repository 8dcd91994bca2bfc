//! Generative fuchsia growth driven by live plant sensor readings.
//!
//! [`SimulationState`] owns the plant and advances it one frame at a time.
//! Sensor lines reach it through a [`SensorHandle`], and any [`Canvas`]
//! implementation can draw the result.

pub mod archetype;
pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod growth;
pub mod lifecycle;
pub mod noise;
pub mod ornament;
pub mod plant;
pub mod render;
pub mod segment;
pub mod sensor;
pub mod simulate;
pub mod smoothing;
pub mod viewport;

pub use archetype::Archetype;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SimConfig;
pub use error::{Error, Result};
pub use plant::Plant;
pub use render::{Canvas, RecordingCanvas};
pub use sensor::{SensorHandle, SensorReading};
pub use simulate::{Command, FrameReport, SimulationState};
