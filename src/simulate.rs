use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::archetype::Archetype;
use crate::clock::{planting_epoch, Clock, PlantAge};
use crate::config::SimConfig;
use crate::error::Error;
use crate::growth::{grow_plant, tick, GrowthPacer};
use crate::lifecycle::{animate, PHASE_STEP};
use crate::plant::Plant;
use crate::render::{draw_frame, Canvas};
use crate::sensor::{SensorHandle, SensorReading, SensorState};
use crate::viewport::Viewport;

/// Start heights never drop below this.
pub const MIN_START_HEIGHT: f32 = 20.0;
pub const START_HEIGHT_STEP: f32 = 10.0;

/// User-facing switches that survive a reset.
#[derive(Clone, Debug)]
pub struct Control {
    pub auto_growth: bool,
    pub show_debug: bool,
    /// Root segment length used by the next reset.
    pub start_height: f32,
}

impl Control {
    pub fn new(config: &SimConfig) -> Control {
        Control {
            auto_growth: config.auto_growth,
            show_debug: config.show_debug,
            start_height: config.initial_stem_height,
        }
    }
}

/// Discrete user interactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Grow,
    Reset,
    ToggleAutoGrowth,
    ToggleDebug,
    RaiseStartHeight,
    LowerStartHeight,
    Water,
}

impl Command {
    pub fn from_key(key: char) -> Option<Command> {
        match key {
            ' ' => Some(Command::Grow),
            'r' | 'R' => Some(Command::Reset),
            'a' | 'A' => Some(Command::ToggleAutoGrowth),
            '7' => Some(Command::ToggleDebug),
            '8' => Some(Command::LowerStartHeight),
            '9' => Some(Command::RaiseStartHeight),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Grow => "grow",
            Command::Reset => "reset",
            Command::ToggleAutoGrowth => "auto",
            Command::ToggleDebug => "debug",
            Command::RaiseStartHeight => "taller",
            Command::LowerStartHeight => "shorter",
            Command::Water => "water",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Command, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grow" => Ok(Command::Grow),
            "reset" => Ok(Command::Reset),
            "auto" => Ok(Command::ToggleAutoGrowth),
            "debug" => Ok(Command::ToggleDebug),
            "taller" => Ok(Command::RaiseStartHeight),
            "shorter" => Ok(Command::LowerStartHeight),
            "water" => Ok(Command::Water),
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

/// Summary of one simulated frame.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub age_days: f64,
    pub segments: usize,
    pub leaves: usize,
    pub flowers: usize,
    pub soil_moisture: f64,
    pub oxygen: f64,
    pub heart_rate: f64,
    pub growth: Option<Archetype>,
}

/// All mutable simulation state, driven one frame at a time by the host.
///
/// The plant is owned here and only touched from the frame thread. Sensor
/// readings live behind a [`SensorHandle`] that transport threads may clone
/// and feed concurrently.
pub struct SimulationState {
    config: SimConfig,
    control: Control,
    viewport: Viewport,
    plant: Plant,
    sensors: SensorHandle,
    pacer: GrowthPacer,
    age: PlantAge,
    phase: f64,
    frame: u64,
    rng: StdRng,
    clock: Box<dyn Clock>,
}

impl SimulationState {
    /// Builds the state and performs the initial reset.
    pub fn new(config: SimConfig, clock: Box<dyn Clock>) -> SimulationState {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let initial = SensorReading {
            soil_moisture: config.default_soil_moisture,
            oxygen: config.default_oxygen,
            heart_rate: config.default_heart_rate,
        };
        let sensors = SensorHandle::new(SensorState::new(initial, config.smoothing_window));
        let now = clock.now();
        let mut state = SimulationState {
            control: Control::new(&config),
            viewport: Viewport::new(config.canvas_width, config.canvas_height),
            plant: Plant::new(),
            sensors,
            pacer: GrowthPacer::new(),
            age: PlantAge::from_epoch(planting_epoch(config.planting_date), now),
            phase: 0.0,
            frame: 0,
            rng,
            clock,
            config,
        };
        state.reset();
        state
    }

    /// Replants a single root segment and recomputes age from the planting
    /// date. Sensor channels are left alone.
    pub fn reset(&mut self) {
        let base = self.viewport.plant_base();
        self.plant.reset(
            base,
            self.control.start_height,
            self.config.initial_thickness,
            &mut self.rng,
        );
        self.pacer.reset();
        self.age = PlantAge::from_epoch(
            planting_epoch(self.config.planting_date),
            self.clock.now(),
        );
    }

    /// Advances one frame: phase clock, real-time age, auto growth, then
    /// ambient animation.
    pub fn tick(&mut self) -> FrameReport {
        self.phase += PHASE_STEP;
        self.age.advance(self.clock.now());

        let growth = if self.control.auto_growth {
            tick(
                &mut self.pacer,
                &mut self.plant,
                &self.sensors.reading(),
                self.age.units(),
                self.config.max_segments,
                &mut self.rng,
            )
        } else {
            None
        };

        animate(&mut self.plant, self.phase, self.viewport.height());

        let report = self.report(growth);
        self.frame += 1;
        report
    }

    fn report(&self, growth: Option<Archetype>) -> FrameReport {
        let reading = self.sensors.reading();
        FrameReport {
            frame: self.frame,
            age_days: self.age.days(),
            segments: self.plant.segment_count(),
            leaves: self.plant.leaf_count(),
            flowers: self.plant.flower_count(),
            soil_moisture: reading.soil_moisture,
            oxygen: reading.oxygen,
            heart_rate: reading.heart_rate,
            growth,
        }
    }

    /// Feeds one raw sensor line.
    pub fn ingest(&self, raw: &str) {
        self.sensors.ingest(raw, self.clock.now());
    }

    /// One growth step outside the pacer and moisture gate.
    pub fn grow_now(&mut self) -> Option<Archetype> {
        grow_plant(&mut self.plant, self.config.max_segments, &mut self.rng)
    }

    pub fn water(&self) -> f64 {
        let soil = self
            .sensors
            .water(self.config.watering_amount, self.config.watering_cap);
        info!(soil, "watered");
        soil
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Grow => {
                let grown = self.grow_now();
                info!(?grown, "manual growth");
            }
            Command::Reset => {
                self.reset();
                self.sensors
                    .set_soil_moisture(self.config.reset_soil_moisture);
            }
            Command::ToggleAutoGrowth => {
                self.control.auto_growth = !self.control.auto_growth;
                info!(on = self.control.auto_growth, "auto growth toggled");
            }
            Command::ToggleDebug => {
                self.control.show_debug = !self.control.show_debug;
                info!(on = self.control.show_debug, "debug overlay toggled");
            }
            Command::RaiseStartHeight => {
                self.control.start_height += START_HEIGHT_STEP;
                info!(start_height = self.control.start_height, "start height raised");
            }
            Command::LowerStartHeight => {
                self.control.start_height =
                    (self.control.start_height - START_HEIGHT_STEP).max(MIN_START_HEIGHT);
                info!(start_height = self.control.start_height, "start height lowered");
            }
            Command::Water => {
                self.water();
            }
        }
    }

    /// Adopts a new surface size, shifting the plant with the ground line.
    pub fn resize(&mut self, width: f32, height: f32) {
        let delta_y = self.viewport.setscreen(width, height);
        self.plant.apply_viewport_resize(delta_y);
        info!(width, height, delta_y, "viewport resized");
    }

    /// Draws the current state at the current phase.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        draw_frame(canvas, &self.plant, self.phase);
    }

    pub fn debug_lines(&self) -> Vec<String> {
        let reading = self.sensors.reading();
        vec![
            "DEBUG INFO:".to_string(),
            format!("Start height: {}", self.control.start_height),
            format!("Base Y: {}", self.viewport.base_y().round()),
            format!(
                "Auto growth: {}",
                if self.control.auto_growth { "ON" } else { "OFF" }
            ),
            format!("Plant age: {:.1} days", self.age.days()),
            format!("Leaves: {}", self.plant.leaf_count()),
            format!("Flowers: {}", self.plant.flower_count()),
            format!("Soil moisture: {}", reading.soil_moisture),
            format!("O2: {}", reading.oxygen),
        ]
    }

    /// A handle transport threads can use to feed sensor lines.
    pub fn sensor_handle(&self) -> SensorHandle {
        self.sensors.clone()
    }

    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    /// Mutable plant access for hosts that toggle per-segment growth.
    pub fn plant_mut(&mut self) -> &mut Plant {
        &mut self.plant
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn reading(&self) -> SensorReading {
        self.sensors.reading()
    }

    pub fn age_units(&self) -> f64 {
        self.age.units()
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn frame_index(&self) -> u64 {
        self.frame
    }
}
