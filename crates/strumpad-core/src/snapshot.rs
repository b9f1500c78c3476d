use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use strumpad_domain_signal::DecodedFrame;
use strumpad_ports::config::ControlSource;
use strumpad_ports::types::PenState;

/// Last-known value of every decoded axis plus button states.
///
/// One producer (the engine's decode step) writes it once per sample;
/// any number of consumers read it through the shared handle. Fields a
/// frame does not carry keep their previous value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct InteractionSnapshot {
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
    pub tilt_x: f64,
    pub tilt_y: f64,
    pub state: PenState,
    pub primary_button_pressed: bool,
    pub secondary_button_pressed: bool,
    pub tablet_buttons: [bool; 8],
}

impl InteractionSnapshot {
    pub fn apply(&mut self, frame: &DecodedFrame) {
        if let Some(x) = frame.values.get("x") {
            self.x = *x;
        }
        if let Some(y) = frame.values.get("y") {
            self.y = *y;
        }
        if let Some(pressure) = frame.values.get("pressure") {
            self.pressure = *pressure;
        }
        if let Some(tilt_x) = frame.values.get("tiltX") {
            self.tilt_x = *tilt_x;
        }
        if let Some(tilt_y) = frame.values.get("tiltY") {
            self.tilt_y = *tilt_y;
        }
        if let Some(state) = frame.state {
            self.state = state;
        }
        self.primary_button_pressed = frame.primary_button_pressed;
        self.secondary_button_pressed = frame.secondary_button_pressed;
        if let Some(buttons) = frame.buttons {
            self.tablet_buttons = buttons;
        }
    }

    /// Normalized input for one expressive parameter. Tilt magnitude folds
    /// both tilt axes into a single one-sided value.
    pub fn control_input(&self, source: ControlSource) -> f64 {
        match source {
            ControlSource::YAxis => self.y,
            ControlSource::Pressure => self.pressure,
            ControlSource::TiltX => self.tilt_x,
            ControlSource::TiltY => self.tilt_y,
            ControlSource::TiltXy => self.tilt_x.hypot(self.tilt_y),
        }
    }
}

/// Single-writer, many-reader handle to the snapshot.
pub type SharedSnapshot = Arc<RwLock<InteractionSnapshot>>;

pub fn shared_snapshot() -> SharedSnapshot {
    Arc::new(RwLock::new(InteractionSnapshot::default()))
}
