use serde::Deserialize;
use std::io::BufRead;
use strumpad_core::Engine;
use strumpad_infra_midi_midir::MidirMidiOutputPort;
use strumpad_infra_storage_fs::FsStorage;
use strumpad_ports::midi::{MidiOutputConn, MidiOutputPort};
use strumpad_ports::storage::StoragePort;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// One normalized pen sample on stdin, one JSON object per line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointerSample {
    x: f64,
    y: f64,
    pressure: f64,
    #[serde(default)]
    tilt_x: f64,
    #[serde(default)]
    tilt_y: f64,
}

fn open_midi_output(
    port: &MidirMidiOutputPort,
    settings: &strumpad_ports::storage::SettingsDto,
) -> Result<Box<dyn MidiOutputConn>, Box<dyn std::error::Error>> {
    let outputs = port.list_outputs()?;
    for device in &outputs {
        info!(id = %device.id, name = %device.name, "midi output");
    }

    if let Some(selected) = &settings.selected_midi_out {
        match port.open_output(selected) {
            Ok(conn) => {
                info!(id = %selected, "opened configured midi output");
                return Ok(conn);
            }
            Err(err) => {
                warn!(id = %selected, error = %err, "configured midi output unavailable");
            }
        }
    }

    let first = outputs
        .first()
        .ok_or("no midi output devices available")?;
    let conn = port.open_output(&first.id)?;
    info!(id = %first.id, name = %first.name, "opened midi output");
    Ok(conn)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Samples arrive on stdin, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let storage = FsStorage::discover();
    let settings = storage.load_settings()?;

    let midi_port = MidirMidiOutputPort::default();
    let conn = open_midi_output(&midi_port, &settings)?;

    let mut engine = Engine::new(settings, conn)?;
    info!(
        voicing = ?engine
            .voicing()
            .iter()
            .map(|n| format!("{}{}", n.notation, n.octave))
            .collect::<Vec<_>>(),
        "engine ready, reading pointer samples from stdin"
    );

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let sample: PointerSample = match serde_json::from_str(&line) {
            Ok(sample) => sample,
            Err(err) => {
                warn!(error = %err, "skipping malformed sample");
                continue;
            }
        };
        if let Err(err) = engine.handle_pointer_sample(
            sample.x,
            sample.y,
            sample.pressure,
            sample.tilt_x,
            sample.tilt_y,
        ) {
            error!(error = %err, "sample processing failed");
            return Err(err.into());
        }
        for event in engine.poll_events() {
            info!(event = ?event, "engine event");
        }
    }

    Ok(())
}
