use midir::{MidiOutput, MidiOutputConnection};
use strumpad_ports::midi::{
    MidiError, MidiMessage, MidiOutputConn, MidiOutputDevice, MidiOutputPort,
};
use strumpad_ports::types::DeviceId;

const PITCH_BEND_CENTER: u16 = 8192;
const PITCH_BEND_MAX: u16 = 16383;

pub struct MidirMidiOutputPort {
    client_name: String,
}

impl MidirMidiOutputPort {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    fn create_midi_out(&self) -> Result<MidiOutput, MidiError> {
        let midi_out =
            MidiOutput::new(&self.client_name).map_err(|e| MidiError::Backend(e.to_string()))?;
        Ok(midi_out)
    }

    fn device_id(index: usize, name: &str) -> DeviceId {
        DeviceId(format!("midir:{}:{}", index, name))
    }
}

impl Default for MidirMidiOutputPort {
    fn default() -> Self {
        Self::new("Strumpad")
    }
}

/// Channel-voice wire encoding. Normalized pitch bend maps to the 14-bit
/// range with 8192 as center.
fn encode_message(message: MidiMessage) -> Vec<u8> {
    match message {
        MidiMessage::NoteOn {
            channel,
            note,
            velocity,
        } => vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
        MidiMessage::NoteOff { channel, note } => {
            vec![0x80 | (channel & 0x0F), note & 0x7F, 0]
        }
        MidiMessage::PitchBend { channel, value } => {
            let raw = ((value + 1.0) * f32::from(PITCH_BEND_CENTER)) as i32;
            let raw = raw.clamp(0, i32::from(PITCH_BEND_MAX)) as u16;
            vec![
                0xE0 | (channel & 0x0F),
                (raw & 0x7F) as u8,
                (raw >> 7) as u8,
            ]
        }
        MidiMessage::ControlChange {
            channel,
            controller,
            value,
        } => vec![0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F],
    }
}

pub struct MidirMidiOutputConn {
    connection: Option<MidiOutputConnection>,
}

impl MidiOutputConn for MidirMidiOutputConn {
    fn send(&mut self, message: MidiMessage) -> Result<(), MidiError> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| MidiError::DeviceUnavailable("connection closed".to_string()))?;
        let bytes = encode_message(message);
        connection
            .send(&bytes)
            .map_err(|e| MidiError::Backend(e.to_string()))
    }

    fn close(mut self: Box<Self>) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
        }
    }
}

impl MidiOutputPort for MidirMidiOutputPort {
    fn list_outputs(&self) -> Result<Vec<MidiOutputDevice>, MidiError> {
        let midi_out = self.create_midi_out()?;
        let ports = midi_out.ports();
        let mut devices = Vec::new();

        for (index, port) in ports.iter().enumerate() {
            let name = midi_out
                .port_name(port)
                .unwrap_or_else(|_| "Unknown Output".to_string());
            devices.push(MidiOutputDevice {
                id: Self::device_id(index, &name),
                name,
                is_available: true,
            });
        }

        Ok(devices)
    }

    fn open_output(&self, device_id: &DeviceId) -> Result<Box<dyn MidiOutputConn>, MidiError> {
        let midi_out = self.create_midi_out()?;

        let ports = midi_out.ports();
        let mut selected = None;
        for (index, port) in ports.iter().enumerate() {
            let name = midi_out
                .port_name(port)
                .unwrap_or_else(|_| "Unknown Output".to_string());
            let id = Self::device_id(index, &name);
            if &id == device_id {
                selected = Some(port.clone());
                break;
            }
        }

        let port = selected.ok_or_else(|| MidiError::DeviceNotFound(device_id.to_string()))?;

        let connection = midi_out
            .connect(&port, "strumpad-midi-output")
            .map_err(|e| MidiError::Backend(e.to_string()))?;

        Ok(Box::new(MidirMidiOutputConn {
            connection: Some(connection),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_bend_center_and_extremes() {
        assert_eq!(
            encode_message(MidiMessage::PitchBend {
                channel: 0,
                value: 0.0
            }),
            vec![0xE0, 0x00, 0x40]
        );
        assert_eq!(
            encode_message(MidiMessage::PitchBend {
                channel: 0,
                value: -1.0
            }),
            vec![0xE0, 0x00, 0x00]
        );
        // +1.0 saturates at the 14-bit ceiling.
        assert_eq!(
            encode_message(MidiMessage::PitchBend {
                channel: 0,
                value: 1.0
            }),
            vec![0xE0, 0x7F, 0x7F]
        );
    }

    #[test]
    fn note_messages_carry_channel_in_the_status_nibble() {
        assert_eq!(
            encode_message(MidiMessage::NoteOn {
                channel: 2,
                note: 60,
                velocity: 100
            }),
            vec![0x92, 60, 100]
        );
        assert_eq!(
            encode_message(MidiMessage::NoteOff {
                channel: 2,
                note: 60
            }),
            vec![0x82, 60, 0]
        );
    }

    #[test]
    fn out_of_range_bend_values_clamp() {
        let bytes = encode_message(MidiMessage::PitchBend {
            channel: 0,
            value: 5.0,
        });
        assert_eq!(bytes, vec![0xE0, 0x7F, 0x7F]);
        let bytes = encode_message(MidiMessage::PitchBend {
            channel: 0,
            value: -5.0,
        });
        assert_eq!(bytes, vec![0xE0, 0x00, 0x00]);
    }
}
