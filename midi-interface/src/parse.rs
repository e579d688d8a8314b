// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! Raw MIDI byte parsing, adapted from `imbolc-core`'s `parse_midi_message`
//! to produce `arpio-core`'s [MidiEventKind] instead of a standalone event
//! enum, and to recognise realtime Clock/Start/Stop status bytes.

use arpio_core::midi::{MidiChannel, MidiEventKind};

/// Parses one raw MIDI message into a `(kind, channel)` pair. Realtime
/// messages (`Clock`/`Start`/`Stop`) carry no channel; channel 0 is
/// reported for them since the scheduler never gates on channel for
/// those kinds (see `MidiRouter::is_channel_gated`).
pub fn parse_live_event(data: &[u8]) -> Option<(MidiEventKind, MidiChannel)> {
    if data.is_empty() {
        return None;
    }

    let status = data[0];
    match status {
        0xF8 => return Some((MidiEventKind::Clock, MidiChannel::default())),
        0xFA => return Some((MidiEventKind::Start, MidiChannel::default())),
        0xFC => return Some((MidiEventKind::Stop, MidiChannel::default())),
        _ => {}
    }

    let channel = MidiChannel::from(status & 0x0F);
    let message_type = status & 0xF0;
    match message_type {
        0x80 if data.len() >= 3 => Some((MidiEventKind::NoteOff { note: data[1] }, channel)),
        0x90 if data.len() >= 3 => {
            let velocity = data[2];
            if velocity == 0 {
                Some((MidiEventKind::NoteOff { note: data[1] }, channel))
            } else {
                Some((
                    MidiEventKind::NoteOn {
                        note: data[1],
                        velocity,
                    },
                    channel,
                ))
            }
        }
        0xB0 if data.len() >= 3 => Some((
            MidiEventKind::Controller {
                param: data[1],
                value: data[2],
            },
            channel,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_on() {
        let (kind, channel) = parse_live_event(&[0x90, 60, 100]).unwrap();
        assert_eq!(
            kind,
            MidiEventKind::NoteOn {
                note: 60,
                velocity: 100
            }
        );
        assert_eq!(channel, MidiChannel::from(0u8));
    }

    #[test]
    fn note_on_with_zero_velocity_is_note_off() {
        let (kind, _) = parse_live_event(&[0x90, 60, 0]).unwrap();
        assert_eq!(kind, MidiEventKind::NoteOff { note: 60 });
    }

    #[test]
    fn parses_clock_start_stop() {
        assert_eq!(
            parse_live_event(&[0xF8]).unwrap().0,
            MidiEventKind::Clock
        );
        assert_eq!(parse_live_event(&[0xFA]).unwrap().0, MidiEventKind::Start);
        assert_eq!(parse_live_event(&[0xFC]).unwrap().0, MidiEventKind::Stop);
    }

    #[test]
    fn rejects_empty_and_short_messages() {
        assert!(parse_live_event(&[]).is_none());
        assert!(parse_live_event(&[0x90, 60]).is_none());
    }

    #[test]
    fn parses_controller_change() {
        let (kind, channel) = parse_live_event(&[0xB1, 1, 64]).unwrap();
        assert_eq!(
            kind,
            MidiEventKind::Controller {
                param: 1,
                value: 64
            }
        );
        assert_eq!(channel, MidiChannel::from(1u8));
    }
}
