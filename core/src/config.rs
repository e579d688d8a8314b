// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! Overridable engine constants, serde-derived for TOML/CLI loading the
//! way the teacher's session state is serialised (kebab-case field names).

use serde::{Deserialize, Serialize};

use crate::scheduler::{ARP_SCHED_DELAY_TICKS, LOOKAHEAD_TICKS};
use crate::tick_clock::PPQN;
use crate::transport::MIDICLK_PPQ;

/// Compiled-in defaults for every field of [EngineConfig], matching this
/// module's constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    pub ppqn: u32,
    pub midiclk_ppq: u32,
    /// Maximum number of Seq modules the registry is expected to hold;
    /// advisory only, not a hard cap.
    pub seqpool: usize,
    pub max_ports: u8,
    pub sched_delay_ticks: i64,
    pub lookahead_ticks: i64,
    pub initial_tempo_bpm: f64,
    /// When no worker consumes an incoming controller event, emit it as
    /// [crate::events::EngineEvent::Control] for the GUI/session layer.
    pub midi_controllable: bool,
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ppqn: PPQN,
            midiclk_ppq: MIDICLK_PPQ,
            seqpool: 16,
            max_ports: 20,
            sched_delay_ticks: ARP_SCHED_DELAY_TICKS,
            lookahead_ticks: LOOKAHEAD_TICKS,
            initial_tempo_bpm: 100.0,
            midi_controllable: true,
        }
    }
}
impl EngineConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_compiled_in_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.ppqn, 192);
        assert_eq!(config.midiclk_ppq, 24);
        assert_eq!(config.max_ports, 20);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = EngineConfig::default();
        let s = toml::to_string(&config).unwrap();
        let back = EngineConfig::from_toml_str(&s).unwrap();
        assert_eq!(config, back);
    }
}
