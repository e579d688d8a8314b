// Copyright (c) 2023 Mike Tsao. All rights reserved.

//! Command-line entry point: picks an input/output MIDI port pair, an
//! initial tempo, and a clock-source mode, then wires `TransportController`
//! + `ModuleRegistry` + `Scheduler` + `MidiRouter` together over a
//! `midir`-backed `MidiBackend`.

use anyhow::Context;
use arpio_core::config::EngineConfig;
use arpio_core::registry::ModuleRegistry;
use arpio_core::router::MidiRouter;
use arpio_core::scheduler::{Scheduler, INFOTAG_NORMAL};
use arpio_core::transport::{ClockSource, TransportController};
use arpio_midi_interface::{list_input_ports, MidirBackend};
use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ClockArg {
    Internal,
    Midi,
    Host,
}
impl From<ClockArg> for ClockSource {
    fn from(value: ClockArg) -> Self {
        match value {
            ClockArg::Internal => ClockSource::Internal,
            ClockArg::Midi => ClockSource::MidiClock,
            ClockArg::Host => ClockSource::HostTransport,
        }
    }
}

/// MIDI arpeggiator, LFO, and step-sequencer scheduling engine.
#[derive(Parser, Debug)]
#[command(name = "arpio", version, about)]
struct Cli {
    /// Lists available MIDI input ports and exits.
    #[arg(long)]
    list_ports: bool,

    /// Index of the MIDI input port to read from.
    #[arg(long, default_value_t = 0)]
    input_port: usize,

    /// Indices of the MIDI output ports to write to (repeatable).
    #[arg(long = "output-port", num_args = 1.., default_value = "0")]
    output_ports: Vec<usize>,

    /// Initial tempo in beats per minute, overriding the config default.
    /// Ignored in MidiClock/Host mode once a recalibration reading arrives.
    #[arg(long)]
    tempo: Option<f64>,

    /// Which clock source drives scheduling.
    #[arg(long, value_enum, default_value_t = ClockArg::Internal)]
    clock: ClockArg,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_ports {
        for port in list_input_ports("arpio")? {
            println!("{}: {}", port.index, port.name);
        }
        return Ok(());
    }

    let mut config = EngineConfig::default();
    if let Some(tempo) = cli.tempo {
        config.initial_tempo_bpm = tempo;
    }
    log::info!(
        "starting arpio: ppqn={} clock={:?} tempo={} lookahead={} sched_delay={}",
        config.ppqn,
        cli.clock,
        config.initial_tempo_bpm,
        config.lookahead_ticks,
        config.sched_delay_ticks,
    );

    let backend = MidirBackend::connect("arpio", cli.input_port, &cli.output_ports, config.max_ports)
        .context("failed to connect to MIDI ports")?;

    let mut registry = ModuleRegistry::default();
    let router = MidiRouter::default();
    let mut transport = TransportController::new_with_tempo(config.initial_tempo_bpm);
    transport.set_midiclk_ppq(config.midiclk_ppq);
    transport.set_source(cli.clock.into(), &mut registry);

    let mut scheduler = Scheduler::new(registry, router, transport, backend, &config);
    let events = scheduler.subscribe();
    std::thread::spawn(move || {
        for event in events {
            log::debug!("engine event: {event:?}");
        }
    });

    scheduler.set_transport_status(true);
    scheduler.request_echo_at(0, INFOTAG_NORMAL);

    log::info!("entering run loop; press Ctrl-C to stop");
    loop {
        scheduler.step();
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
}
