use std::{
    error::Error,
    io::{self, BufRead},
    path::PathBuf,
    sync::mpsc,
    thread,
};

use amx_mapper::{
    midi_bridge::{self, MidiBridge},
    AmxMapping, Channel, Config, ControlRegistry, ControlSurface, MappingError, MemoryHost,
};
use clap::Parser;
use log::{info, warn};

/// Drive the Akai AMX mapping from a MIDI port.
#[derive(Parser, Debug)]
#[command(name = "amx-mapper")]
struct Args {
    /// YAML bridge configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Layout file replacing the embedded AMX layout
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Part of the input port name
    #[arg(long)]
    input: Option<String>,

    /// Part of the output port name (defaults to the input hint)
    #[arg(long)]
    output: Option<String>,

    /// MIDI channel the controller sends on
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..16))]
    channel: Option<u8>,

    /// Print the available MIDI ports and exit
    #[arg(long)]
    list_ports: bool,
}

#[derive(Debug)]
enum ControlMessage {
    Midi(Vec<u8>),
    Quit,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list_ports {
        let ports = midi_bridge::list_ports()?;
        println!("inputs:");
        for name in &ports.inputs {
            println!("  {name}");
        }
        println!("outputs:");
        for name in &ports.outputs {
            println!("  {name}");
        }
        return Ok(());
    }

    let config = resolve_config(&args)?;
    let registry = match &config.layout {
        Some(path) => ControlRegistry::load(path)?,
        None => ControlRegistry::amx()?,
    };

    let (tx, rx) = mpsc::channel::<ControlMessage>();
    let midi_tx = tx.clone();
    let bridge = MidiBridge::open(
        &config.midi.input_port,
        config.midi.output_hint(),
        move |bytes| {
            let _ = midi_tx.send(ControlMessage::Midi(bytes.to_vec()));
        },
    )?;

    thread::spawn(move || {
        let mut line = String::new();
        if matches!(io::stdin().lock().read_line(&mut line), Ok(n) if n > 0) {
            let _ = tx.send(ControlMessage::Quit);
        }
    });

    let mut surface = ControlSurface::new(MemoryHost::new());
    let mapping = AmxMapping::build(&mut surface, &registry, Channel::new(config.midi.channel));
    let failed = mapping.init(&mut surface);
    if failed > 0 {
        warn!("{failed} controls could not be connected");
    }
    bridge.send(surface.take_output())?;
    info!(
        "mapping ready on {} (LEDs: {}), press Enter to quit",
        bridge.input_name(),
        bridge.output_name().unwrap_or("none")
    );

    for message in rx {
        match message {
            ControlMessage::Midi(bytes) => {
                surface.handle_message(&bytes);
                bridge.send(surface.take_output())?;
            }
            ControlMessage::Quit => break,
        }
    }

    mapping.shutdown(&mut surface);
    bridge.send(surface.take_output())?;
    info!("mapping shut down");
    Ok(())
}

/// Config file values overridden by command line flags.
fn resolve_config(args: &Args) -> Result<Config, MappingError> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(layout) = &args.layout {
        config.layout = Some(layout.clone());
    }
    if let Some(input) = &args.input {
        config.midi.input_port = input.clone();
    }
    if let Some(output) = &args.output {
        config.midi.output_port = Some(output.clone());
    }
    if let Some(channel) = args.channel {
        config.midi.channel = channel;
    }
    Ok(config)
}
