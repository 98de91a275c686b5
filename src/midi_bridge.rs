use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use log::{debug, error, info, warn};
use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::error::MidiIoError;
use crate::midi::MidiMessage;

const CLIENT_NAME: &str = "amx-mapper";
const THREAD_NAME: &str = "amx-mapper-leds";

/// Connection to a controller: incoming bytes are handed to a callback on
/// the backend's thread, LED messages are written by a dedicated output
/// thread.
pub struct MidiBridge {
    _input: MidiInputConnection<()>,
    input_name: String,
    output: Option<OutputWorker>,
}

impl MidiBridge {
    /// Open the first input port whose name contains `input_hint` and the
    /// first output port matching `output_hint`. An empty hint selects the
    /// first port. A missing output port is logged and the bridge runs
    /// without LED feedback.
    pub fn open<F>(
        input_hint: &str,
        output_hint: &str,
        mut on_message: F,
    ) -> Result<Self, MidiIoError>
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        let mut midi_in =
            MidiInput::new(CLIENT_NAME).map_err(|err| MidiIoError::MidiInit(err.to_string()))?;
        midi_in.ignore(Ignore::All);

        let port = find_port(&midi_in, input_hint)?;
        let input_name = midi_in
            .port_name(&port)
            .unwrap_or_else(|_| "<unknown>".into());

        let input = midi_in
            .connect(
                &port,
                "amx-mapper-in",
                move |_, bytes, _| on_message(bytes),
                (),
            )
            .map_err(|err| MidiIoError::Connection(err.to_string()))?;
        info!("listening on {input_name}");

        let output = match OutputWorker::open(output_hint) {
            Ok(worker) => {
                info!("sending LED feedback to {}", worker.port_name);
                Some(worker)
            }
            Err(err) => {
                warn!("{err}, running without LED feedback");
                None
            }
        };

        Ok(Self {
            _input: input,
            input_name,
            output,
        })
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> Option<&str> {
        self.output.as_ref().map(|worker| worker.port_name.as_str())
    }

    /// Queue messages for the output thread. Without an output port this is
    /// a no-op.
    pub fn send(&self, messages: Vec<MidiMessage>) -> Result<(), MidiIoError> {
        if messages.is_empty() {
            return Ok(());
        }
        match &self.output {
            Some(worker) => worker
                .tx
                .send(Command::Send(messages))
                .map_err(|_| MidiIoError::Thread("output thread has stopped".into())),
            None => Ok(()),
        }
    }
}

struct OutputWorker {
    tx: Sender<Command>,
    thread: Option<thread::JoinHandle<()>>,
    port_name: String,
}

impl OutputWorker {
    fn open(port_hint: &str) -> Result<Self, MidiIoError> {
        let midi_out =
            MidiOutput::new(CLIENT_NAME).map_err(|err| MidiIoError::MidiInit(err.to_string()))?;
        let port = find_port(&midi_out, port_hint)?;
        let port_name = midi_out
            .port_name(&port)
            .unwrap_or_else(|_| "<unknown>".into());

        let connection = midi_out
            .connect(&port, "amx-mapper-out")
            .map_err(|err| MidiIoError::Connection(err.to_string()))?;

        let (tx, rx) = mpsc::channel::<Command>();
        let port_label = port_name.clone();
        let thread = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || run_output(connection, rx, port_label))
            .map_err(|err| MidiIoError::Thread(err.to_string()))?;

        Ok(Self {
            tx,
            thread: Some(thread),
            port_name,
        })
    }
}

impl Drop for OutputWorker {
    fn drop(&mut self) {
        if self.tx.send(Command::Shutdown).is_ok() {
            if let Some(handle) = self.thread.take() {
                let _ = handle.join();
            }
        }
    }
}

#[derive(Debug)]
enum Command {
    Send(Vec<MidiMessage>),
    Shutdown,
}

fn run_output(mut connection: MidiOutputConnection, rx: Receiver<Command>, port_name: String) {
    while let Ok(Command::Send(messages)) = rx.recv() {
        for message in messages {
            debug!("led {:02X?}", message.to_bytes());
            if let Err(err) = connection.send(&message.to_bytes()) {
                error!(
                    "midi out ({port_name}): {}",
                    MidiIoError::Send(err.to_string())
                );
            }
        }
    }
    let _ = connection.close();
}

/// Port names seen by the MIDI backend.
#[derive(Debug, Clone, Default)]
pub struct PortList {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

pub fn list_ports() -> Result<PortList, MidiIoError> {
    let midi_in =
        MidiInput::new(CLIENT_NAME).map_err(|err| MidiIoError::MidiInit(err.to_string()))?;
    let midi_out =
        MidiOutput::new(CLIENT_NAME).map_err(|err| MidiIoError::MidiInit(err.to_string()))?;
    Ok(PortList {
        inputs: port_names(&midi_in),
        outputs: port_names(&midi_out),
    })
}

fn port_names<T: MidiIO>(io: &T) -> Vec<String> {
    io.ports()
        .iter()
        .map(|port| io.port_name(port).unwrap_or_else(|_| "<unknown>".into()))
        .collect()
}

fn find_port<T: MidiIO>(io: &T, hint: &str) -> Result<T::Port, MidiIoError> {
    let ports = io.ports();
    match_port(&port_names(io), hint)
        .and_then(|index| ports.get(index).cloned())
        .ok_or_else(|| MidiIoError::PortNotFound(hint.to_string()))
}

/// Index of the first name containing `hint`, ignoring case. A blank hint
/// picks the first port.
fn match_port(names: &[String], hint: &str) -> Option<usize> {
    if names.is_empty() {
        return None;
    }
    if hint.trim().is_empty() {
        return Some(0);
    }
    let hint = hint.to_lowercase();
    names
        .iter()
        .position(|name| name.to_lowercase().contains(&hint))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec![
            "Midi Through:Midi Through Port-0 14:0".to_string(),
            "AKAI AMX:AKAI AMX MIDI 1 24:0".to_string(),
        ]
    }

    #[test]
    fn matches_port_by_case_insensitive_hint() {
        assert_eq!(match_port(&names(), "amx"), Some(1));
        assert_eq!(match_port(&names(), "THROUGH"), Some(0));
        assert_eq!(match_port(&names(), "x1"), None);
    }

    #[test]
    fn blank_hint_picks_first_port() {
        assert_eq!(match_port(&names(), "  "), Some(0));
        assert_eq!(match_port(&[], ""), None);
    }
}
