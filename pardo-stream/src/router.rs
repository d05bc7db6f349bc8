// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{HashMap, VecDeque};

use pardo_core::{OutputTag, Timestamp, WindowedValue};
use tracing::debug;

use crate::config::ParDoConfig;
use crate::error::ConfigError;

/// Physical output channel of a processing unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Port {
    Main,

    /// Side-output channel, numbered in the order the side-output tags were configured.
    Side(usize),
}

/// Item delivered on an output channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Emission<T> {
    Data(WindowedValue<T>),

    /// Output watermark advance. Only ever delivered on [`Port::Main`].
    Watermark(Timestamp),
}

/// Receiver of everything a processing unit emits, in emission order.
pub trait OutputSink<T> {
    fn emit(&mut self, port: Port, emission: Emission<T>);
}

impl<T> OutputSink<T> for Vec<(Port, Emission<T>)> {
    fn emit(&mut self, port: Port, emission: Emission<T>) {
        self.push((port, emission));
    }
}

impl<T> OutputSink<T> for VecDeque<(Port, Emission<T>)> {
    fn emit(&mut self, port: Port, emission: Emission<T>) {
        self.push_back((port, emission));
    }
}

/// Multiplexes results of the user function onto the main or one of the side-output channels.
///
/// The mapping from tag to channel is built once from the configuration and never changes.
#[derive(Clone, Debug)]
pub struct OutputRouter {
    side_outputs: HashMap<OutputTag, usize>,
    trace_tuples: bool,
}

impl OutputRouter {
    pub fn new(config: &ParDoConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let side_outputs = config
            .side_output_tags
            .iter()
            .enumerate()
            .map(|(channel, tag)| (tag.clone(), channel))
            .collect();

        Ok(Self {
            side_outputs,
            trace_tuples: config.trace_tuples,
        })
    }

    /// Channel a result with the given tag is delivered on. Unknown tags and untagged results go
    /// to the main output.
    pub fn port(&self, tag: Option<&OutputTag>) -> Port {
        tag.and_then(|tag| self.side_outputs.get(tag))
            .map_or(Port::Main, |channel| Port::Side(*channel))
    }

    pub fn route<T>(
        &self,
        tag: Option<&OutputTag>,
        value: WindowedValue<T>,
        sink: &mut dyn OutputSink<T>,
    ) {
        let port = self.port(tag);

        if self.trace_tuples {
            debug!(
                "emitting on {:?}: timestamp={} windows={:?}",
                port,
                value.timestamp(),
                value.windows()
            );
        }

        sink.emit(port, Emission::Data(value));
    }

    pub fn emit_watermark<T>(&self, watermark: Timestamp, sink: &mut dyn OutputSink<T>) {
        if self.trace_tuples {
            debug!("emitting watermark {}", watermark);
        }

        sink.emit(Port::Main, Emission::Watermark(watermark));
    }
}
