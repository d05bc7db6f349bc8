// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::{Arc, Mutex};

use pardo_core::OutputTag;

use crate::dofn::{DoFn, ProcessContext};
use crate::error::UserCodeError;
use crate::router::{Emission, Port};

pub type Sink<T> = Vec<(Port, Emission<T>)>;

pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Data values emitted on the given port, in order.
pub fn data_on<T: Clone>(sink: &[(Port, Emission<T>)], port: Port) -> Vec<T> {
    sink.iter()
        .filter_map(|(p, emission)| match emission {
            Emission::Data(value) if *p == port => Some(value.value().clone()),
            _ => None,
        })
        .collect()
}

/// Watermarks emitted, in order.
pub fn watermarks<T>(sink: &[(Port, Emission<T>)]) -> Vec<i64> {
    sink.iter()
        .filter_map(|(_, emission)| match emission {
            Emission::Watermark(watermark) => Some(watermark.millis()),
            _ => None,
        })
        .collect()
}

/// Joins every element with the values of all side inputs, formatted as `value:side,side`.
#[derive(Debug, Default)]
pub struct Lookup {
    pub bundles: usize,
}

impl DoFn for Lookup {
    type Input = u64;

    type Output = String;

    type SideInput = String;

    fn process_element(
        &mut self,
        cx: &mut ProcessContext<'_, u64, String, String>,
    ) -> Result<(), UserCodeError> {
        let mut sides = Vec::new();
        while let Some(side) = cx.side_input(sides.len()) {
            sides.push(side.clone());
        }

        let output = if sides.is_empty() {
            cx.value().to_string()
        } else {
            format!("{}:{}", cx.value(), sides.join(","))
        };
        cx.output(output);

        Ok(())
    }

    fn finish_bundle(&mut self) -> Result<(), UserCodeError> {
        self.bundles += 1;
        Ok(())
    }
}

/// Emits every value and fails afterwards when it sees a configured value.
#[derive(Debug)]
pub struct Failing {
    on: u64,
    assertion: bool,
}

impl Failing {
    pub fn assertion_on(on: u64) -> Self {
        Self {
            on,
            assertion: true,
        }
    }

    pub fn error_on(on: u64) -> Self {
        Self {
            on,
            assertion: false,
        }
    }
}

impl DoFn for Failing {
    type Input = u64;

    type Output = u64;

    type SideInput = ();

    fn process_element(
        &mut self,
        cx: &mut ProcessContext<'_, u64, u64, ()>,
    ) -> Result<(), UserCodeError> {
        let value = *cx.value();
        cx.output(value);

        if value == self.on {
            let message = format!("unexpected value {value}");
            if self.assertion {
                return Err(UserCodeError::assertion(message));
            }
            return Err(UserCodeError::failed(message));
        }

        Ok(())
    }
}

/// Emits each value once tagged with `tag` and once untagged, multiplied by ten.
#[derive(Debug)]
pub struct Splitter {
    pub tag: OutputTag,
}

impl DoFn for Splitter {
    type Input = u64;

    type Output = u64;

    type SideInput = ();

    fn process_element(
        &mut self,
        cx: &mut ProcessContext<'_, u64, u64, ()>,
    ) -> Result<(), UserCodeError> {
        let value = *cx.value();
        cx.output_tagged(&self.tag, value);
        cx.output(value * 10);
        Ok(())
    }
}

/// Records every lifecycle call.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    pub events: Arc<Mutex<Vec<&'static str>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: &'static str) {
        self.events.lock().unwrap().push(event);
    }
}

impl DoFn for Recorder {
    type Input = u64;

    type Output = u64;

    type SideInput = ();

    fn setup(&mut self) -> Result<(), UserCodeError> {
        self.record("setup");
        Ok(())
    }

    fn start_bundle(&mut self) -> Result<(), UserCodeError> {
        self.record("start_bundle");
        Ok(())
    }

    fn process_element(
        &mut self,
        cx: &mut ProcessContext<'_, u64, u64, ()>,
    ) -> Result<(), UserCodeError> {
        self.record("process_element");
        cx.output(*cx.value());
        Ok(())
    }

    fn finish_bundle(&mut self) -> Result<(), UserCodeError> {
        self.record("finish_bundle");
        Ok(())
    }

    fn teardown(&mut self) {
        self.record("teardown");
    }
}
