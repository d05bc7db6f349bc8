// SPDX-License-Identifier: MIT OR Apache-2.0

use pardo_core::cbor::{decode_cbor, encode_cbor};
use pardo_core::{Timestamp, Window, WindowedValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::assertion::AssertionSlot;
use crate::config::ParDoConfig;
use crate::dofn::DoFn;
use crate::error::{ConfigError, ParDoError};
use crate::gate::ElementGate;
use crate::pushback::PushbackBuffer;
use crate::router::{OutputRouter, OutputSink};
use crate::side_input::SideInputStore;
use crate::watermark::WatermarkCoordinator;

/// Signal delivered by the host to a processing unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal<I, V> {
    /// Data element on the main input.
    Element(WindowedValue<I>),

    /// Watermark on the main input.
    Watermark(Timestamp),

    /// Value for the side input at `index` of the configured side inputs.
    SideInput { index: usize, value: WindowedValue<V> },

    /// Watermark on the side-input channel. Side-input watermarks carry no information for the
    /// unit and are ignored.
    SideInputWatermark(Timestamp),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    TornDown,
}

/// Per-partition execution unit applying a [`DoFn`] to a stream of windowed elements.
///
/// Elements which need a side input that is not available yet are pushed back and retried
/// whenever a side-input value arrives. The output watermark is held back to the smallest
/// timestamp of all pushed back elements.
///
/// A unit handles one signal at a time to completion. Every signal handler takes `&mut self`, the
/// host is responsible for serializing delivery; there is no internal locking.
pub struct ParDoUnit<F>
where
    F: DoFn,
{
    config: ParDoConfig,
    do_fn: F,
    router: OutputRouter,
    side_inputs: SideInputStore<F::SideInput>,
    pushback: PushbackBuffer<F::Input>,
    watermark: WatermarkCoordinator,
    assertions: AssertionSlot,
    lifecycle: Lifecycle,
}

impl<F> ParDoUnit<F>
where
    F: DoFn,
    F::Input: Clone,
    F::SideInput: Clone,
{
    /// Creates a unit, rejecting invalid configurations.
    pub fn new(config: ParDoConfig, do_fn: F) -> Result<Self, ConfigError> {
        let router = OutputRouter::new(&config)?;
        let side_inputs = SideInputStore::new(config.side_inputs.clone());
        let watermark = WatermarkCoordinator::new(!config.side_inputs.is_empty());

        Ok(Self {
            config,
            do_fn,
            router,
            side_inputs,
            pushback: PushbackBuffer::new(),
            watermark,
            assertions: AssertionSlot::global(),
            lifecycle: Lifecycle::Created,
        })
    }

    /// Records assertion failures of user code in the given slot instead of the process-wide one.
    pub fn with_assertion_slot(mut self, assertions: AssertionSlot) -> Self {
        self.assertions = assertions;
        self
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn setup(&mut self) -> Result<(), ParDoError> {
        if self.lifecycle != Lifecycle::Created {
            return Err(ParDoError::AlreadySetUp);
        }

        self.do_fn.setup()?;
        self.lifecycle = Lifecycle::Running;
        debug!(
            "set up unit with {} side inputs and {} side outputs",
            self.config.side_inputs.len(),
            self.config.side_output_tags.len()
        );

        Ok(())
    }

    /// Tears the user function down. Calling it more than once has no effect.
    pub fn teardown(&mut self) {
        if self.lifecycle == Lifecycle::Running {
            self.do_fn.teardown();
            debug!("tore down unit with {} pushed back elements", self.pushback.len());
        }

        self.lifecycle = Lifecycle::TornDown;
    }

    pub fn handle(
        &mut self,
        signal: Signal<F::Input, F::SideInput>,
        sink: &mut dyn OutputSink<F::Output>,
    ) -> Result<(), ParDoError> {
        match signal {
            Signal::Element(element) => self.process_element(element, sink),
            Signal::Watermark(watermark) => self.process_watermark(watermark, sink),
            Signal::SideInput { index, value } => self.process_side_input(index, value, sink),
            Signal::SideInputWatermark(watermark) => {
                self.ensure_running()?;
                trace!("ignoring side input watermark {}", watermark);
                Ok(())
            }
        }
    }

    /// Processes an element in all windows whose side inputs are ready and pushes back the rest.
    pub fn process_element(
        &mut self,
        element: WindowedValue<F::Input>,
        sink: &mut dyn OutputSink<F::Output>,
    ) -> Result<(), ParDoError> {
        self.ensure_running()?;

        if self.config.trace_tuples {
            debug!(
                "input element timestamp={} windows={:?}",
                element.timestamp(),
                element.windows()
            );
        }

        let pushed_back = ElementGate::new(
            &mut self.do_fn,
            &self.side_inputs,
            &self.router,
            &self.assertions,
        )
        .try_process(element, sink)?;

        for element in pushed_back {
            self.pushback.add(element);
        }

        Ok(())
    }

    /// Advances the input watermark and emits the output watermark if it moved forward.
    pub fn process_watermark(
        &mut self,
        watermark: Timestamp,
        sink: &mut dyn OutputSink<F::Output>,
    ) -> Result<(), ParDoError> {
        self.ensure_running()?;

        if self.config.trace_tuples {
            debug!("input watermark {}", watermark);
        }

        if let Some(output) = self
            .watermark
            .on_input_watermark(watermark, self.pushback.min_timestamp())?
        {
            self.router.emit_watermark(output, sink);
        }

        Ok(())
    }

    /// Stores a side-input value, retries all pushed back elements and re-evaluates the output
    /// watermark.
    pub fn process_side_input(
        &mut self,
        index: usize,
        value: WindowedValue<F::SideInput>,
        sink: &mut dyn OutputSink<F::Output>,
    ) -> Result<(), ParDoError> {
        self.ensure_running()?;

        if self.config.trace_tuples {
            debug!(
                "side input {} timestamp={} windows={:?}",
                index,
                value.timestamp(),
                value.windows()
            );
        }

        self.side_inputs.insert(index, value)?;

        let Self {
            do_fn,
            side_inputs,
            router,
            assertions,
            pushback,
            ..
        } = self;

        let before = pushback.len();
        let mut gate = ElementGate::new(do_fn, side_inputs, router, assertions);
        pushback.reprocess(|element| gate.try_process(element, &mut *sink))?;
        trace!(
            "re-evaluated pushed back elements: {} before, {} after",
            before,
            pushback.len()
        );

        if let Some(output) = self.watermark.on_hold_changed(self.pushback.min_timestamp()) {
            self.router.emit_watermark(output, sink);
        }

        Ok(())
    }

    pub fn input_watermark(&self) -> Timestamp {
        self.watermark.input_watermark()
    }

    pub fn output_watermark(&self) -> Timestamp {
        self.watermark.output_watermark()
    }

    pub fn pushed_back(&self) -> &[WindowedValue<F::Input>] {
        self.pushback.elements()
    }

    /// Smallest timestamp of all pushed back elements, [`Timestamp::MAX`] if there are none.
    pub fn min_pushed_back_timestamp(&self) -> Timestamp {
        self.pushback.min_timestamp()
    }

    pub fn side_inputs(&self) -> &SideInputStore<F::SideInput> {
        &self.side_inputs
    }

    /// Encodes pushed back elements, side-input values and watermarks so the host can checkpoint
    /// the unit.
    pub fn snapshot(&self) -> Result<Vec<u8>, ParDoError>
    where
        F::Input: Serialize,
        F::SideInput: Serialize,
    {
        let snapshot = SnapshotRef {
            pushed_back: self.pushback.elements(),
            side_inputs: self.side_inputs.entries().collect(),
            input_watermark: self.watermark.input_watermark(),
            output_watermark: self.watermark.output_watermark(),
        };

        Ok(encode_cbor(&snapshot)?)
    }

    /// Replaces the state of this unit with a snapshot taken earlier.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), ParDoError>
    where
        F::Input: DeserializeOwned,
        F::SideInput: DeserializeOwned,
    {
        let snapshot: Snapshot<F::Input, F::SideInput> = decode_cbor(bytes)?;

        let mut side_inputs = SideInputStore::new(self.config.side_inputs.clone());
        for (index, window, value) in snapshot.side_inputs {
            side_inputs.insert_raw(index, window, value)?;
        }

        self.side_inputs = side_inputs;
        self.pushback = PushbackBuffer::from_elements(snapshot.pushed_back);
        self.watermark
            .restore(snapshot.input_watermark, snapshot.output_watermark);

        debug!(
            "restored unit with {} pushed back elements, output watermark {}",
            self.pushback.len(),
            self.watermark.output_watermark()
        );

        Ok(())
    }

    fn ensure_running(&self) -> Result<(), ParDoError> {
        if self.lifecycle != Lifecycle::Running {
            return Err(ParDoError::NotRunning);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a, I, V> {
    pushed_back: &'a [WindowedValue<I>],
    side_inputs: Vec<(usize, Window, &'a V)>,
    input_watermark: Timestamp,
    output_watermark: Timestamp,
}

#[derive(Deserialize)]
struct Snapshot<I, V> {
    pushed_back: Vec<WindowedValue<I>>,
    side_inputs: Vec<(usize, Window, V)>,
    input_watermark: Timestamp,
    output_watermark: Timestamp,
}
