// SPDX-License-Identifier: MIT OR Apache-2.0

use pardo_core::{OutputTag, SideInputId, Timestamp, Window, WindowedValue};

use crate::error::UserCodeError;
use crate::router::{OutputRouter, OutputSink};
use crate::side_input::SideInputReader;

/// User-supplied per-element function.
///
/// A unit constructs its function once and reuses it for every element of its lifetime. `setup`
/// and `teardown` are called exactly once, every element is processed inside its own
/// `start_bundle` / `finish_bundle` bracket.
///
/// Results are emitted through the [`ProcessContext`] and delivered downstream right away. If
/// processing fails afterwards, already emitted results are not taken back.
pub trait DoFn {
    type Input;

    type Output;

    /// Type of the values all side inputs of this function carry.
    type SideInput;

    fn setup(&mut self) -> Result<(), UserCodeError> {
        Ok(())
    }

    fn start_bundle(&mut self) -> Result<(), UserCodeError> {
        Ok(())
    }

    /// Processes one element in one of its windows.
    ///
    /// Only ever called when every side input is available for that window.
    fn process_element(
        &mut self,
        cx: &mut ProcessContext<'_, Self::Input, Self::Output, Self::SideInput>,
    ) -> Result<(), UserCodeError>;

    fn finish_bundle(&mut self) -> Result<(), UserCodeError> {
        Ok(())
    }

    fn teardown(&mut self) {}
}

impl<F> DoFn for Box<F>
where
    F: DoFn + ?Sized,
{
    type Input = F::Input;

    type Output = F::Output;

    type SideInput = F::SideInput;

    fn setup(&mut self) -> Result<(), UserCodeError> {
        (**self).setup()
    }

    fn start_bundle(&mut self) -> Result<(), UserCodeError> {
        (**self).start_bundle()
    }

    fn process_element(
        &mut self,
        cx: &mut ProcessContext<'_, Self::Input, Self::Output, Self::SideInput>,
    ) -> Result<(), UserCodeError> {
        (**self).process_element(cx)
    }

    fn finish_bundle(&mut self) -> Result<(), UserCodeError> {
        (**self).finish_bundle()
    }

    fn teardown(&mut self) {
        (**self).teardown()
    }
}

/// Everything a [`DoFn`] sees while processing one element in one window.
pub struct ProcessContext<'a, I, O, V> {
    element: &'a WindowedValue<I>,
    window: Window,
    side_inputs: &'a dyn SideInputReader<V>,
    router: &'a OutputRouter,
    sink: &'a mut dyn OutputSink<O>,
}

impl<'a, I, O, V> ProcessContext<'a, I, O, V> {
    pub(crate) fn new(
        element: &'a WindowedValue<I>,
        window: Window,
        side_inputs: &'a dyn SideInputReader<V>,
        router: &'a OutputRouter,
        sink: &'a mut dyn OutputSink<O>,
    ) -> Self {
        Self {
            element,
            window,
            side_inputs,
            router,
            sink,
        }
    }

    pub fn element(&self) -> &WindowedValue<I> {
        self.element
    }

    pub fn value(&self) -> &I {
        self.element.value()
    }

    pub fn timestamp(&self) -> Timestamp {
        self.element.timestamp()
    }

    /// Window the element is processed in.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Value of the side input at `index` for the current window.
    pub fn side_input(&self, index: usize) -> Option<&V> {
        self.side_inputs.get(index, &self.window)
    }

    pub fn side_input_by_id(&self, id: &SideInputId) -> Option<&V> {
        self.side_inputs.get_by_id(id, &self.window)
    }

    /// Emits a result on the main output, with the timestamp and window of the input element.
    pub fn output(&mut self, value: O) {
        self.output_with_timestamp(value, self.element.timestamp());
    }

    pub fn output_with_timestamp(&mut self, value: O, timestamp: Timestamp) {
        let value = WindowedValue::of(value, timestamp, self.window);
        self.router.route(None, value, &mut *self.sink);
    }

    /// Emits a result on the output registered for `tag`, falling back to the main output for
    /// unknown tags.
    pub fn output_tagged(&mut self, tag: &OutputTag, value: O) {
        let value = WindowedValue::of(value, self.element.timestamp(), self.window);
        self.router.route(Some(tag), value, &mut *self.sink);
    }
}
