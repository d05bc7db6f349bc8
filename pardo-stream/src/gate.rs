// SPDX-License-Identifier: MIT OR Apache-2.0

use pardo_core::WindowedValue;
use tracing::{debug, warn};

use crate::assertion::AssertionSlot;
use crate::dofn::{DoFn, ProcessContext};
use crate::error::{ParDoError, UserCodeError};
use crate::router::{OutputRouter, OutputSink};
use crate::side_input::SideInputStore;

/// Decides per window of an element whether all side inputs are available and runs the user
/// function for those windows.
///
/// Windows with a missing side input are handed back as single-window elements, unchanged, so
/// they can be pushed back and tried again later. A window is never handed to the user function
/// twice for the same element.
pub(crate) struct ElementGate<'a, F>
where
    F: DoFn,
{
    do_fn: &'a mut F,
    side_inputs: &'a SideInputStore<F::SideInput>,
    router: &'a OutputRouter,
    assertions: &'a AssertionSlot,
}

impl<'a, F> ElementGate<'a, F>
where
    F: DoFn,
    F::Input: Clone,
{
    pub fn new(
        do_fn: &'a mut F,
        side_inputs: &'a SideInputStore<F::SideInput>,
        router: &'a OutputRouter,
        assertions: &'a AssertionSlot,
    ) -> Self {
        Self {
            do_fn,
            side_inputs,
            router,
            assertions,
        }
    }

    /// Processes the element in all windows which are ready and returns the pushed back rest.
    ///
    /// A failure of user code is fatal for the whole element: windows which were already found
    /// to be blocked are not returned and never processed.
    pub fn try_process(
        &mut self,
        element: WindowedValue<F::Input>,
        sink: &mut dyn OutputSink<F::Output>,
    ) -> Result<Vec<WindowedValue<F::Input>>, ParDoError> {
        self.process_in_ready_windows(element, sink).map_err(|err| {
            if let UserCodeError::Assertion(message) = &err {
                self.assertions.set(message.clone());
            }
            err.into()
        })
    }

    fn process_in_ready_windows(
        &mut self,
        element: WindowedValue<F::Input>,
        sink: &mut dyn OutputSink<F::Output>,
    ) -> Result<Vec<WindowedValue<F::Input>>, UserCodeError> {
        self.do_fn.start_bundle()?;

        let mut pushed_back = Vec::new();
        for single in element.explode_windows() {
            let Some(window) = single.windows().first().copied() else {
                warn!(
                    "dropping element without windows at timestamp {}",
                    single.timestamp()
                );
                continue;
            };

            if !self.side_inputs.all_ready(&window) {
                debug!(
                    "pushing back element at {} in window {}, side input missing",
                    single.timestamp(),
                    window
                );
                pushed_back.push(single);
                continue;
            }

            let mut cx =
                ProcessContext::new(&single, window, self.side_inputs, self.router, &mut *sink);
            self.do_fn.process_element(&mut cx)?;
        }

        self.do_fn.finish_bundle()?;

        Ok(pushed_back)
    }
}

#[cfg(test)]
mod tests {
    use pardo_core::{Window, WindowedValue};

    use crate::assertion::AssertionSlot;
    use crate::config::{ParDoConfig, SideInputSpec};
    use crate::error::{ParDoError, UserCodeError};
    use crate::router::{Emission, OutputRouter, Port};
    use crate::side_input::SideInputStore;
    use crate::test_utils::{Failing, Lookup, Sink};

    use super::ElementGate;

    #[test]
    fn process_only_ready_windows() {
        let config = ParDoConfig::default().with_side_inputs([SideInputSpec::new("names")]);
        let router = OutputRouter::new(&config).unwrap();
        let assertions = AssertionSlot::new();
        let mut store = SideInputStore::new(config.side_inputs.clone());
        let mut do_fn = Lookup::default();

        let wa = Window::interval(0, 10);
        let wb = Window::interval(5, 15);
        store
            .insert(0, WindowedValue::of("alice".to_string(), 0, wa))
            .unwrap();

        let mut sink: Sink<String> = Vec::new();
        let mut gate = ElementGate::new(&mut do_fn, &store, &router, &assertions);
        let pushed_back = gate
            .try_process(WindowedValue::new(7, 8, vec![wa, wb]), &mut sink)
            .unwrap();

        // Only the window with a side input value got processed.
        assert_eq!(
            sink,
            vec![(
                Port::Main,
                Emission::Data(WindowedValue::of("7:alice".to_string(), 8, wa))
            )]
        );
        assert_eq!(pushed_back, vec![WindowedValue::of(7, 8, wb)]);

        // Every call is bracketed by a bundle.
        assert_eq!(do_fn.bundles, 1);
    }

    #[test]
    fn nothing_is_pushed_back_without_side_inputs() {
        let config = ParDoConfig::default();
        let router = OutputRouter::new(&config).unwrap();
        let assertions = AssertionSlot::new();
        let store = SideInputStore::new(vec![]);
        let mut do_fn = Lookup::default();

        let mut sink: Sink<String> = Vec::new();
        let mut gate = ElementGate::new(&mut do_fn, &store, &router, &assertions);
        let pushed_back = gate
            .try_process(WindowedValue::in_global_window(3, 1), &mut sink)
            .unwrap();

        assert!(pushed_back.is_empty());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn capture_assertion_failures() {
        let config = ParDoConfig::default();
        let router = OutputRouter::new(&config).unwrap();
        let assertions = AssertionSlot::new();
        let store = SideInputStore::new(vec![]);
        let mut do_fn = Failing::assertion_on(2);

        let mut sink: Sink<u64> = Vec::new();
        let mut gate = ElementGate::new(&mut do_fn, &store, &router, &assertions);

        let result = gate.try_process(WindowedValue::in_global_window(2, 1), &mut sink);
        assert!(matches!(
            result,
            Err(ParDoError::UserCode(UserCodeError::Assertion(_)))
        ));
        assert_eq!(assertions.get().as_deref(), Some("unexpected value 2"));

        // Output emitted before the failure is not rolled back.
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn other_failures_leave_slot_untouched() {
        let config = ParDoConfig::default();
        let router = OutputRouter::new(&config).unwrap();
        let assertions = AssertionSlot::new();
        let store = SideInputStore::new(vec![]);
        let mut do_fn = Failing::error_on(2);

        let mut sink: Sink<u64> = Vec::new();
        let mut gate = ElementGate::new(&mut do_fn, &store, &router, &assertions);

        let result = gate.try_process(WindowedValue::in_global_window(2, 1), &mut sink);
        assert!(matches!(
            result,
            Err(ParDoError::UserCode(UserCodeError::Failed(_)))
        ));
        assert_eq!(assertions.get(), None);
    }
}
