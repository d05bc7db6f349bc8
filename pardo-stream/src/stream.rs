// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::stream::{Fuse, FusedStream};
use futures_util::task::{Context, Poll};
use futures_util::{Stream, StreamExt, ready};
use pin_project::pin_project;
use tracing::{debug, warn};

use crate::dofn::DoFn;
use crate::error::ParDoError;
use crate::router::{Emission, Port};
use crate::unit::{Lifecycle, ParDoUnit, Signal};

/// An extension trait for `Stream`s that provides a convenient [`par_do`](ParDoExt::par_do)
/// method.
pub trait ParDoExt<F>: Stream<Item = Signal<F::Input, F::SideInput>>
where
    F: DoFn,
{
    /// Drives a processing unit with the signals of this stream.
    ///
    /// The unit is set up on first poll if that did not happen yet and torn down once the
    /// upstream ends. Everything the unit emits is yielded in order together with the port it was
    /// emitted on. Errors are yielded after all outputs emitted before them, the stream keeps
    /// going afterwards.
    fn par_do(self, unit: ParDoUnit<F>) -> ParDo<Self, F>
    where
        Self: Sized,
    {
        ParDo::new(self, unit)
    }
}

impl<T: ?Sized, F> ParDoExt<F> for T
where
    T: Stream<Item = Signal<F::Input, F::SideInput>>,
    F: DoFn,
{
}

/// Stream for the [`par_do`](ParDoExt::par_do) method.
#[pin_project]
#[must_use = "streams do nothing unless polled"]
pub struct ParDo<St, F>
where
    St: Stream<Item = Signal<F::Input, F::SideInput>>,
    F: DoFn,
{
    #[pin]
    stream: Fuse<St>,
    unit: ParDoUnit<F>,
    pending: VecDeque<(Port, Emission<F::Output>)>,
    error: Option<ParDoError>,
}

impl<St, F> ParDo<St, F>
where
    St: Stream<Item = Signal<F::Input, F::SideInput>>,
    F: DoFn,
{
    pub(super) fn new(stream: St, unit: ParDoUnit<F>) -> Self {
        Self {
            stream: stream.fuse(),
            unit,
            pending: VecDeque::new(),
            error: None,
        }
    }

    /// Acquires a reference to the driven processing unit.
    pub fn unit(&self) -> &ParDoUnit<F> {
        &self.unit
    }

    /// Consumes this combinator, returning the underlying stream and the processing unit.
    pub fn into_inner(self) -> (St, ParDoUnit<F>) {
        (self.stream.into_inner(), self.unit)
    }
}

impl<St, F> Stream for ParDo<St, F>
where
    St: Stream<Item = Signal<F::Input, F::SideInput>>,
    F: DoFn,
    F::Input: Clone,
    F::SideInput: Clone,
{
    type Item = Result<(Port, Emission<F::Output>), ParDoError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(output) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(output)));
            }

            if let Some(err) = this.error.take() {
                return Poll::Ready(Some(Err(err)));
            }

            if this.unit.lifecycle() == Lifecycle::Created {
                if let Err(err) = this.unit.setup() {
                    warn!("setting up processing unit failed: {}", err);
                    // Signals arriving later are rejected by the unit.
                    this.unit.teardown();
                    return Poll::Ready(Some(Err(err)));
                }
            }

            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(signal) => {
                    if let Err(err) = this.unit.handle(signal, &mut *this.pending) {
                        *this.error = Some(err);
                    }
                }
                None => {
                    if this.unit.is_running() {
                        debug!("upstream ended, tearing down processing unit");
                        this.unit.teardown();
                    }
                    return Poll::Ready(None);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let buffered = self.pending.len() + usize::from(self.error.is_some());
        let (_, upper) = self.stream.size_hint();

        // Every signal can expand into any number of outputs.
        match upper {
            Some(0) => (buffered, Some(buffered)),
            _ => (buffered, None),
        }
    }
}

impl<St, F> FusedStream for ParDo<St, F>
where
    St: Stream<Item = Signal<F::Input, F::SideInput>>,
    F: DoFn,
    F::Input: Clone,
    F::SideInput: Clone,
{
    fn is_terminated(&self) -> bool {
        self.stream.is_terminated() && self.pending.is_empty() && self.error.is_none()
    }
}
