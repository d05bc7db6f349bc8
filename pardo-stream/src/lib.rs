// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Per-partition element processor applying user functions to windowed streams.
//!
//! A [`ParDoUnit`] receives four kinds of signals from its host: main-input elements, main-input
//! watermarks, side-input values and side-input watermarks. Elements are processed per window by
//! a user-supplied [`DoFn`]. When the user function needs a side input which has not arrived yet
//! for the window of an element, the element is pushed back and retried as soon as a new
//! side-input value arrives.
//!
//! Pushed back elements hold back the output watermark: it never passes the input watermark nor
//! the timestamp of any element which still waits for its side inputs.
//!
//! Results of the user function are routed to the main output or to one of up to
//! [`MAX_SIDE_OUTPUTS`] tagged side outputs.
//!
//! Units can be driven directly by calling their signal handlers or by turning a stream of
//! [`Signal`]s into a stream of outputs with [`ParDoExt::par_do`].
mod assertion;
mod config;
mod dofn;
mod error;
mod gate;
mod pushback;
mod router;
mod side_input;
mod stream;
#[cfg(test)]
mod test_utils;
mod unit;
mod watermark;

pub use assertion::AssertionSlot;
pub use config::{DEFAULT_MAIN_OUTPUT_TAG, MAX_SIDE_OUTPUTS, ParDoConfig, SideInputSpec};
pub use dofn::{DoFn, ProcessContext};
pub use error::{ConfigError, ParDoError, UserCodeError};
pub use pushback::PushbackBuffer;
pub use router::{Emission, OutputRouter, OutputSink, Port};
pub use side_input::{SideInputReader, SideInputStore};
pub use stream::{ParDo, ParDoExt};
pub use unit::{Lifecycle, ParDoUnit, Signal};
pub use watermark::WatermarkCoordinator;
