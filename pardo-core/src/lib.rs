// SPDX-License-Identifier: MIT OR Apache-2.0

#![cfg_attr(doctest, doc=include_str!("../README.md"))]

//! Data-types shared by windowed stream processors.
//!
//! Every element travelling through a pipeline is a [`WindowedValue`]: a payload, a single
//! event-time [`Timestamp`] and the set of [`Window`]s it belongs to. Watermarks are plain
//! timestamps asserting that no element with a smaller timestamp will arrive anymore.
//!
//! Outputs are addressed by [`OutputTag`]s, side inputs by [`SideInputId`]s.
pub mod cbor;
mod tag;
mod timestamp;
mod window;
mod windowed_value;

pub use tag::{OutputTag, SideInputId};
pub use timestamp::Timestamp;
pub use window::{Window, WindowMapping};
pub use windowed_value::WindowedValue;
