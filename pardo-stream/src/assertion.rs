// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

static GLOBAL_SLOT: LazyLock<AssertionSlot> = LazyLock::new(AssertionSlot::default);

/// Slot holding the last assertion failure raised by user code.
///
/// Assertion failures still fail the element like any other user code error, the slot only
/// makes them inspectable from outside, for example by a test harness running a whole pipeline.
/// Units write into the process-wide [`global`](AssertionSlot::global) slot unless they were
/// given their own.
#[derive(Clone, Debug, Default)]
pub struct AssertionSlot(Arc<Mutex<Option<String>>>);

impl AssertionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide slot.
    pub fn global() -> Self {
        GLOBAL_SLOT.clone()
    }

    pub fn set(&self, message: impl Into<String>) {
        self.lock().replace(message.into());
    }

    /// Last recorded assertion failure, if any.
    pub fn get(&self) -> Option<String> {
        self.lock().clone()
    }

    pub fn take(&self) -> Option<String> {
        self.lock().take()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        // A panic while holding the lock can not leave the slot half-written.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
