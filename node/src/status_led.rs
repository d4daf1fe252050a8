//! Lifecycle status indicators
//!
//! Two plain LEDs on the board edge. Their pattern is set at each
//! lifecycle state entry and is the only diagnostic a technician gets
//! in the field, since the node is asleep (and serial-less) whenever
//! anyone looks at it.

use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_hal::sys::EspError;

pub struct StatusLeds {
    left: PinDriver<'static, AnyOutputPin, Output>,
    right: PinDriver<'static, AnyOutputPin, Output>,
}

impl StatusLeds {
    pub fn new(left: AnyOutputPin, right: AnyOutputPin) -> Result<Self, EspError> {
        Ok(Self {
            left: PinDriver::output(left)?,
            right: PinDriver::output(right)?,
        })
    }

    pub fn set(&mut self, left: bool, right: bool) {
        // GPIO writes on an already-configured output cannot fail
        let _ = self.left.set_level(left.into());
        let _ = self.right.set_level(right.into());
    }

    pub fn off(&mut self) {
        self.set(false, false);
    }
}
