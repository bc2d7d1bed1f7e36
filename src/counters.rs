//! Definition of counters, used for transaction labels.

/// Largest transaction label, the field is 4 bits wide.
pub const MAX_TRANSACTION_LABEL: u8 = 0x0F;

/// A rolling counter that wraps to zero after its maximum value.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Counter {
    value: u8,
    max_value: u8,
}

impl Counter {
    /// Create a transaction label counter, starting at zero.
    pub fn new_transaction_label() -> Self {
        Self {
            value: 0,
            max_value: MAX_TRANSACTION_LABEL,
        }
    }

    /// Set the counter, wrapping values above the maximum.
    fn set(&mut self, value: u8) {
        self.value = value % (self.max_value + 1);
    }

    /// Return the current value and advance the counter.
    pub fn next(&mut self) -> u8 {
        let value = self.value;
        self.set(value.wrapping_add(1));
        value
    }
}
