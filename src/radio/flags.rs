//! Interrupt completion flags
//!
//! Each flag has exactly one writer context (the interrupt handler,
//! which only ever raises it) and one reader context (the control loop,
//! which checks-and-clears). Multiple raises before one clear are
//! equivalent to one, so no completion is lost or duplicated and no
//! lock is needed.

use core::sync::atomic::{AtomicBool, Ordering};

/// Single-bit completion signal settable from interrupt context.
pub struct IrqFlag(AtomicBool);

impl IrqFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Mark the operation complete. The only method interrupt handlers
    /// may call; it performs no I/O and touches no other state.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Check-and-clear from the control loop. Returns whether the flag
    /// was raised since the last take.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// Peek without clearing.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for IrqFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// The radio controller's pair of completion flags. Lives in a `static`
/// so the driver's interrupt registration can hold it for the lifetime
/// of the process.
pub struct IrqFlags {
    pub transmitted: IrqFlag,
    pub received: IrqFlag,
}

impl IrqFlags {
    pub const fn new() -> Self {
        Self {
            transmitted: IrqFlag::new(),
            received: IrqFlag::new(),
        }
    }
}

impl Default for IrqFlags {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears() {
        let flag = IrqFlag::new();
        assert!(!flag.take());

        flag.raise();
        assert!(flag.is_raised());
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn repeated_raises_level_to_one() {
        let flag = IrqFlag::new();
        flag.raise();
        flag.raise();
        flag.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }
}
