//! Interrupt line abstraction
//!
//! Lets the driver install itself on an NVIC line without knowing which
//! interrupt controller or vector table the platform uses.

/// A single interrupt line of the platform's interrupt controller
pub trait InterruptLine {
    /// Set the raw priority of this line
    ///
    /// Lower numeric values are higher priority. `0x00` is the highest
    /// priority, `0xFF` the lowest. Implementations drop the bits their
    /// controller does not implement.
    fn set_priority(&mut self, priority: u8);

    /// Clear any pending request and unmask the line
    fn enable(&mut self);

    /// Mask the line
    fn disable(&mut self);
}
