//! NVIC lines
//!
//! [`NvicLine`] drives one typelevel interrupt. Building one requires the
//! `bind_interrupts!` proof that a handler is installed, so enabling the
//! line can never dispatch into the default handler.

use core::marker::PhantomData;

use embassy_stm32::interrupt::typelevel::{Binding, Handler, Interrupt};
use embassy_stm32::interrupt::Priority;
use shiftlink_hal::InterruptLine;

/// One interrupt line with a bound handler
pub struct NvicLine<I: Interrupt> {
    _irq: PhantomData<I>,
}

impl<I: Interrupt> NvicLine<I> {
    pub fn new<H: Handler<I>>(_irqs: impl Binding<I, H>) -> Self {
        Self { _irq: PhantomData }
    }
}

impl<I: Interrupt> InterruptLine for NvicLine<I> {
    /// Raw NVIC priority; the F1 implements the upper four bits only
    fn set_priority(&mut self, priority: u8) {
        I::set_priority(Priority::from(priority));
    }

    fn enable(&mut self) {
        I::unpend();
        // SAFETY: construction proved a handler is bound to this line
        unsafe { I::enable() };
    }

    fn disable(&mut self) {
        I::disable();
    }
}
