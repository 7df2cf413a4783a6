//! Shiftlink - Wheel-base Firmware
//!
//! Runs on an STM32F103 and answers the shifter as an I2C bus target.
//! Every gear report the shifter writes is buffered by the event interrupt;
//! the main loop drains complete reports and logs the decoded gear.

#![no_std]
#![no_main]

mod channels;
mod target;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_stm32::bind_interrupts;
use embassy_stm32::i2c::I2c;
use embassy_stm32::interrupt::typelevel::{I2C1_ER, I2C1_EV};
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use shiftlink_drivers::i2c_target::{I2cTarget, RxBuffer, TargetConfig, TargetStats};
use shiftlink_hal_stm32f1::{I2cRegisters, NvicLine};
use shiftlink_protocol::{GearState, REPORT_LEN};

use crate::channels::{BUS_FAULT, TRANSFER_FAULT};
use crate::target::{ErrorHandler, EventHandler, RX_BUFFER_SIZE, TARGET};

bind_interrupts!(struct Irqs {
    I2C1_EV => EventHandler;
    I2C1_ER => ErrorHandler;
});

/// 7-bit address the shifter writes to
const WHEEL_ADDRESS: u8 = 0x01;

/// NVIC priority for both I2C lines (0 = highest)
const IRQ_PRIORITY: u8 = 0x00;

/// Main loop poll interval
const POLL_INTERVAL_MS: u64 = 100;

// Receive buffer shared by the interrupt and the main loop (must live forever)
static RX_BUFFER: StaticCell<RxBuffer<RX_BUFFER_SIZE>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Shiftlink wheel firmware starting...");

    let p = embassy_stm32::init(Default::default());

    // Clocks, PB6/PB7 alternate function, bus timing and PE. The embassy
    // driver must stay alive; the target takes over at register level.
    let _bus = I2c::new_blocking(p.I2C1, p.PB6, p.PB7, Default::default());
    info!("I2C1 up");

    let config = TargetConfig {
        address: WHEEL_ADDRESS,
        ..TargetConfig::default()
    };
    let buffer = RX_BUFFER.init(RxBuffer::new());
    let (target, mut reader) = unwrap!(I2cTarget::configure(
        I2cRegisters::i2c1(),
        &config,
        buffer
    ));
    info!(
        "I2C1 target at {=u8:#04x}, {} byte buffer",
        target.effective_address(),
        reader.capacity()
    );

    let mut event_line = NvicLine::<I2C1_EV>::new(Irqs);
    let mut error_line = NvicLine::<I2C1_ER>::new(Irqs);

    // Install before enabling so the first interrupt finds the target
    TARGET.lock(|cell| {
        let mut slot = cell.borrow_mut();
        let target = slot.insert(target);
        target.install_interrupt(&mut event_line, IRQ_PRIORITY);
        target.install_error_interrupt(&mut error_line, IRQ_PRIORITY);
    });
    info!("I2C1 interrupts up");

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    let mut frame = [0u8; REPORT_LEN];
    let mut last_stats = TargetStats::default();

    loop {
        // A failed response is logged right away, everything else on the tick
        if let Either::Second(fault) = select(ticker.next(), TRANSFER_FAULT.wait()).await {
            warn!("Response transfer failed: {:?}", fault.error);
            debug!("{}", fault.status);
            continue;
        }

        if reader.buffered() >= REPORT_LEN {
            let n = reader.read(&mut frame);
            match GearState::decode(&frame[..n]) {
                Ok(state) => info!("Type: {}", state),
                Err(e) => warn!("Bad gear report: {:?}", e),
            }
        }

        if let Some(report) = BUS_FAULT.try_take() {
            warn!("Bus error interrupt: {:?}", report);
        }

        if let Some(stats) = target::stats() {
            if stats != last_stats {
                trace!("{}", stats);
                if stats.bytes_dropped != last_stats.bytes_dropped {
                    warn!("Receive buffer overflow, {} bytes dropped", stats.bytes_dropped);
                }
                last_stats = stats;
            }
        }
    }
}
