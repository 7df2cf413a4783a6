//! Shiftlink - Shifter Firmware
//!
//! Drives the wheel base as I2C bus controller. Single-character commands
//! on USART1 change the gear state; a space sends the current report.
//! Built with the `demo` feature it ignores serial and cycles through every
//! gear once per second.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::i2c::{Error as I2cError, I2c};
use {defmt_rtt as _, panic_probe as _};

use shiftlink_hal_stm32f1::i2c::{I2cBusError, I2cConfig};
use shiftlink_protocol::GearState;

/// 7-bit address of the wheel base
const WHEEL_ADDRESS: u8 = 0x01;

#[cfg(not(feature = "demo"))]
embassy_stm32::bind_interrupts!(struct Irqs {
    USART1 => embassy_stm32::usart::InterruptHandler<embassy_stm32::peripherals::USART1>;
});

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Shiftlink shifter firmware starting...");

    let p = embassy_stm32::init(Default::default());

    let mut i2c = I2c::new_blocking(p.I2C1, p.PB6, p.PB7, I2cConfig::default().to_embassy());
    info!("I2C1 controller up");

    #[cfg(feature = "demo")]
    demo::run(&mut i2c).await;

    #[cfg(not(feature = "demo"))]
    {
        use embassy_stm32::usart::Uart;
        use shiftlink_hal_stm32f1::uart::UartConfig;

        // PA10=RX, PA9=TX
        let uart = unwrap!(Uart::new(
            p.USART1,
            p.PA10,
            p.PA9,
            Irqs,
            p.DMA1_CH4,
            p.DMA1_CH5,
            UartConfig::default().to_embassy(),
        ));
        let (_tx, rx) = uart.split();
        info!("USART1 up");

        console::run(&mut i2c, rx).await;
    }
}

/// Write one encoded report to the wheel base
fn send<B>(bus: &mut B, state: &GearState) -> Result<(), I2cBusError>
where
    B: embedded_hal::i2c::I2c<Error = I2cError>,
{
    bus.write(WHEEL_ADDRESS, &state.encode())
        .map_err(I2cBusError::from)
}

fn send_logged<B>(bus: &mut B, state: &GearState)
where
    B: embedded_hal::i2c::I2c<Error = I2cError>,
{
    match send(bus, state) {
        Ok(()) => info!("{} [OK]", state),
        Err(e) => warn!("{} [FAILED] {:?}", state, e),
    }
}

#[cfg(not(feature = "demo"))]
mod console {
    use defmt::*;
    use embassy_stm32::i2c::Error as I2cError;
    use embassy_stm32::mode::Async;
    use embassy_stm32::usart::UartRx;
    use embassy_time::{Duration, Timer};

    use shiftlink_hal_stm32f1::uart::UartBusError;
    use shiftlink_protocol::{Command, GearState};

    /// Apply serial commands forever
    pub async fn run<B>(bus: &mut B, mut rx: UartRx<'static, Async>)
    where
        B: embedded_hal::i2c::I2c<Error = I2cError>,
    {
        let mut state = GearState::default();
        let mut buf = [0u8; 1];

        loop {
            if let Err(e) = rx.read(&mut buf).await {
                warn!("UART read error: {:?}", UartBusError::from(e));
                Timer::after(Duration::from_millis(10)).await;
                continue;
            }

            let Some(command) = Command::from_byte(buf[0]) else {
                debug!("Ignoring byte {=u8:#04x}", buf[0]);
                continue;
            };

            if state.apply(command) {
                super::send_logged(bus, &state);
            } else {
                info!("{:?} -> {}", command, state);
            }
        }
    }
}

#[cfg(feature = "demo")]
mod demo {
    use defmt::*;
    use embassy_stm32::i2c::Error as I2cError;
    use embassy_time::{Duration, Ticker};

    use shiftlink_protocol::demo_sequence;

    /// Interval between demo steps
    const STEP_INTERVAL_MS: u64 = 1000;

    /// Cycle through the demo sequence forever
    pub async fn run<B>(bus: &mut B) -> !
    where
        B: embedded_hal::i2c::I2c<Error = I2cError>,
    {
        let mut ticker = Ticker::every(Duration::from_millis(STEP_INTERVAL_MS));

        loop {
            for state in demo_sequence() {
                super::send_logged(bus, &state);
                ticker.next().await;
            }
            info!("----------------------");
        }
    }
}
