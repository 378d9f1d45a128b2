#![no_main]
#![no_std]

use defmt_brtt as _; // global logger

use panic_probe as _;

use stm32f4xx_hal as _; // memory layout

use superloop::tick::TickSource;

pub mod hardware;

/// Millisecond counter, written by the SysTick handler only.
pub static TICKS: TickSource = TickSource::new();

defmt::timestamp!("tick {=u32}", TICKS.now().ticks());

// same panicking *behavior* as `panic-probe` but doesn't print a panic message
// this prevents the panic message being printed *twice* when `defmt::panic` is
// invoked
#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}

