#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::{error, info};
use defmt_rtt as _;
use embassy_embedded_hal::shared_bus::blocking::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_futures::yield_now;
use embassy_rp::adc::{self, Adc};
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{self, Spi};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Delay;
use nrf24_radio::{Nrf24, MAX_SPI_FREQUENCY_HZ};
use rc_transmitter::{
    service_interrupts, AdcInputs, DualRateScheduler, EmbassyClock, Lcd, LinkController,
    SharedLink, Transmitter, PROFILE,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

/// Tell the boot ROM this is a secure Arm executable.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

type RadioBus = Mutex<CriticalSectionRawMutex, RefCell<Spi<'static, SPI0, spi::Blocking>>>;
type Radio = Nrf24<
    SpiDevice<'static, CriticalSectionRawMutex, Spi<'static, SPI0, spi::Blocking>, Output<'static>>,
    Output<'static>,
    Delay,
>;

/// SPI bus owned by the radio.
static RADIO_BUS: StaticCell<RadioBus> = StaticCell::new();

/// Link state shared by the main loop and the IRQ task.
static LINK: StaticCell<SharedLink<Radio>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("RC transmitter starting...");

    if let Err(e) = PROFILE.validate() {
        error!("Invalid transmitter profile: {}", e);
        loop {
            cortex_m::asm::wfi();
        }
    }

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Radio Setup ---
    let mut spi_config = spi::Config::default();
    spi_config.frequency = MAX_SPI_FREQUENCY_HZ / 2;

    let spi = Spi::new_blocking(
        p.SPI0,
        p.PIN_18, // SCK
        p.PIN_19, // MOSI
        p.PIN_16, // MISO
        spi_config,
    );
    let bus = RADIO_BUS.init(Mutex::new(RefCell::new(spi)));
    let csn = Output::new(p.PIN_17, Level::High);
    let ce = Output::new(p.PIN_20, Level::Low);
    let irq = Input::new(p.PIN_21, Pull::Up);

    let radio = Nrf24::new(SpiDevice::new(bus, csn), ce, Delay);
    let mut controller = LinkController::new(radio, PROFILE.link);
    match controller.configure() {
        Ok(()) => info!(
            "Radio configured: {} MHz, {} byte packets",
            PROFILE.link.rf_frequency_mhz, PROFILE.link.transfer_size
        ),
        Err(e) => error!("Radio configuration failed: {:?}", defmt::Debug2Format(&e)),
    }
    let link: &'static SharedLink<Radio> = LINK.init(SharedLink::new(controller));

    // --- Inputs Setup ---
    let adc = Adc::new_blocking(p.ADC, adc::Config::default());
    let sticks = [
        adc::Channel::new_pin(p.PIN_40, Pull::None), // Throttle
        adc::Channel::new_pin(p.PIN_41, Pull::None), // Roll
        adc::Channel::new_pin(p.PIN_42, Pull::None), // Pitch
        adc::Channel::new_pin(p.PIN_43, Pull::None), // Yaw
    ];
    let battery = adc::Channel::new_pin(p.PIN_44, Pull::None);
    let switch1 = Input::new(p.PIN_2, Pull::Down);
    let switch2 = Input::new(p.PIN_3, Pull::Down);
    let inputs = AdcInputs::new(adc, sticks, battery, switch1, switch2);

    // --- Display Setup ---
    let i2c = I2c::new_blocking(
        p.I2C0,
        p.PIN_5, // SCL
        p.PIN_4, // SDA
        i2c::Config::default(),
    );
    let mut lcd = Lcd::new(i2c, Delay);
    if let Err(e) = lcd.init() {
        error!("Display init failed: {:?}", e);
    }

    // Spawn tasks (spawn the SpawnToken, then unwrap the result)
    spawner.spawn(radio_irq_task(irq, link)).unwrap();

    let mut transmitter = Transmitter::new(PROFILE, inputs, link, lcd);
    if let Err(e) = transmitter.draw_start_screen() {
        error!("Start screen failed: {:?}", e);
    }

    info!("RC transmitter initialized, entering control loop...");

    let mut scheduler = DualRateScheduler::with_periods(
        EmbassyClock,
        PROFILE.control_period_us,
        PROFILE.display_period_us,
    );
    loop {
        scheduler.poll(&mut transmitter);
        // Let the IRQ task run between polls
        yield_now().await;
    }
}

/// Radio IRQ task - services the IRQ line while it is held low.
#[embassy_executor::task]
async fn radio_irq_task(mut irq: Input<'static>, link: &'static SharedLink<Radio>) {
    service_interrupts(&mut irq, link).await
}
