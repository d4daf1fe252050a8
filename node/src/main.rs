//! Tanklevel sensor node firmware
//!
//! Each invocation of `main` is one wake cycle: bring up peripherals,
//! run the measurement-and-transmission cycle from the telemetry
//! crate, persist the sequence counter, and drop into deep sleep.
//! There is no loop here on purpose; the "loop" is the RTC timer
//! waking us again.

mod battery;
mod config;
mod platform;
mod radio;
mod seq_store;
mod sleep;
mod sonar;
mod status_led;
mod temperature;

use esp_idf_hal::gpio::{AnyOutputPin, IOPin, OutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use esp_idf_hal::uart::{config::Config as UartConfig, UartDriver};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::info;
use telemetry::{run_cycle, sequence, DistanceReader};

use battery::BatteryMonitor;
use config::NodeConfig;
use platform::EspPlatform;
use radio::LoraRadio;
use seq_store::SequenceStore;
use sonar::SonarLine;
use status_led::StatusLeds;
use temperature::TemperatureSensor;

fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = NodeConfig::from_env();
    info!("=== tanklevel sensor node ===");

    let peripherals = Peripherals::take().expect("peripherals already taken");
    let nvs = EspDefaultNvsPartition::take().ok();

    // Sequence continuity across sleep cycles. The slot is only read
    // when our own alarm woke us; a cold boot seeds fresh without
    // touching flash.
    let mut store = SequenceStore::new(nvs);
    let woke_by_alarm = sleep::woke_by_alarm();
    let stored = if woke_by_alarm { store.load() } else { None };
    let sequence_start = sequence::initial(
        stored,
        woke_by_alarm,
        sleep::random_byte(),
        config.cycle.packets_per_cycle,
    );
    info!(
        "wake: {}, sequence {}",
        if woke_by_alarm { "timer alarm" } else { "cold boot" },
        sequence_start
    );

    let pins = peripherals.pins;

    // Relay controlling power to all attached sensors
    let rail = PinDriver::output(pins.gpio10.downgrade_output()).expect("relay pin");

    let leds = StatusLeds::new(
        pins.gpio4.downgrade_output(),
        pins.gpio5.downgrade_output(),
    )
    .expect("status LED pins");

    let battery = BatteryMonitor::new(peripherals.adc1, pins.gpio2, config.battery.divider_scale)
        .expect("battery ADC");

    let temperature = TemperatureSensor::new(pins.gpio3.downgrade());

    // ME007YS talks one-way at 9600 baud; TX is wired to nothing
    let uart = UartDriver::new(
        peripherals.uart1,
        pins.gpio0,
        pins.gpio1,
        Option::<esp_idf_hal::gpio::AnyIOPin>::None,
        Option::<esp_idf_hal::gpio::AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(9_600)),
    )
    .expect("sonar UART");

    // RFM95 on SPI2, CS and reset driven by the radio driver itself
    let spi_driver = SpiDriver::new(
        peripherals.spi2,
        pins.gpio6,
        pins.gpio7,
        Some(pins.gpio8),
        &SpiDriverConfig::new(),
    )
    .expect("SPI bus");
    let spi = SpiDeviceDriver::new(
        spi_driver,
        Option::<AnyOutputPin>::None,
        &SpiConfig::new().baudrate(Hertz(2_000_000)),
    )
    .expect("SPI device");
    let cs = PinDriver::output(pins.gpio9.downgrade_output()).expect("radio CS pin");
    let reset = PinDriver::output(pins.gpio18.downgrade_output()).expect("radio reset pin");
    let radio = LoraRadio::new(spi, cs, reset, &config.radio).expect("RFM95 radio");

    let mut node = EspPlatform::new(
        rail,
        leds,
        battery,
        temperature,
        SonarLine::new(uart),
        DistanceReader::new(config.sampling),
        radio,
    );

    let plan = run_cycle(&mut node, sequence_start, &config.cycle);

    // SLEEP transition: persist the counter (not on the early
    // temperature-failure exit), kill the rail and indicators, arm
    // the alarm, power down. This does not return.
    if plan.bump_by > 0 {
        store.store(sequence::advance(sequence_start, plan.bump_by));
    }
    node.shutdown();
    info!(
        "Sleeping {} seconds ({:?})",
        config.sleep_interval.as_secs(),
        plan.outcome
    );
    sleep::deep_sleep(config.sleep_interval)
}
