//! One-shot hardware peripheral initialization.
//!
//! Configures the steam ADC channel, GPIO directions and the LEDC
//! timers/channels using raw ESP-IDF sys calls. Called once from `main()`
//! before the scheduler loop starts.
//!
//! Host builds keep pin levels and PWM duties in atomics so the drivers
//! above this layer can be exercised without hardware.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        crate::error::Error::Init("peripheral init")
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
        init_gpio_outputs()?;
        init_ledc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

/// GPIO 34 on the classic ESP32.
pub const ADC1_CH_STEAM: u32 = 6;

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 11 dB attenuation, 10-bit: the moisture threshold is calibrated in
    // 0 – 1023 counts.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_10,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ADC1_CH_STEAM, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 configured (CH6=steam)");
    Ok(())
}

/// One-shot ADC1 conversion, `None` on driver error.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Option<u16> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return None;
    }
    Some(raw.max(0) as u16)
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> Option<u16> {
    Some(sim::ADC.load(core::sync::atomic::Ordering::Relaxed) as u16)
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    // (pin, pull-up, interrupt)
    let inputs = [
        (pins::GAS_GPIO, true, gpio_int_type_t_GPIO_INTR_DISABLE),
        (pins::PIR_GPIO, false, gpio_int_type_t_GPIO_INTR_DISABLE),
        (pins::GAS_BUTTON_GPIO, true, gpio_int_type_t_GPIO_INTR_NEGEDGE),
        (pins::MOTION_BUTTON_GPIO, true, gpio_int_type_t_GPIO_INTR_NEGEDGE),
    ];

    for &(pin, pull_up, intr_type) in &inputs {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: if pull_up {
                gpio_pullup_t_GPIO_PULLUP_ENABLE
            } else {
                gpio_pullup_t_GPIO_PULLUP_DISABLE
            },
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
    }

    info!("hw_init: GPIO inputs configured (gas, pir, buttons)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::level(pin)
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::LAMP_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    unsafe { gpio_set_level(pins::LAMP_GPIO, 0) };

    info!("hw_init: GPIO outputs configured (lamp)");
    Ok(())
}

/// Drive an output pin.  Returns `false` if the driver rejected the write.
#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> bool {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    // Main-loop only.
    (unsafe { gpio_set_level(pin, u32::from(high)) }) == ESP_OK as i32
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) -> bool {
    sim::set_level(pin, high);
    true
}

// ── LEDC PWM ─────────────────────────────────────────────────

pub const LEDC_CH_DOOR: u32 = 0;
pub const LEDC_CH_WINDOW: u32 = 1;
pub const LEDC_CH_BUZZER: u32 = 2;
pub const LEDC_CH_FAN_A: u32 = 3;
pub const LEDC_CH_FAN_B: u32 = 4;
pub const LEDC_CHANNELS: usize = 5;

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: servos (50 Hz), timer 1: buzzer (1 kHz), timer 2: fan (10 kHz).
    let timers = [
        (ledc_timer_t_LEDC_TIMER_0, pins::SERVO_PWM_FREQ_HZ),
        (ledc_timer_t_LEDC_TIMER_1, pins::BUZZER_PWM_FREQ_HZ),
        (ledc_timer_t_LEDC_TIMER_2, pins::FAN_PWM_FREQ_HZ),
    ];
    for &(timer_num, freq_hz) in &timers {
        let cfg = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num,
            duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
            freq_hz,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        // SAFETY: Called from single main-task context via init_peripherals().
        let ret = unsafe { ledc_timer_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcInitFailed(ret));
        }
    }

    let channels = [
        (LEDC_CH_DOOR, ledc_timer_t_LEDC_TIMER_0, pins::DOOR_SERVO_GPIO),
        (LEDC_CH_WINDOW, ledc_timer_t_LEDC_TIMER_0, pins::WINDOW_SERVO_GPIO),
        (LEDC_CH_BUZZER, ledc_timer_t_LEDC_TIMER_1, pins::BUZZER_GPIO),
        (LEDC_CH_FAN_A, ledc_timer_t_LEDC_TIMER_2, pins::FAN_INA_GPIO),
        (LEDC_CH_FAN_B, ledc_timer_t_LEDC_TIMER_2, pins::FAN_INB_GPIO),
    ];
    for &(channel, timer_sel, gpio_num) in &channels {
        let ret = unsafe {
            ledc_channel_config(&ledc_channel_config_t {
                speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
                channel,
                timer_sel,
                gpio_num,
                duty: 0,
                hpoint: 0,
                ..Default::default()
            })
        };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::LedcInitFailed(ret));
        }
    }

    info!("hw_init: LEDC configured (door=CH0, window=CH1, buzzer=CH2, fan=CH3-4)");
    Ok(())
}

/// Set a channel's duty (0 – [`pins::PWM_MAX_DUTY`](crate::pins::PWM_MAX_DUTY)).
/// Returns `false` if the driver rejected the write.
#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u32) -> bool {
    // SAFETY: LEDC channels were configured in init_ledc(); only the main
    // loop writes duty registers.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty) == ESP_OK as i32
            && ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel) == ESP_OK as i32
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(channel: u32, duty: u32) -> bool {
    sim::set_duty(channel, duty)
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::drivers::button::{button_isr_handler, ButtonId};

#[cfg(target_os = "espidf")]
fn isr_now_ms() -> u32 {
    // SAFETY: esp_timer_get_time is an RTC counter read; safe in ISR context.
    (unsafe { esp_timer_get_time() } / 1_000) as u32
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn gas_button_isr(_arg: *mut core::ffi::c_void) {
    button_isr_handler(ButtonId::GasAlarm, isr_now_ms());
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn motion_button_isr(_arg: *mut core::ffi::c_void) {
    button_isr_handler(ButtonId::Motion, isr_now_ms());
}

/// Install the per-pin GPIO ISR service and register the button handlers.
/// Call after init_peripherals() and before the loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service is already installed.
    // Handlers only touch lock-free atomics.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        gpio_isr_handler_add(pins::GAS_BUTTON_GPIO, Some(gas_button_isr), core::ptr::null_mut());
        gpio_intr_enable(pins::GAS_BUTTON_GPIO);

        gpio_isr_handler_add(pins::MOTION_BUTTON_GPIO, Some(motion_button_isr), core::ptr::null_mut());
        gpio_intr_enable(pins::MOTION_BUTTON_GPIO);
    }
    info!("hw_init: ISR service installed (gas button, motion button)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

// ── Host simulation ──────────────────────────────────────────

/// In-memory pin state for host builds.
///
/// Inputs idle HIGH (pull-ups), matching the active-low wiring of the gas
/// sensor and buttons.
#[cfg(not(target_os = "espidf"))]
pub mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use super::LEDC_CHANNELS;

    const PINS: usize = 40;

    #[allow(clippy::declare_interior_mutable_const)]
    const HIGH: AtomicBool = AtomicBool::new(true);
    #[allow(clippy::declare_interior_mutable_const)]
    const ZERO: AtomicU32 = AtomicU32::new(0);

    static LEVELS: [AtomicBool; PINS] = [HIGH; PINS];
    static DUTIES: [AtomicU32; LEDC_CHANNELS] = [ZERO; LEDC_CHANNELS];
    pub(super) static ADC: AtomicU32 = AtomicU32::new(0);

    pub fn level(pin: i32) -> bool {
        usize::try_from(pin)
            .ok()
            .and_then(|i| LEVELS.get(i))
            .is_some_and(|l| l.load(Ordering::Relaxed))
    }

    pub fn set_level(pin: i32, high: bool) {
        if let Some(l) = usize::try_from(pin).ok().and_then(|i| LEVELS.get(i)) {
            l.store(high, Ordering::Relaxed);
        }
    }

    pub fn duty(channel: u32) -> u32 {
        DUTIES
            .get(channel as usize)
            .map_or(0, |d| d.load(Ordering::Relaxed))
    }

    pub(super) fn set_duty(channel: u32, duty: u32) -> bool {
        match DUTIES.get(channel as usize) {
            Some(d) => {
                d.store(duty, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    pub fn set_adc(raw: u16) {
        ADC.store(u32::from(raw), Ordering::Relaxed);
    }
}
