//! GPIO / peripheral pin assignments for the smart home lab board (ESP32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Shared outputs
// ---------------------------------------------------------------------------

/// WS2812 data line, four pixels.
pub const RGB_DATA_GPIO: i32 = 26;
pub const RGB_PIXELS: usize = 4;

/// Passive buzzer, LEDC PWM.
pub const BUZZER_GPIO: i32 = 25;

/// Door servo, LEDC PWM at 50 Hz.
pub const DOOR_SERVO_GPIO: i32 = 13;

/// Fan H-bridge inputs (INA / INB), LEDC PWM.
pub const FAN_INA_GPIO: i32 = 19;
pub const FAN_INB_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Dedicated outputs
// ---------------------------------------------------------------------------

/// Window servo, LEDC PWM at 50 Hz.
pub const WINDOW_SERVO_GPIO: i32 = 5;

/// Night lamp (plain LED, active high).
pub const LAMP_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// MQ-2 digital output.  LOW = gas detected (pull-up enabled).
pub const GAS_GPIO: i32 = 23;

/// HC-SR501 PIR.  HIGH = motion.
pub const PIR_GPIO: i32 = 14;

/// Steam / rain sensor analog output on GPIO 34 (ADC1 channel 6).
pub const STEAM_ADC_GPIO: i32 = 34;

/// DHT11 single-wire data line.
pub const DHT11_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Buttons (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// Toggles the gas alarm.
pub const GAS_BUTTON_GPIO: i32 = 16;
/// Toggles motion detection.
pub const MOTION_BUTTON_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// I²C bus (LCD backpack + RFID reader)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_FREQ_HZ: u32 = 100_000;

/// PCF8574 backpack of the 16x2 LCD.
pub const LCD_I2C_ADDR: u8 = 0x27;
/// MFRC522 reader in I²C mode.
pub const RFID_I2C_ADDR: u8 = 0x28;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution for every channel: 10 bits, 0 – 1023.
pub const PWM_RESOLUTION_BITS: u32 = 10;
pub const PWM_MAX_DUTY: u32 = (1 << PWM_RESOLUTION_BITS) - 1;

/// Hobby servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Buzzer tone.
pub const BUZZER_PWM_FREQ_HZ: u32 = 1_000;
/// Fan motor drive.
pub const FAN_PWM_FREQ_HZ: u32 = 10_000;
