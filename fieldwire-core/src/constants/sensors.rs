//! Device Sentinels, Thresholds and Channel Layouts
//!
//! Values derived from the datasheets of the supported parts and from the
//! field behaviour seen on them.

// ===== DS18B20 (OneWire temperature) =====

/// Value the DS18B20 reports from its scratchpad after power-on reset (°C).
///
/// Reading it means the conversion never ran; it is never a field reading.
pub const DS18B20_POWER_ON_RESET_C: f32 = 85.0;

/// DS18B20 readings at or above this are rejected (°C).
///
/// Safety margin below the power-on reset sentinel.
pub const DS18B20_REJECT_THRESHOLD_C: f32 = 80.0;

/// DS18B20 measuring range (°C).
pub const DS18B20_MIN_C: f32 = -55.0;
/// Upper end of the DS18B20 measuring range (°C).
pub const DS18B20_MAX_C: f32 = 125.0;

/// Temperature precision published by the DS18B20 (decimals).
///
/// Full 12-bit resolution is 0.0625 °C.
pub const DS18B20_PRECISION: u8 = 4;

// ===== SHT3x / SHT4x (I2C temperature + humidity) =====

/// Default I2C address of SHT sensors. D1 mini shields use `0x45`.
pub const SHT_DEFAULT_ADDRESS: u8 = 0x44;

/// SHT temperature range (°C).
pub const SHT_TEMPERATURE_MIN_C: f32 = -40.0;
/// Upper end of the SHT temperature range (°C).
pub const SHT_TEMPERATURE_MAX_C: f32 = 125.0;

/// SHT humidity range (%RH).
pub const SHT_HUMIDITY_MIN_PCT: f32 = 0.0;
/// Upper end of the SHT humidity range (%RH).
pub const SHT_HUMIDITY_MAX_PCT: f32 = 100.0;

/// Precision published for SHT readings (decimals).
pub const SHT_PRECISION: u8 = 1;

// ===== INA219 (I2C current / voltage monitor) =====

/// Bus voltage range of the INA219 in its 32 V configuration (V).
pub const INA219_VOLTAGE_MIN_V: f32 = 0.0;
/// Upper end of the INA219 bus voltage range (V).
pub const INA219_VOLTAGE_MAX_V: f32 = 32.0;
/// Precision of the INA219 voltage channel (decimals).
pub const INA219_VOLTAGE_PRECISION: u8 = 2;

/// Current range of the INA219 with the default shunt (mA).
pub const INA219_CURRENT_MIN_MA: f32 = -3200.0;
/// Upper end of the INA219 current range (mA).
pub const INA219_CURRENT_MAX_MA: f32 = 3200.0;
/// Precision of the INA219 current channel (decimals).
pub const INA219_CURRENT_PRECISION: u8 = 1;

/// Single-cell LiPo voltage mapped to 0% (V).
pub const LIPO_MIN_VOLTAGE_V: f32 = 3.0;

/// Single-cell LiPo voltage mapped to 100% (V).
pub const LIPO_MAX_VOLTAGE_V: f32 = 4.2;

// ===== Resistor divider battery monitor =====

/// Ratio of the usual 100k/100k divider in front of an ADC pin.
pub const BATTERY_DIVIDER_RATIO: f32 = 2.0;

/// Battery voltage range published by a divider monitor (V).
pub const BATTERY_VOLTAGE_MIN_V: f32 = 0.0;
/// Upper end of the divider monitor voltage range (V).
pub const BATTERY_VOLTAGE_MAX_V: f32 = 32.0;

/// Precision of the divider monitor voltage channel (decimals).
pub const BATTERY_VOLTAGE_PRECISION: u8 = 2;

// ===== Derived percentages =====

/// Bounds of every percentage channel.
pub const PERCENT_MIN: f32 = 0.0;
/// Upper bound of every percentage channel.
pub const PERCENT_MAX: f32 = 100.0;

// ===== Analog soil probe =====

/// 12-bit ADC reading of a dry probe (0% moisture).
pub const SOIL_DRY_RAW: f32 = 4095.0;

/// Scale from raw ADC counts to % moisture (wet probe reads 0).
pub const SOIL_SCALE: f32 = -100.0 / 4095.0;
