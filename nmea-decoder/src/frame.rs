//! Binary frame decoder
//!
//! Decodes one bus frame (PGN + source address + payload bytes) into a typed
//! frame variant using per-PGN field layouts. All multi-byte fields are
//! little-endian. A payload shorter than a field's extent yields no data for
//! that field rather than reading out of bounds; the bus convention of
//! all-ones "not available" sentinels (0xFF, 0xFFFF, 0x7FFF for signed, ...)
//! also yields no data. A frame that produces no usable field at all is a
//! decode error and is dropped by the caller.

use crate::types::{BinaryFrame, DecodeError, Result};
use byteorder::{ByteOrder, LittleEndian};

/// Layout of one field within a frame payload
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// First bit of the field, counted little-endian from payload byte 0
    pub start_bit: usize,
    /// Width in bits
    pub bits: usize,
    /// Two's-complement signed
    pub signed: bool,
    /// Multiplier from raw count to physical value
    pub scale: f64,
}

impl FieldSpec {
    pub const fn new(start_bit: usize, bits: usize, signed: bool, scale: f64) -> Self {
        Self {
            start_bit,
            bits,
            signed,
            scale,
        }
    }

    /// Raw field bits, or None if the payload is too short
    pub fn raw(&self, payload: &[u8]) -> Option<u64> {
        let end = self.start_bit + self.bits;
        if end > payload.len() * 8 {
            return None;
        }
        // Whole-byte aligned fields take the fast path
        let raw = if self.start_bit % 8 == 0 && self.bits % 8 == 0 {
            let offset = self.start_bit / 8;
            let b = &payload[offset..offset + self.bits / 8];
            match self.bits {
                8 => b[0] as u64,
                16 => LittleEndian::read_u16(b) as u64,
                24 => LittleEndian::read_u24(b) as u64,
                32 => LittleEndian::read_u32(b) as u64,
                64 => LittleEndian::read_u64(b),
                _ => LittleEndian::read_uint(b, self.bits / 8),
            }
        } else {
            extract_bits(payload, self.start_bit, self.bits)
        };
        Some(raw)
    }

    /// Physical value: raw bits, sign extension, scale; None when the payload
    /// is short or the field carries the "not available" sentinel
    pub fn value(&self, payload: &[u8]) -> Option<f64> {
        let raw = self.raw(payload)?;
        if raw == self.not_available() {
            return None;
        }
        let counted = if self.signed {
            sign_extend(raw, self.bits) as f64
        } else {
            raw as f64
        };
        Some(counted * self.scale)
    }

    /// The reserved sentinel meaning "no reading available"
    fn not_available(&self) -> u64 {
        if self.bits >= 64 {
            if self.signed {
                i64::MAX as u64
            } else {
                u64::MAX
            }
        } else if self.signed {
            (1u64 << (self.bits - 1)) - 1
        } else {
            (1u64 << self.bits) - 1
        }
    }
}

/// Extract an arbitrary little-endian bit field
fn extract_bits(payload: &[u8], start_bit: usize, bits: usize) -> u64 {
    let mut result: u64 = 0;
    for i in 0..bits {
        let bit_pos = start_bit + i;
        let byte_idx = bit_pos / 8;
        let bit_in_byte = bit_pos % 8;
        let bit_value = (payload[byte_idx] >> bit_in_byte) & 0x01;
        result |= (bit_value as u64) << i;
    }
    result
}

/// Sign-extend a value from N bits to 64 bits
fn sign_extend(value: u64, bits: usize) -> i64 {
    if bits >= 64 {
        return value as i64;
    }
    let sign_bit = 1u64 << (bits - 1);
    if (value & sign_bit) != 0 {
        (value | (!0u64 << bits)) as i64
    } else {
        value as i64
    }
}

/// Read a variable-length string field (length byte including the two header
/// bytes, encoding byte, then characters)
fn read_string(payload: &[u8], offset: usize) -> Option<String> {
    let len = *payload.get(offset)? as usize;
    if len < 2 || offset + len > payload.len() {
        return None;
    }
    let body = &payload[offset + 2..offset + len];
    let text: String = body
        .iter()
        .take_while(|&&b| b != 0x00 && b != 0xFF)
        .map(|&b| b as char)
        .collect();
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Heading reference encoded in heading frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingReference {
    True,
    Magnetic,
}

/// Wind reference encoded in wind frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindReference {
    /// Ground referenced, angle is a direction from true north
    TrueNorth,
    /// Ground referenced, angle is a direction from magnetic north
    MagneticNorth,
    /// Relative to the vessel bow
    Apparent,
    /// Water referenced, relative to the vessel bow
    TrueBoat,
}

/// A binary frame after field-layout decoding
///
/// Values are in the wire's native units (radians, m/s, Kelvin, ...); unit
/// normalization to base units happens in the mapper.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFrame {
    Rudder {
        instance: u8,
        angle_rad: Option<f64>,
    },
    Heading {
        reference: HeadingReference,
        heading_rad: Option<f64>,
        deviation_rad: Option<f64>,
        variation_rad: Option<f64>,
    },
    EngineRapid {
        instance: u8,
        rpm: Option<f64>,
        boost_pa: Option<f64>,
        tilt_percent: Option<f64>,
    },
    EngineDynamic {
        instance: u8,
        oil_pressure_pa: Option<f64>,
        oil_temperature_k: Option<f64>,
        coolant_temperature_k: Option<f64>,
        alternator_voltage: Option<f64>,
        fuel_rate_lph: Option<f64>,
        hours_s: Option<f64>,
    },
    FluidLevel {
        instance: u8,
        fluid_type: u8,
        level_percent: Option<f64>,
        capacity_l: Option<f64>,
    },
    BatteryStatus {
        instance: u8,
        voltage: Option<f64>,
        current_a: Option<f64>,
        temperature_k: Option<f64>,
    },
    Speed {
        water_ms: Option<f64>,
        ground_ms: Option<f64>,
    },
    WaterDepth {
        depth_m: Option<f64>,
        offset_m: Option<f64>,
    },
    PositionRapid {
        latitude_deg: Option<f64>,
        longitude_deg: Option<f64>,
    },
    CogSog {
        cog_rad: Option<f64>,
        sog_ms: Option<f64>,
    },
    GnssPosition {
        latitude_deg: Option<f64>,
        longitude_deg: Option<f64>,
        altitude_m: Option<f64>,
        satellites: Option<u8>,
    },
    CrossTrackError {
        xte_m: Option<f64>,
    },
    NavigationData {
        distance_m: Option<f64>,
        bearing_rad: Option<f64>,
        waypoint_number: Option<u32>,
    },
    RouteWaypoint {
        route_id: Option<u32>,
        route_name: Option<String>,
    },
    Wind {
        reference: Option<WindReference>,
        speed_ms: Option<f64>,
        angle_rad: Option<f64>,
    },
    Environment {
        water_temperature_k: Option<f64>,
        air_temperature_k: Option<f64>,
        pressure_pa: Option<f64>,
    },
    Temperature {
        instance: u8,
        source: u8,
        actual_k: Option<f64>,
        set_k: Option<f64>,
    },
}

/// Frame decoder - applies the per-PGN layout catalog
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decode one frame into a typed variant
    pub fn decode(frame: &BinaryFrame) -> Result<DecodedFrame> {
        let p = frame.payload.as_slice();
        match frame.pgn {
            127245 => decode_rudder(frame, p),
            127250 => decode_heading(frame, p),
            127488 => decode_engine_rapid(frame, p),
            127489 => decode_engine_dynamic(frame, p),
            127505 => decode_fluid_level(frame, p),
            127508 => decode_battery_status(frame, p),
            128259 => decode_speed(frame, p),
            128267 => decode_water_depth(frame, p),
            129025 => decode_position_rapid(frame, p),
            129026 => decode_cog_sog(frame, p),
            129029 => decode_gnss_position(frame, p),
            129283 => decode_xte(frame, p),
            129284 => decode_navigation_data(frame, p),
            129285 => decode_route_waypoint(frame, p),
            130306 => decode_wind(frame, p),
            130310 => decode_environment(frame, p),
            130312 => decode_temperature(frame, p),
            other => Err(DecodeError::UnsupportedPgn(other)),
        }
    }
}

fn no_data(frame: &BinaryFrame) -> DecodeError {
    if frame.payload.len() < 4 {
        DecodeError::ShortPayload {
            pgn: frame.pgn,
            got: frame.payload.len(),
        }
    } else {
        DecodeError::NoUsableFields(format!("PGN {}", frame.pgn))
    }
}

/// Device instance from a payload field, falling back to the bus source
/// address when the field is absent or reads "not available". Engine and
/// battery controllers routinely leave the field unset because their bus
/// address is the device identity.
fn instance_or_source(spec: FieldSpec, frame: &BinaryFrame) -> u8 {
    match spec.raw(&frame.payload) {
        Some(raw) if raw != spec.not_available() => raw as u8,
        _ => frame.source,
    }
}

fn decode_rudder(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const INSTANCE: FieldSpec = FieldSpec::new(0, 8, false, 1.0);
    const POSITION: FieldSpec = FieldSpec::new(32, 16, true, 1e-4);
    let angle_rad = POSITION.value(p);
    if angle_rad.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::Rudder {
        instance: INSTANCE.raw(p).filter(|&v| v != 0xFF).unwrap_or(0) as u8,
        angle_rad,
    })
}

fn decode_heading(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const HEADING: FieldSpec = FieldSpec::new(8, 16, false, 1e-4);
    const DEVIATION: FieldSpec = FieldSpec::new(24, 16, true, 1e-4);
    const VARIATION: FieldSpec = FieldSpec::new(40, 16, true, 1e-4);
    const REFERENCE: FieldSpec = FieldSpec::new(56, 2, false, 1.0);
    let heading_rad = HEADING.value(p);
    if heading_rad.is_none() {
        return Err(no_data(frame));
    }
    let reference = match REFERENCE.raw(p) {
        Some(1) => HeadingReference::Magnetic,
        Some(0) => HeadingReference::True,
        // Most compasses report magnetic; absent reference reads magnetic
        _ => HeadingReference::Magnetic,
    };
    Ok(DecodedFrame::Heading {
        reference,
        heading_rad,
        deviation_rad: DEVIATION.value(p),
        variation_rad: VARIATION.value(p),
    })
}

fn decode_engine_rapid(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const INSTANCE: FieldSpec = FieldSpec::new(0, 8, false, 1.0);
    const RPM: FieldSpec = FieldSpec::new(8, 16, false, 0.25);
    const BOOST: FieldSpec = FieldSpec::new(24, 16, false, 100.0);
    const TILT: FieldSpec = FieldSpec::new(40, 8, true, 1.0);
    let rpm = RPM.value(p);
    let boost_pa = BOOST.value(p);
    let tilt_percent = TILT.value(p);
    if rpm.is_none() && boost_pa.is_none() && tilt_percent.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::EngineRapid {
        instance: instance_or_source(INSTANCE, frame),
        rpm,
        boost_pa,
        tilt_percent,
    })
}

fn decode_engine_dynamic(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const INSTANCE: FieldSpec = FieldSpec::new(0, 8, false, 1.0);
    const OIL_PRESSURE: FieldSpec = FieldSpec::new(8, 16, false, 100.0);
    const OIL_TEMP: FieldSpec = FieldSpec::new(24, 16, false, 0.1);
    const COOLANT_TEMP: FieldSpec = FieldSpec::new(40, 16, false, 0.01);
    const ALTERNATOR: FieldSpec = FieldSpec::new(56, 16, true, 0.01);
    const FUEL_RATE: FieldSpec = FieldSpec::new(72, 16, true, 0.1);
    const HOURS: FieldSpec = FieldSpec::new(88, 32, false, 1.0);
    let decoded = DecodedFrame::EngineDynamic {
        instance: instance_or_source(INSTANCE, frame),
        oil_pressure_pa: OIL_PRESSURE.value(p),
        oil_temperature_k: OIL_TEMP.value(p),
        coolant_temperature_k: COOLANT_TEMP.value(p),
        alternator_voltage: ALTERNATOR.value(p),
        fuel_rate_lph: FUEL_RATE.value(p),
        hours_s: HOURS.value(p),
    };
    match &decoded {
        DecodedFrame::EngineDynamic {
            oil_pressure_pa: None,
            oil_temperature_k: None,
            coolant_temperature_k: None,
            alternator_voltage: None,
            fuel_rate_lph: None,
            hours_s: None,
            ..
        } => Err(no_data(frame)),
        _ => Ok(decoded),
    }
}

fn decode_fluid_level(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const INSTANCE: FieldSpec = FieldSpec::new(0, 4, false, 1.0);
    const FLUID_TYPE: FieldSpec = FieldSpec::new(4, 4, false, 1.0);
    const LEVEL: FieldSpec = FieldSpec::new(8, 16, true, 0.004);
    const CAPACITY: FieldSpec = FieldSpec::new(24, 32, false, 0.1);
    let level_percent = LEVEL.value(p);
    let capacity_l = CAPACITY.value(p);
    if level_percent.is_none() && capacity_l.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::FluidLevel {
        instance: INSTANCE.raw(p).filter(|&v| v != 0xF).unwrap_or(0) as u8,
        fluid_type: FLUID_TYPE.raw(p).unwrap_or(0xF) as u8,
        level_percent,
        capacity_l,
    })
}

fn decode_battery_status(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const INSTANCE: FieldSpec = FieldSpec::new(0, 8, false, 1.0);
    const VOLTAGE: FieldSpec = FieldSpec::new(8, 16, false, 0.01);
    const CURRENT: FieldSpec = FieldSpec::new(24, 16, true, 0.1);
    const TEMPERATURE: FieldSpec = FieldSpec::new(40, 16, false, 0.01);
    let voltage = VOLTAGE.value(p);
    let current_a = CURRENT.value(p);
    let temperature_k = TEMPERATURE.value(p);
    if voltage.is_none() && current_a.is_none() && temperature_k.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::BatteryStatus {
        instance: instance_or_source(INSTANCE, frame),
        voltage,
        current_a,
        temperature_k,
    })
}

fn decode_speed(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const WATER: FieldSpec = FieldSpec::new(8, 16, false, 0.01);
    const GROUND: FieldSpec = FieldSpec::new(24, 16, false, 0.01);
    let water_ms = WATER.value(p);
    let ground_ms = GROUND.value(p);
    if water_ms.is_none() && ground_ms.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::Speed { water_ms, ground_ms })
}

fn decode_water_depth(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const DEPTH: FieldSpec = FieldSpec::new(8, 32, false, 0.01);
    const OFFSET: FieldSpec = FieldSpec::new(40, 16, true, 0.001);
    let depth_m = DEPTH.value(p);
    if depth_m.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::WaterDepth {
        depth_m,
        offset_m: OFFSET.value(p),
    })
}

fn decode_position_rapid(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const LATITUDE: FieldSpec = FieldSpec::new(0, 32, true, 1e-7);
    const LONGITUDE: FieldSpec = FieldSpec::new(32, 32, true, 1e-7);
    let latitude_deg = LATITUDE.value(p);
    let longitude_deg = LONGITUDE.value(p);
    if latitude_deg.is_none() || longitude_deg.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::PositionRapid {
        latitude_deg,
        longitude_deg,
    })
}

fn decode_cog_sog(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const COG: FieldSpec = FieldSpec::new(16, 16, false, 1e-4);
    const SOG: FieldSpec = FieldSpec::new(32, 16, false, 0.01);
    let cog_rad = COG.value(p);
    let sog_ms = SOG.value(p);
    if cog_rad.is_none() && sog_ms.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::CogSog { cog_rad, sog_ms })
}

fn decode_gnss_position(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const LATITUDE: FieldSpec = FieldSpec::new(56, 64, true, 1e-16);
    const LONGITUDE: FieldSpec = FieldSpec::new(120, 64, true, 1e-16);
    const ALTITUDE: FieldSpec = FieldSpec::new(184, 64, true, 1e-6);
    const SATELLITES: FieldSpec = FieldSpec::new(264, 8, false, 1.0);
    let latitude_deg = LATITUDE.value(p);
    let longitude_deg = LONGITUDE.value(p);
    if latitude_deg.is_none() || longitude_deg.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::GnssPosition {
        latitude_deg,
        longitude_deg,
        altitude_m: ALTITUDE.value(p),
        satellites: SATELLITES.value(p).map(|v| v as u8),
    })
}

fn decode_xte(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const XTE: FieldSpec = FieldSpec::new(16, 32, true, 0.01);
    let xte_m = XTE.value(p);
    if xte_m.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::CrossTrackError { xte_m })
}

fn decode_navigation_data(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const DISTANCE: FieldSpec = FieldSpec::new(8, 32, false, 0.01);
    const BEARING: FieldSpec = FieldSpec::new(112, 16, false, 1e-4);
    const WAYPOINT: FieldSpec = FieldSpec::new(160, 32, false, 1.0);
    let distance_m = DISTANCE.value(p);
    let bearing_rad = BEARING.value(p);
    if distance_m.is_none() && bearing_rad.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::NavigationData {
        distance_m,
        bearing_rad,
        waypoint_number: WAYPOINT.value(p).map(|v| v as u32),
    })
}

fn decode_route_waypoint(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const ROUTE_ID: FieldSpec = FieldSpec::new(48, 16, false, 1.0);
    let route_id = ROUTE_ID.value(p).map(|v| v as u32);
    let route_name = read_string(p, 9);
    if route_id.is_none() && route_name.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::RouteWaypoint { route_id, route_name })
}

fn decode_wind(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const SPEED: FieldSpec = FieldSpec::new(8, 16, false, 0.01);
    const ANGLE: FieldSpec = FieldSpec::new(24, 16, false, 1e-4);
    const REFERENCE: FieldSpec = FieldSpec::new(40, 3, false, 1.0);
    let speed_ms = SPEED.value(p);
    let angle_rad = ANGLE.value(p);
    if speed_ms.is_none() && angle_rad.is_none() {
        return Err(no_data(frame));
    }
    let reference = match REFERENCE.raw(p) {
        Some(0) => Some(WindReference::TrueNorth),
        Some(1) => Some(WindReference::MagneticNorth),
        Some(2) => Some(WindReference::Apparent),
        Some(3) | Some(4) => Some(WindReference::TrueBoat),
        _ => None,
    };
    Ok(DecodedFrame::Wind {
        reference,
        speed_ms,
        angle_rad,
    })
}

fn decode_environment(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const WATER_TEMP: FieldSpec = FieldSpec::new(8, 16, false, 0.01);
    const AIR_TEMP: FieldSpec = FieldSpec::new(24, 16, false, 0.01);
    const PRESSURE: FieldSpec = FieldSpec::new(40, 16, false, 100.0);
    let water_temperature_k = WATER_TEMP.value(p);
    let air_temperature_k = AIR_TEMP.value(p);
    let pressure_pa = PRESSURE.value(p);
    if water_temperature_k.is_none() && air_temperature_k.is_none() && pressure_pa.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::Environment {
        water_temperature_k,
        air_temperature_k,
        pressure_pa,
    })
}

fn decode_temperature(frame: &BinaryFrame, p: &[u8]) -> Result<DecodedFrame> {
    const INSTANCE: FieldSpec = FieldSpec::new(8, 8, false, 1.0);
    const SOURCE: FieldSpec = FieldSpec::new(16, 8, false, 1.0);
    const ACTUAL: FieldSpec = FieldSpec::new(24, 16, false, 0.01);
    const SET: FieldSpec = FieldSpec::new(40, 16, false, 0.01);
    let actual_k = ACTUAL.value(p);
    let set_k = SET.value(p);
    if actual_k.is_none() && set_k.is_none() {
        return Err(no_data(frame));
    }
    Ok(DecodedFrame::Temperature {
        instance: INSTANCE.raw(p).filter(|&v| v != 0xFF).unwrap_or(0) as u8,
        source: SOURCE.raw(p).unwrap_or(0xFF) as u8,
        actual_k,
        set_k,
    })
}
