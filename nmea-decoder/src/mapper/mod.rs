//! Sensor mapping layer
//!
//! Routes a decoded message (sentence or frame) to one or more typed
//! `SensorUpdate` records. Handlers share three cross-cutting behaviors:
//! instance derivation (explicit field, then talker table, then 0), unit
//! normalization to base units, and multi-source arbitration claims for
//! metrics fed by several message types.
//!
//! A handler failure drops the whole message for that handler - no partial
//! update is emitted - and the error names the message type so the caller
//! can account for it. One malformed message never halts the stream.

pub mod arbitration;
pub mod mnemonics;
pub mod units;

mod frames;

use crate::config::DecoderConfig;
use crate::sentence::{
    DepthReading, DepthReference, GroundTrack, HeadingReading, ParsedSentence, PositionFix,
    RecommendedMinimum, RpmReading, RudderReading, TransducerTuple, WaterSpeedHeading,
    WindDirection, WindReading,
};
use crate::stats::DecoderStats;
use crate::types::{
    BinaryFrame, DecodeError, FieldValue, RawSentence, Result, SensorCategory, SensorUpdate,
    Timestamp,
};
use self::units::{knots_from_kmh, knots_from_mps, normalize_bearing, normalize_relative};

/// The mapping/arbitration engine
///
/// Stateless apart from its configuration; construct one at startup and pass
/// it by reference to the pipeline.
pub struct SensorMapper {
    config: DecoderConfig,
}

impl SensorMapper {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Map one parsed sentence to sensor updates
    ///
    /// Returns an empty list for sentence types excluded by the configured
    /// filter. `stats` absorbs soft diagnostics (unrecognized transducer
    /// mnemonics); hard failures come back as errors naming the type.
    pub fn map_sentence(
        &self,
        raw: &RawSentence,
        parsed: &ParsedSentence,
        timestamp: Timestamp,
        stats: &mut DecoderStats,
    ) -> Result<Vec<SensorUpdate>> {
        if !self.config.should_process_sentence(&raw.type_code) {
            log::trace!("sentence type {} filtered out", raw.type_code);
            return Ok(Vec::new());
        }
        // Redundant sensors sharing one grammar are told apart by talker
        let instance = self.config.talker_instance(&raw.talker);

        match parsed {
            ParsedSentence::PositionFix(fix) => map_position_fix(fix, instance, timestamp),
            ParsedSentence::RecommendedMinimum(rmc) => map_rmc(rmc, instance, timestamp),
            ParsedSentence::GroundTrack(vtg) => map_ground_track(vtg, instance, timestamp),
            ParsedSentence::WaterSpeedHeading(vhw) => map_vhw(vhw, instance, timestamp),
            ParsedSentence::Wind(wind) => map_wind(wind, instance, timestamp),
            ParsedSentence::WindDirection(mwd) => map_wind_direction(mwd, instance, timestamp),
            ParsedSentence::Heading(hdg) => map_heading(hdg, instance, timestamp),
            ParsedSentence::HeadingMagnetic(deg) => {
                let mut u = SensorUpdate::new(SensorCategory::Compass, instance, timestamp);
                u.push("heading_magnetic", FieldValue::Float(normalize_bearing(*deg)));
                u.push_claimed(
                    "heading",
                    FieldValue::Float(normalize_bearing(*deg)),
                    arbitration::heading_magnetic_claim(),
                );
                Ok(vec![u])
            }
            ParsedSentence::HeadingTrue(deg) => {
                let mut u = SensorUpdate::new(SensorCategory::Compass, instance, timestamp);
                u.push("heading_true", FieldValue::Float(normalize_bearing(*deg)));
                u.push_claimed(
                    "heading",
                    FieldValue::Float(normalize_bearing(*deg)),
                    arbitration::heading_true_claim(),
                );
                Ok(vec![u])
            }
            ParsedSentence::Depth(depth) => map_depth(depth, instance, timestamp),
            ParsedSentence::WaterTemperature(celsius) => {
                let mut u = SensorUpdate::new(SensorCategory::Temperature, instance, timestamp);
                u.push_claimed(
                    "water_temperature",
                    FieldValue::Float(*celsius),
                    arbitration::water_temp_claim(),
                );
                Ok(vec![u])
            }
            ParsedSentence::Rpm(rpm) => map_rpm(rpm, instance, timestamp),
            ParsedSentence::Rudder(rudder) => map_rudder(rudder, timestamp),
            ParsedSentence::Transducer(tuples) => {
                self.map_transducer(tuples, timestamp, stats)
            }
            ParsedSentence::Unknown { type_code, .. } => {
                Err(DecodeError::UnsupportedSentence(type_code.clone()))
            }
        }
    }

    /// Map one decoded binary frame to sensor updates
    pub fn map_frame(
        &self,
        frame: &BinaryFrame,
        decoded: &crate::frame::DecodedFrame,
        timestamp: Timestamp,
    ) -> Result<Vec<SensorUpdate>> {
        if !self.config.should_process_pgn(frame.pgn) {
            log::trace!("PGN {} filtered out", frame.pgn);
            return Ok(Vec::new());
        }
        frames::map_frame(frame, decoded, timestamp)
    }

    /// Generic transducer: iterate 4-tuples, match each identifier against
    /// the mnemonic table, merge tuples addressing the same device into one
    /// update. Unrecognized tuples are counted, never fatal.
    fn map_transducer(
        &self,
        tuples: &[TransducerTuple],
        timestamp: Timestamp,
        stats: &mut DecoderStats,
    ) -> Result<Vec<SensorUpdate>> {
        let mut updates: Vec<SensorUpdate> = Vec::new();

        for tuple in tuples.iter().take(self.config.max_transducer_tuples) {
            let Some(id) = tuple.id.as_deref() else {
                stats.record_unrecognized_mnemonic();
                continue;
            };
            let matched = match mnemonics::match_mnemonic(id) {
                Ok(m) => m,
                Err(e) => {
                    log::debug!("{}", e);
                    stats.record_unrecognized_mnemonic();
                    continue;
                }
            };
            let Some((key, value, claim)) = transducer_field(matched.family, tuple) else {
                log::debug!("mnemonic {} with unusable measurement kind", id);
                stats.record_unrecognized_mnemonic();
                continue;
            };

            let update = update_for(
                &mut updates,
                matched.family.category(),
                matched.instance,
                timestamp,
            );
            // First tuple for a key wins within one sentence
            if update.field(key).is_none() {
                match claim {
                    Some(c) => update.push_claimed(key, value, c),
                    None => update.push(key, value),
                }
            }
        }

        if updates.is_empty() {
            return Err(DecodeError::invalid("XDR", "no recognized tuples"));
        }
        Ok(updates)
    }
}

/// Find or create the update for a `(category, instance)` pair
fn update_for(
    updates: &mut Vec<SensorUpdate>,
    category: SensorCategory,
    instance: u8,
    timestamp: Timestamp,
) -> &mut SensorUpdate {
    match updates
        .iter()
        .position(|u| u.category == category && u.instance == instance)
    {
        Some(pos) => &mut updates[pos],
        None => {
            updates.push(SensorUpdate::new(category, instance, timestamp));
            updates.last_mut().expect("just pushed")
        }
    }
}

/// Field key, normalized value and optional claim for one transducer tuple
fn transducer_field(
    family: mnemonics::MnemonicFamily,
    tuple: &TransducerTuple,
) -> Option<(&'static str, FieldValue, Option<crate::types::SourceClaim>)> {
    use mnemonics::MnemonicFamily as F;

    let value = tuple.value?;
    let kind = tuple.kind?;
    let unit = tuple.unit.as_deref().unwrap_or("");

    let (key, normalized, claim) = match (family, kind) {
        (F::Battery, 'U') => ("voltage", value, None),
        (F::Battery, 'I') => ("current", value, None),
        (F::Battery, 'C') => ("temperature", value, None),
        (F::Engine, 'C') => ("coolant_temperature", value, None),
        (F::Engine, 'T') => ("rpm", value, None),
        (F::Engine, 'P') => (
            "oil_pressure",
            if unit == "B" {
                units::pascals_from_bar(value)
            } else {
                value
            },
            None,
        ),
        (F::Tank, 'V') | (F::Tank, 'E') => {
            if unit == "P" {
                ("level", value, None)
            } else {
                return None;
            }
        }
        (F::AirTemperature, 'C') => ("air_temperature", value, None),
        (F::WaterTemperature, 'C') => (
            "water_temperature",
            value,
            Some(arbitration::water_temp_transducer_claim()),
        ),
        (F::Temperature, 'C') => ("actual", value, None),
        (F::Rudder, 'A') => ("angle", normalize_relative(value), None),
        (F::Pitch, 'A') => ("pitch", normalize_relative(value), None),
        (F::Roll, 'A') => ("roll", normalize_relative(value), None),
        _ => return None,
    };
    Some((key, FieldValue::Float(normalized), claim))
}

fn map_position_fix(
    fix: &PositionFix,
    instance: u8,
    timestamp: Timestamp,
) -> Result<Vec<SensorUpdate>> {
    let mut u = SensorUpdate::new(SensorCategory::Gps, instance, timestamp);
    if let (Some(lat), Some(lon)) = (fix.latitude, fix.longitude) {
        u.push("latitude", FieldValue::Float(lat));
        u.push("longitude", FieldValue::Float(lon));
    }
    if let Some(q) = fix.fix_quality {
        u.push("fix_quality", FieldValue::Integer(q));
    }
    if let Some(n) = fix.satellites {
        u.push("satellites", FieldValue::Integer(n));
    }
    if let Some(h) = fix.hdop {
        u.push("hdop", FieldValue::Float(h));
    }
    if let Some(a) = fix.altitude {
        u.push("altitude", FieldValue::Float(a));
    }
    if u.is_empty() {
        return Err(DecodeError::invalid("GGA", "no mappable fields"));
    }
    Ok(vec![u])
}

fn map_rmc(
    rmc: &RecommendedMinimum,
    instance: u8,
    timestamp: Timestamp,
) -> Result<Vec<SensorUpdate>> {
    if rmc.status != Some('A') {
        return Err(DecodeError::invalid("RMC", "fix not valid"));
    }
    let mut u = SensorUpdate::new(SensorCategory::Gps, instance, timestamp);
    if let (Some(lat), Some(lon)) = (rmc.latitude, rmc.longitude) {
        u.push("latitude", FieldValue::Float(lat));
        u.push("longitude", FieldValue::Float(lon));
    }
    if let Some(sog) = rmc.sog_knots {
        u.push("speed_over_ground", FieldValue::Float(sog));
    }
    if let Some(course) = rmc.course {
        u.push("course_over_ground", FieldValue::Float(normalize_bearing(course)));
    }
    if u.is_empty() {
        return Err(DecodeError::invalid("RMC", "no mappable fields"));
    }
    Ok(vec![u])
}

fn map_ground_track(
    vtg: &GroundTrack,
    instance: u8,
    timestamp: Timestamp,
) -> Result<Vec<SensorUpdate>> {
    let mut u = SensorUpdate::new(SensorCategory::Gps, instance, timestamp);
    if let Some(course) = vtg.course_true {
        u.push("course_over_ground", FieldValue::Float(normalize_bearing(course)));
    }
    let sog = vtg.sog_knots.or(vtg.sog_kmh.map(knots_from_kmh));
    if let Some(sog) = sog {
        u.push("speed_over_ground", FieldValue::Float(sog));
    }
    if u.is_empty() {
        return Err(DecodeError::invalid("VTG", "no mappable fields"));
    }
    Ok(vec![u])
}

/// One sentence, two sensors: water speed and heading
fn map_vhw(
    vhw: &WaterSpeedHeading,
    instance: u8,
    timestamp: Timestamp,
) -> Result<Vec<SensorUpdate>> {
    let mut updates = Vec::new();

    let speed = vhw.speed_knots.or(vhw.speed_kmh.map(knots_from_kmh));
    if let Some(speed) = speed {
        let u = update_for(&mut updates, SensorCategory::Speed, instance, timestamp);
        u.push("through_water", FieldValue::Float(speed));
    }

    if vhw.heading_true.is_some() || vhw.heading_magnetic.is_some() {
        let u = update_for(&mut updates, SensorCategory::Compass, instance, timestamp);
        if let Some(t) = vhw.heading_true {
            u.push("heading_true", FieldValue::Float(normalize_bearing(t)));
            u.push_claimed(
                "heading",
                FieldValue::Float(normalize_bearing(t)),
                arbitration::heading_true_claim(),
            );
        } else if let Some(m) = vhw.heading_magnetic {
            u.push("heading_magnetic", FieldValue::Float(normalize_bearing(m)));
            u.push_claimed(
                "heading",
                FieldValue::Float(normalize_bearing(m)),
                arbitration::heading_magnetic_claim(),
            );
        }
        if vhw.heading_true.is_some() {
            if let Some(m) = vhw.heading_magnetic {
                u.push("heading_magnetic", FieldValue::Float(normalize_bearing(m)));
            }
        }
    }

    if updates.is_empty() {
        return Err(DecodeError::invalid("VHW", "no mappable fields"));
    }
    Ok(updates)
}

fn map_wind(wind: &WindReading, instance: u8, timestamp: Timestamp) -> Result<Vec<SensorUpdate>> {
    if let Some(status) = wind.status {
        if status != 'A' {
            return Err(DecodeError::invalid("MWV", "data not valid"));
        }
    }

    let speed_knots = match (wind.speed, wind.speed_unit) {
        (Some(v), Some('N') | None) => Some(v),
        (Some(v), Some('M')) => Some(knots_from_mps(v)),
        (Some(v), Some('K')) => Some(knots_from_kmh(v)),
        (Some(_), Some(_)) => None,
        (None, _) => None,
    };

    let mut u = SensorUpdate::new(SensorCategory::Wind, instance, timestamp);
    match wind.reference {
        Some('R') => {
            if let Some(angle) = wind.angle {
                u.push("apparent_angle", FieldValue::Float(normalize_relative(angle)));
            }
            if let Some(speed) = speed_knots {
                u.push("apparent_speed", FieldValue::Float(speed));
            }
        }
        Some('T') => {
            if let Some(angle) = wind.angle {
                u.push("true_angle", FieldValue::Float(normalize_relative(angle)));
            }
            if let Some(speed) = speed_knots {
                u.push("true_speed", FieldValue::Float(speed));
            }
        }
        _ => return Err(DecodeError::invalid("MWV", "missing wind reference")),
    }
    if u.is_empty() {
        return Err(DecodeError::invalid("MWV", "no mappable fields"));
    }
    Ok(vec![u])
}

fn map_wind_direction(
    mwd: &WindDirection,
    instance: u8,
    timestamp: Timestamp,
) -> Result<Vec<SensorUpdate>> {
    let mut u = SensorUpdate::new(SensorCategory::Wind, instance, timestamp);
    if let Some(dir) = mwd.direction_true {
        u.push("direction", FieldValue::Float(normalize_bearing(dir)));
    }
    let speed = mwd.speed_knots.or(mwd.speed_ms.map(knots_from_mps));
    if let Some(speed) = speed {
        u.push("true_speed", FieldValue::Float(speed));
    }
    if u.is_empty() {
        return Err(DecodeError::invalid("MWD", "no mappable fields"));
    }
    Ok(vec![u])
}

fn map_heading(
    hdg: &HeadingReading,
    instance: u8,
    timestamp: Timestamp,
) -> Result<Vec<SensorUpdate>> {
    let mut u = SensorUpdate::new(SensorCategory::Compass, instance, timestamp);
    if let Some(m) = hdg.magnetic {
        u.push("heading_magnetic", FieldValue::Float(normalize_bearing(m)));
        match hdg.variation {
            Some(variation) => {
                let corrected = m + hdg.deviation.unwrap_or(0.0) + variation;
                u.push_claimed(
                    "heading",
                    FieldValue::Float(normalize_bearing(corrected)),
                    arbitration::heading_corrected_claim(),
                );
            }
            None => {
                u.push_claimed(
                    "heading",
                    FieldValue::Float(normalize_bearing(m)),
                    arbitration::heading_magnetic_claim(),
                );
            }
        }
    }
    if let Some(d) = hdg.deviation {
        u.push("deviation", FieldValue::Float(d));
    }
    if let Some(v) = hdg.variation {
        u.push("variation", FieldValue::Float(v));
    }
    if u.is_empty() {
        return Err(DecodeError::invalid("HDG", "no mappable fields"));
    }
    Ok(vec![u])
}

fn map_depth(depth: &DepthReading, instance: u8, timestamp: Timestamp) -> Result<Vec<SensorUpdate>> {
    let Some(meters) = depth.depth else {
        return Err(DecodeError::invalid("DPT", "missing depth"));
    };
    let mut u = SensorUpdate::new(SensorCategory::Depth, instance, timestamp);
    let reference_key = match depth.reference {
        DepthReference::Surface => "depth_below_surface",
        DepthReference::Transducer => "depth_below_transducer",
        DepthReference::Keel => "depth_below_keel",
    };
    // The raw reading is never lost, whatever the arbitration outcome
    u.push(reference_key, FieldValue::Float(meters));
    u.push_claimed(
        "depth",
        FieldValue::Float(meters),
        arbitration::depth_claim(depth.reference),
    );
    if let Some(offset) = depth.offset {
        u.push("transducer_offset", FieldValue::Float(offset));
    }
    Ok(vec![u])
}

fn map_rpm(rpm: &RpmReading, instance: u8, timestamp: Timestamp) -> Result<Vec<SensorUpdate>> {
    if let Some(status) = rpm.status {
        if status != 'A' {
            return Err(DecodeError::invalid("RPM", "data not valid"));
        }
    }
    let instance = match rpm.number {
        Some(n) if (0..=255).contains(&n) => n as u8,
        Some(n) => {
            return Err(DecodeError::invalid("RPM", format!("bad source number {n}")));
        }
        None => instance,
    };
    let mut u = SensorUpdate::new(SensorCategory::Engine, instance, timestamp);
    match (rpm.source, rpm.rpm) {
        (Some('E'), Some(value)) => u.push("rpm", FieldValue::Float(value)),
        (Some('S'), Some(value)) => u.push("shaft_rpm", FieldValue::Float(value)),
        (_, Some(_)) => return Err(DecodeError::invalid("RPM", "unknown source code")),
        (_, None) => {}
    }
    if let Some(pitch) = rpm.pitch_percent {
        u.push("propeller_pitch", FieldValue::Float(pitch));
    }
    if u.is_empty() {
        return Err(DecodeError::invalid("RPM", "no mappable fields"));
    }
    Ok(vec![u])
}

/// Starboard rudder is instance 0, port rudder instance 1
fn map_rudder(rudder: &RudderReading, timestamp: Timestamp) -> Result<Vec<SensorUpdate>> {
    let mut updates = Vec::new();
    if rudder.starboard_valid {
        if let Some(angle) = rudder.starboard {
            let u = update_for(&mut updates, SensorCategory::Rudder, 0, timestamp);
            u.push("angle", FieldValue::Float(normalize_relative(angle)));
        }
    }
    if rudder.port_valid {
        if let Some(angle) = rudder.port {
            let u = update_for(&mut updates, SensorCategory::Rudder, 1, timestamp);
            u.push("angle", FieldValue::Float(normalize_relative(angle)));
        }
    }
    if updates.is_empty() {
        return Err(DecodeError::invalid("RSA", "no valid rudder reading"));
    }
    Ok(updates)
}
