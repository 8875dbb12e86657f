//! ASCII sentence parser
//!
//! Tokenizes one line of sentence-based telemetry into talker, type code and
//! positional fields, then applies the per-type grammar to produce a typed
//! sentence variant. Field-level parse failures leave the affected field
//! absent without aborting the rest of the sentence; a sentence whose every
//! field is unusable is rejected as a whole.

use crate::types::{DecodeError, RawSentence, Result};

/// Sentinel characters a sentence may start with
const SENTINELS: [char; 2] = ['$', '!'];

/// Sentence tokenizer and checksum validator
pub struct SentenceParser;

impl SentenceParser {
    /// Parse one line into a `RawSentence`
    ///
    /// Validates the leading sentinel and, where present, the trailing
    /// checksum (XOR of all characters between sentinel and `*`, rendered as
    /// two uppercase hex digits). A sentence without a checksum suffix is
    /// accepted.
    pub fn parse(line: &str) -> Result<RawSentence> {
        let line = line.trim_end_matches(['\r', '\n']);

        let mut chars = line.chars();
        match chars.next() {
            Some(c) if SENTINELS.contains(&c) => {}
            _ => return Err(DecodeError::BadSentinel),
        }
        let body = &line[1..];

        // Split off the checksum suffix if one is present
        let (body, checksum) = match body.rsplit_once('*') {
            Some((data, suffix)) => {
                let expected = u8::from_str_radix(suffix.trim(), 16).map_err(|_| {
                    DecodeError::invalid("sentence", format!("bad checksum suffix {:?}", suffix))
                })?;
                (data, Some(expected))
            }
            None => (body, None),
        };

        if let Some(expected) = checksum {
            let computed = checksum_of(body);
            if computed != expected {
                return Err(DecodeError::ChecksumMismatch { expected, computed });
            }
        }

        let mut tokens = body.split(',');
        let address = tokens.next().unwrap_or("");
        let fields: Vec<String> = tokens.map(|t| t.to_string()).collect();

        if address.len() < 5 || !address.is_ascii() || fields.is_empty() {
            return Err(DecodeError::InsufficientFields(fields.len()));
        }

        Ok(RawSentence {
            talker: address[..2].to_string(),
            type_code: address[2..].to_string(),
            fields,
            raw: line.to_string(),
        })
    }
}

/// XOR checksum over the sentence body (everything between `$`/`!` and `*`)
pub fn checksum_of(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// Reference point a depth reading is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthReference {
    Surface,
    Transducer,
    Keel,
}

/// Position fix data (GGA)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionFix {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub fix_quality: Option<i64>,
    pub satellites: Option<i64>,
    pub hdop: Option<f64>,
    pub altitude: Option<f64>,
}

/// Recommended-minimum navigation data (RMC)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendedMinimum {
    pub status: Option<char>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sog_knots: Option<f64>,
    pub course: Option<f64>,
}

/// Track and ground speed (VTG)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTrack {
    pub course_true: Option<f64>,
    pub course_magnetic: Option<f64>,
    pub sog_knots: Option<f64>,
    pub sog_kmh: Option<f64>,
}

/// Water speed and heading (VHW)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaterSpeedHeading {
    pub heading_true: Option<f64>,
    pub heading_magnetic: Option<f64>,
    pub speed_knots: Option<f64>,
    pub speed_kmh: Option<f64>,
}

/// Wind speed and angle (MWV)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindReading {
    pub angle: Option<f64>,
    /// 'R' = relative (apparent), 'T' = true
    pub reference: Option<char>,
    pub speed: Option<f64>,
    /// 'N' = knots, 'M' = m/s, 'K' = km/h
    pub speed_unit: Option<char>,
    pub status: Option<char>,
}

/// Wind direction and speed (MWD)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindDirection {
    pub direction_true: Option<f64>,
    pub direction_magnetic: Option<f64>,
    pub speed_knots: Option<f64>,
    pub speed_ms: Option<f64>,
}

/// Heading with deviation and variation (HDG)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadingReading {
    pub magnetic: Option<f64>,
    /// Signed: easterly positive
    pub deviation: Option<f64>,
    /// Signed: easterly positive
    pub variation: Option<f64>,
}

/// Depth relative to one reference point (DPT/DBT/DBS/DBK)
#[derive(Debug, Clone, PartialEq)]
pub struct DepthReading {
    pub reference: DepthReference,
    /// Meters
    pub depth: Option<f64>,
    /// Transducer offset in meters: positive = distance to waterline,
    /// negative = distance to keel (DPT only)
    pub offset: Option<f64>,
}

/// Shaft or engine revolutions (RPM)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RpmReading {
    /// 'E' = engine, 'S' = shaft
    pub source: Option<char>,
    pub number: Option<i64>,
    pub rpm: Option<f64>,
    pub pitch_percent: Option<f64>,
    pub status: Option<char>,
}

/// Rudder angle, starboard and optionally port (RSA)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RudderReading {
    pub starboard: Option<f64>,
    pub starboard_valid: bool,
    pub port: Option<f64>,
    pub port_valid: bool,
}

/// One 4-tuple from a generic transducer sentence (XDR)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransducerTuple {
    pub kind: Option<char>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub id: Option<String>,
}

/// A sentence after grammar-specific field extraction
///
/// Each variant carries only the fields its grammar declares. Unknown types
/// fall back to `Unknown` with the ordered raw tokens so upstream code can
/// still log and inspect them.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedSentence {
    PositionFix(PositionFix),
    RecommendedMinimum(RecommendedMinimum),
    GroundTrack(GroundTrack),
    WaterSpeedHeading(WaterSpeedHeading),
    Wind(WindReading),
    WindDirection(WindDirection),
    Heading(HeadingReading),
    HeadingMagnetic(f64),
    HeadingTrue(f64),
    Depth(DepthReading),
    WaterTemperature(f64),
    Rpm(RpmReading),
    Rudder(RudderReading),
    Transducer(Vec<TransducerTuple>),
    Unknown {
        type_code: String,
        fields: Vec<String>,
    },
}

impl ParsedSentence {
    /// Apply the per-type grammar to a tokenized sentence
    pub fn from_raw(raw: &RawSentence) -> Result<ParsedSentence> {
        let f = &raw.fields;
        match raw.type_code.as_str() {
            "GGA" => parse_gga(f),
            "RMC" => parse_rmc(f),
            "VTG" => parse_vtg(f),
            "VHW" => parse_vhw(f),
            "MWV" => parse_mwv(f),
            "MWD" => parse_mwd(f),
            "HDG" => parse_hdg(f),
            "HDM" => num(f, 0)
                .map(ParsedSentence::HeadingMagnetic)
                .ok_or_else(|| DecodeError::NoUsableFields("HDM".into())),
            "HDT" => num(f, 0)
                .map(ParsedSentence::HeadingTrue)
                .ok_or_else(|| DecodeError::NoUsableFields("HDT".into())),
            "DPT" => parse_dpt(f),
            "DBT" => parse_depth_triple(f, DepthReference::Transducer, "DBT"),
            "DBS" => parse_depth_triple(f, DepthReference::Surface, "DBS"),
            "DBK" => parse_depth_triple(f, DepthReference::Keel, "DBK"),
            "MTW" => num(f, 0)
                .map(ParsedSentence::WaterTemperature)
                .ok_or_else(|| DecodeError::NoUsableFields("MTW".into())),
            "RPM" => parse_rpm(f),
            "RSA" => parse_rsa(f),
            "XDR" => parse_xdr(f),
            _ => Ok(ParsedSentence::Unknown {
                type_code: raw.type_code.clone(),
                fields: raw.fields.clone(),
            }),
        }
    }
}

// Field helpers: an empty or malformed token yields None, leaving sibling
// fields usable.

fn txt(fields: &[String], idx: usize) -> Option<&str> {
    fields.get(idx).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn num(fields: &[String], idx: usize) -> Option<f64> {
    txt(fields, idx)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn int(fields: &[String], idx: usize) -> Option<i64> {
    txt(fields, idx)?.parse::<i64>().ok()
}

fn ch(fields: &[String], idx: usize) -> Option<char> {
    let t = txt(fields, idx)?;
    let mut chars = t.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// Decode a `DDDMM.MMMM` coordinate token with its paired hemisphere field
///
/// The degree part is variable width, the minute part is a fixed two digits
/// before the decimal point. South and West negate the result. A missing
/// hemisphere indicator fails the field, not the sentence.
pub fn coordinate(fields: &[String], idx: usize) -> Option<f64> {
    let value = num(fields, idx)?;
    let hemi = ch(fields, idx + 1)?;
    decode_coordinate(value, hemi)
}

fn decode_coordinate(value: f64, hemisphere: char) -> Option<f64> {
    if value < 0.0 {
        return None;
    }
    let degrees = (value / 100.0).trunc();
    let minutes = value - degrees * 100.0;
    if minutes >= 60.0 {
        return None;
    }
    let decimal = degrees + minutes / 60.0;
    match hemisphere {
        'N' | 'E' => Some(decimal),
        'S' | 'W' => Some(-decimal),
        _ => None,
    }
}

fn parse_gga(f: &[String]) -> Result<ParsedSentence> {
    let fix = PositionFix {
        latitude: coordinate(f, 1),
        longitude: coordinate(f, 3),
        fix_quality: int(f, 5),
        satellites: int(f, 6),
        hdop: num(f, 7),
        altitude: num(f, 8),
    };
    if fix == PositionFix::default() {
        return Err(DecodeError::NoUsableFields("GGA".into()));
    }
    Ok(ParsedSentence::PositionFix(fix))
}

fn parse_rmc(f: &[String]) -> Result<ParsedSentence> {
    let rmc = RecommendedMinimum {
        status: ch(f, 1),
        latitude: coordinate(f, 2),
        longitude: coordinate(f, 4),
        sog_knots: num(f, 6),
        course: num(f, 7),
    };
    if rmc == RecommendedMinimum::default() {
        return Err(DecodeError::NoUsableFields("RMC".into()));
    }
    Ok(ParsedSentence::RecommendedMinimum(rmc))
}

fn parse_vtg(f: &[String]) -> Result<ParsedSentence> {
    let vtg = GroundTrack {
        course_true: num(f, 0),
        course_magnetic: num(f, 2),
        sog_knots: num(f, 4),
        sog_kmh: num(f, 6),
    };
    if vtg == GroundTrack::default() {
        return Err(DecodeError::NoUsableFields("VTG".into()));
    }
    Ok(ParsedSentence::GroundTrack(vtg))
}

fn parse_vhw(f: &[String]) -> Result<ParsedSentence> {
    let vhw = WaterSpeedHeading {
        heading_true: num(f, 0),
        heading_magnetic: num(f, 2),
        speed_knots: num(f, 4),
        speed_kmh: num(f, 6),
    };
    if vhw == WaterSpeedHeading::default() {
        return Err(DecodeError::NoUsableFields("VHW".into()));
    }
    Ok(ParsedSentence::WaterSpeedHeading(vhw))
}

fn parse_mwv(f: &[String]) -> Result<ParsedSentence> {
    let wind = WindReading {
        angle: num(f, 0),
        reference: ch(f, 1),
        speed: num(f, 2),
        speed_unit: ch(f, 3),
        status: ch(f, 4),
    };
    if wind.angle.is_none() && wind.speed.is_none() {
        return Err(DecodeError::NoUsableFields("MWV".into()));
    }
    Ok(ParsedSentence::Wind(wind))
}

fn parse_mwd(f: &[String]) -> Result<ParsedSentence> {
    let wind = WindDirection {
        direction_true: num(f, 0),
        direction_magnetic: num(f, 2),
        speed_knots: num(f, 4),
        speed_ms: num(f, 6),
    };
    if wind == WindDirection::default() {
        return Err(DecodeError::NoUsableFields("MWD".into()));
    }
    Ok(ParsedSentence::WindDirection(wind))
}

fn parse_hdg(f: &[String]) -> Result<ParsedSentence> {
    let heading = HeadingReading {
        magnetic: num(f, 0),
        deviation: signed_by_direction(num(f, 1), ch(f, 2)),
        variation: signed_by_direction(num(f, 3), ch(f, 4)),
    };
    if heading == HeadingReading::default() {
        return Err(DecodeError::NoUsableFields("HDG".into()));
    }
    Ok(ParsedSentence::Heading(heading))
}

/// Apply an E/W direction indicator: westerly values are negative
fn signed_by_direction(value: Option<f64>, direction: Option<char>) -> Option<f64> {
    match (value, direction) {
        (Some(v), Some('E')) => Some(v),
        (Some(v), Some('W')) => Some(-v),
        _ => None,
    }
}

fn parse_dpt(f: &[String]) -> Result<ParsedSentence> {
    let depth = num(f, 0);
    if depth.is_none() {
        return Err(DecodeError::NoUsableFields("DPT".into()));
    }
    Ok(ParsedSentence::Depth(DepthReading {
        reference: DepthReference::Transducer,
        depth,
        offset: num(f, 1),
    }))
}

/// DBT/DBS/DBK carry the same reading three times: feet, meters, fathoms.
/// The meters field wins; feet and fathoms are fallbacks.
fn parse_depth_triple(
    f: &[String],
    reference: DepthReference,
    label: &str,
) -> Result<ParsedSentence> {
    let meters = num(f, 2)
        .or_else(|| num(f, 0).map(|ft| ft * crate::mapper::units::METERS_PER_FOOT))
        .or_else(|| num(f, 4).map(|fa| fa * crate::mapper::units::METERS_PER_FATHOM));
    if meters.is_none() {
        return Err(DecodeError::NoUsableFields(label.into()));
    }
    Ok(ParsedSentence::Depth(DepthReading {
        reference,
        depth: meters,
        offset: None,
    }))
}

fn parse_rpm(f: &[String]) -> Result<ParsedSentence> {
    let rpm = RpmReading {
        source: ch(f, 0),
        number: int(f, 1),
        rpm: num(f, 2),
        pitch_percent: num(f, 3),
        status: ch(f, 4),
    };
    if rpm.rpm.is_none() && rpm.pitch_percent.is_none() {
        return Err(DecodeError::NoUsableFields("RPM".into()));
    }
    Ok(ParsedSentence::Rpm(rpm))
}

fn parse_rsa(f: &[String]) -> Result<ParsedSentence> {
    let rudder = RudderReading {
        starboard: num(f, 0),
        starboard_valid: ch(f, 1) == Some('A'),
        port: num(f, 2),
        port_valid: ch(f, 3) == Some('A'),
    };
    if rudder.starboard.is_none() && rudder.port.is_none() {
        return Err(DecodeError::NoUsableFields("RSA".into()));
    }
    Ok(ParsedSentence::Rudder(rudder))
}

fn parse_xdr(f: &[String]) -> Result<ParsedSentence> {
    let mut tuples = Vec::new();
    for chunk in f.chunks(4) {
        let tuple = TransducerTuple {
            kind: ch(chunk, 0),
            value: num(chunk, 1),
            unit: txt(chunk, 2).map(|s| s.to_string()),
            id: txt(chunk, 3).map(|s| s.to_string()),
        };
        if tuple.value.is_some() || tuple.id.is_some() {
            tuples.push(tuple);
        }
    }
    if tuples.is_empty() {
        return Err(DecodeError::NoUsableFields("XDR".into()));
    }
    Ok(ParsedSentence::Transducer(tuples))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a sentence with a correct checksum appended
    fn sealed(body: &str) -> String {
        format!("${}*{:02X}", body, checksum_of(body))
    }

    #[test]
    fn test_checksum_known_vector() {
        assert_eq!(checksum_of("IIRPM,E,0,1800.0,A"), 0x6C);
    }

    #[test]
    fn test_parse_basic_sentence() {
        let raw = SentenceParser::parse(&sealed("GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,")).unwrap();
        assert_eq!(raw.talker, "GP");
        assert_eq!(raw.type_code, "GGA");
        assert_eq!(raw.fields[0], "123519");
        assert_eq!(raw.fields.len(), 14);
    }

    #[test]
    fn test_parse_without_checksum() {
        let raw = SentenceParser::parse("$HCHDM,238.5,M\r\n").unwrap();
        assert_eq!(raw.talker, "HC");
        assert_eq!(raw.type_code, "HDM");
        assert_eq!(raw.fields, vec!["238.5", "M"]);
    }

    #[test]
    fn test_bad_sentinel() {
        assert!(matches!(
            SentenceParser::parse("GPGGA,123519"),
            Err(DecodeError::BadSentinel)
        ));
    }

    #[test]
    fn test_checksum_mismatch() {
        let err = SentenceParser::parse("$IIRPM,E,0,1800.0,A*00").unwrap_err();
        match err {
            DecodeError::ChecksumMismatch { expected, computed } => {
                assert_eq!(expected, 0x00);
                assert_eq!(computed, 0x6C);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_insufficient_fields() {
        assert!(matches!(
            SentenceParser::parse("$GP"),
            Err(DecodeError::InsufficientFields(_))
        ));
        assert!(matches!(
            SentenceParser::parse("$GPGGA"),
            Err(DecodeError::InsufficientFields(0))
        ));
    }

    #[test]
    fn test_coordinate_decode() {
        let fields: Vec<String> = vec!["4807.038".into(), "N".into()];
        let lat = coordinate(&fields, 0).unwrap();
        assert!((lat - (48.0 + 7.038 / 60.0)).abs() < 1e-9);

        let fields: Vec<String> = vec!["12311.120".into(), "W".into()];
        let lon = coordinate(&fields, 0).unwrap();
        assert!(lon < 0.0);
        assert!((lon + (123.0 + 11.12 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_coordinate_roundtrip() {
        // decode -> re-encode stays within floating-point tolerance
        for (token, hemi) in [(4807.038, 'N'), (12311.120, 'W'), (0009.500, 'S')] {
            let decimal = decode_coordinate(token, hemi).unwrap();
            let unsigned = decimal.abs();
            let degrees = unsigned.trunc();
            let reencoded = degrees * 100.0 + (unsigned - degrees) * 60.0;
            assert!((reencoded - token).abs() < 1e-6, "{token} {hemi}");
        }
    }

    #[test]
    fn test_coordinate_missing_hemisphere() {
        let fields: Vec<String> = vec!["4807.038".into(), "".into()];
        assert_eq!(coordinate(&fields, 0), None);
    }

    #[test]
    fn test_coordinate_bad_minutes() {
        // minute field of 99.9 cannot come from a DDDMM token
        assert_eq!(decode_coordinate(4099.9, 'N'), None);
    }

    #[test]
    fn test_gga_partial_fields_survive() {
        // altitude is malformed, position still decodes
        let raw = SentenceParser::parse("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,bogus,M,,,,").unwrap();
        match ParsedSentence::from_raw(&raw).unwrap() {
            ParsedSentence::PositionFix(fix) => {
                assert!(fix.latitude.is_some());
                assert!(fix.longitude.is_some());
                assert_eq!(fix.altitude, None);
                assert_eq!(fix.satellites, Some(8));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_rmc() {
        let raw = SentenceParser::parse("$GPRMC,123519,A,4807.038,N,01131.000,E,5.5,084.4,230394,,").unwrap();
        match ParsedSentence::from_raw(&raw).unwrap() {
            ParsedSentence::RecommendedMinimum(rmc) => {
                assert_eq!(rmc.status, Some('A'));
                assert_eq!(rmc.sog_knots, Some(5.5));
                assert_eq!(rmc.course, Some(84.4));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_mwv() {
        let raw = SentenceParser::parse("$WIMWV,214.8,R,10.1,N,A").unwrap();
        match ParsedSentence::from_raw(&raw).unwrap() {
            ParsedSentence::Wind(wind) => {
                assert_eq!(wind.angle, Some(214.8));
                assert_eq!(wind.reference, Some('R'));
                assert_eq!(wind.speed_unit, Some('N'));
                assert_eq!(wind.status, Some('A'));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_hdg_signed_variation() {
        let raw = SentenceParser::parse("$HCHDG,101.1,0.5,E,7.5,W").unwrap();
        match ParsedSentence::from_raw(&raw).unwrap() {
            ParsedSentence::Heading(h) => {
                assert_eq!(h.magnetic, Some(101.1));
                assert_eq!(h.deviation, Some(0.5));
                assert_eq!(h.variation, Some(-7.5));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_dbt_meters_preferred() {
        let raw = SentenceParser::parse("$SDDBT,11.5,f,3.5,M,1.9,F").unwrap();
        match ParsedSentence::from_raw(&raw).unwrap() {
            ParsedSentence::Depth(d) => {
                assert_eq!(d.reference, DepthReference::Transducer);
                assert_eq!(d.depth, Some(3.5));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_dbt_feet_fallback() {
        let raw = SentenceParser::parse("$SDDBT,11.5,f,,M,,F").unwrap();
        match ParsedSentence::from_raw(&raw).unwrap() {
            ParsedSentence::Depth(d) => {
                let depth = d.depth.unwrap();
                assert!((depth - 11.5 * 0.3048).abs() < 1e-9);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_rpm_sentence() {
        let raw = SentenceParser::parse("$IIRPM,E,0,1800.0,A*6C").unwrap();
        match ParsedSentence::from_raw(&raw).unwrap() {
            ParsedSentence::Rpm(r) => {
                assert_eq!(r.source, Some('E'));
                assert_eq!(r.number, Some(0));
                assert_eq!(r.rpm, Some(1800.0));
                assert_eq!(r.status, Some('A'));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_xdr_tuples() {
        let raw = SentenceParser::parse("$IIXDR,U,12.6,V,BATT0,C,23.5,C,BATT0").unwrap();
        match ParsedSentence::from_raw(&raw).unwrap() {
            ParsedSentence::Transducer(tuples) => {
                assert_eq!(tuples.len(), 2);
                assert_eq!(tuples[0].kind, Some('U'));
                assert_eq!(tuples[0].value, Some(12.6));
                assert_eq!(tuples[1].id.as_deref(), Some("BATT0"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let raw = SentenceParser::parse("$GPZDA,160012.71,11,03,2004,-1,00").unwrap();
        match ParsedSentence::from_raw(&raw).unwrap() {
            ParsedSentence::Unknown { type_code, fields } => {
                assert_eq!(type_code, "ZDA");
                assert_eq!(fields.len(), 6);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_all_fields_unusable_is_rejected() {
        let raw = SentenceParser::parse("$SDDBT,,f,,M,,F").unwrap();
        assert!(matches!(
            ParsedSentence::from_raw(&raw),
            Err(DecodeError::NoUsableFields(_))
        ));
    }
}
