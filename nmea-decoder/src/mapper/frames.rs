//! Frame-to-update handlers
//!
//! Converts typed frame variants into sensor updates. Values arrive in the
//! wire's native units (radians, m/s, Kelvin) and leave in base units
//! (degrees, knots, Celsius).

use crate::frame::{DecodedFrame, HeadingReference, WindReference};
use crate::mapper::arbitration;
use crate::mapper::units::{
    celsius_from_kelvin, degrees_from_radians, knots_from_mps, normalize_bearing,
    normalize_relative,
};
use crate::sentence::DepthReference;
use crate::types::{
    BinaryFrame, DecodeError, FieldValue, Result, SensorCategory, SensorUpdate, Timestamp,
};

/// Display name for a fluid type code
fn fluid_type_name(code: u8) -> &'static str {
    match code {
        0 => "fuel",
        1 => "fresh water",
        2 => "waste water",
        3 => "live well",
        4 => "oil",
        5 => "black water",
        _ => "unknown",
    }
}

pub(super) fn map_frame(
    frame: &BinaryFrame,
    decoded: &DecodedFrame,
    timestamp: Timestamp,
) -> Result<Vec<SensorUpdate>> {
    let label = || format!("PGN {}", frame.pgn);

    let updates = match decoded {
        DecodedFrame::Rudder { instance, angle_rad } => {
            let mut u = SensorUpdate::new(SensorCategory::Rudder, *instance, timestamp);
            if let Some(rad) = angle_rad {
                u.push(
                    "angle",
                    FieldValue::Float(normalize_relative(degrees_from_radians(*rad))),
                );
            }
            vec![u]
        }

        DecodedFrame::Heading {
            reference,
            heading_rad,
            deviation_rad,
            variation_rad,
        } => {
            let mut u = SensorUpdate::new(SensorCategory::Compass, 0, timestamp);
            let variation = variation_rad.map(degrees_from_radians);
            if let Some(rad) = heading_rad {
                let heading = normalize_bearing(degrees_from_radians(*rad));
                match reference {
                    HeadingReference::True => {
                        u.push("heading_true", FieldValue::Float(heading));
                        u.push_claimed(
                            "heading",
                            FieldValue::Float(heading),
                            arbitration::heading_true_claim(),
                        );
                    }
                    HeadingReference::Magnetic => {
                        u.push("heading_magnetic", FieldValue::Float(heading));
                        match variation {
                            Some(variation) => u.push_claimed(
                                "heading",
                                FieldValue::Float(normalize_bearing(heading + variation)),
                                arbitration::heading_corrected_claim(),
                            ),
                            None => u.push_claimed(
                                "heading",
                                FieldValue::Float(heading),
                                arbitration::heading_magnetic_claim(),
                            ),
                        }
                    }
                }
            }
            if let Some(d) = deviation_rad.map(degrees_from_radians) {
                u.push("deviation", FieldValue::Float(d));
            }
            if let Some(v) = variation {
                u.push("variation", FieldValue::Float(v));
            }
            vec![u]
        }

        DecodedFrame::EngineRapid {
            instance,
            rpm,
            boost_pa,
            tilt_percent,
        } => {
            let mut u = SensorUpdate::new(SensorCategory::Engine, *instance, timestamp);
            if let Some(rpm) = rpm {
                u.push("rpm", FieldValue::Float(*rpm));
            }
            if let Some(boost) = boost_pa {
                u.push("boost_pressure", FieldValue::Float(*boost));
            }
            if let Some(tilt) = tilt_percent {
                u.push("tilt", FieldValue::Float(*tilt));
            }
            vec![u]
        }

        DecodedFrame::EngineDynamic {
            instance,
            oil_pressure_pa,
            oil_temperature_k,
            coolant_temperature_k,
            alternator_voltage,
            fuel_rate_lph,
            hours_s,
        } => {
            let mut u = SensorUpdate::new(SensorCategory::Engine, *instance, timestamp);
            if let Some(p) = oil_pressure_pa {
                u.push("oil_pressure", FieldValue::Float(*p));
            }
            if let Some(t) = oil_temperature_k {
                u.push("oil_temperature", FieldValue::Float(celsius_from_kelvin(*t)));
            }
            if let Some(t) = coolant_temperature_k {
                u.push(
                    "coolant_temperature",
                    FieldValue::Float(celsius_from_kelvin(*t)),
                );
            }
            if let Some(v) = alternator_voltage {
                u.push("alternator_voltage", FieldValue::Float(*v));
            }
            if let Some(r) = fuel_rate_lph {
                u.push("fuel_rate", FieldValue::Float(*r));
            }
            if let Some(s) = hours_s {
                u.push("hours", FieldValue::Float(s / 3600.0));
            }
            vec![u]
        }

        DecodedFrame::FluidLevel {
            instance,
            fluid_type,
            level_percent,
            capacity_l,
        } => {
            let mut u = SensorUpdate::new(SensorCategory::Tank, *instance, timestamp);
            if let Some(level) = level_percent {
                u.push("level", FieldValue::Float(*level));
            }
            if let Some(capacity) = capacity_l {
                u.push("capacity", FieldValue::Float(*capacity));
            }
            u.push(
                "fluid_type",
                FieldValue::Text(fluid_type_name(*fluid_type).to_string()),
            );
            vec![u]
        }

        DecodedFrame::BatteryStatus {
            instance,
            voltage,
            current_a,
            temperature_k,
        } => {
            let mut u = SensorUpdate::new(SensorCategory::Battery, *instance, timestamp);
            if let Some(v) = voltage {
                u.push("voltage", FieldValue::Float(*v));
            }
            if let Some(a) = current_a {
                u.push("current", FieldValue::Float(*a));
            }
            if let Some(t) = temperature_k {
                u.push("temperature", FieldValue::Float(celsius_from_kelvin(*t)));
            }
            vec![u]
        }

        DecodedFrame::Speed { water_ms, ground_ms } => {
            let mut u = SensorUpdate::new(SensorCategory::Speed, 0, timestamp);
            if let Some(v) = water_ms {
                u.push("through_water", FieldValue::Float(knots_from_mps(*v)));
            }
            if let Some(v) = ground_ms {
                u.push("over_ground", FieldValue::Float(knots_from_mps(*v)));
            }
            vec![u]
        }

        DecodedFrame::WaterDepth { depth_m, offset_m } => {
            let mut u = SensorUpdate::new(SensorCategory::Depth, 0, timestamp);
            if let Some(depth) = depth_m {
                u.push("depth_below_transducer", FieldValue::Float(*depth));
                u.push_claimed(
                    "depth",
                    FieldValue::Float(*depth),
                    arbitration::depth_claim(DepthReference::Transducer),
                );
            }
            if let Some(offset) = offset_m {
                u.push("transducer_offset", FieldValue::Float(*offset));
            }
            vec![u]
        }

        DecodedFrame::PositionRapid {
            latitude_deg,
            longitude_deg,
        } => {
            let mut u = SensorUpdate::new(SensorCategory::Gps, 0, timestamp);
            if let (Some(lat), Some(lon)) = (latitude_deg, longitude_deg) {
                u.push("latitude", FieldValue::Float(*lat));
                u.push("longitude", FieldValue::Float(*lon));
            }
            vec![u]
        }

        DecodedFrame::CogSog { cog_rad, sog_ms } => {
            let mut u = SensorUpdate::new(SensorCategory::Gps, 0, timestamp);
            if let Some(cog) = cog_rad {
                u.push(
                    "course_over_ground",
                    FieldValue::Float(normalize_bearing(degrees_from_radians(*cog))),
                );
            }
            if let Some(sog) = sog_ms {
                u.push("speed_over_ground", FieldValue::Float(knots_from_mps(*sog)));
            }
            vec![u]
        }

        DecodedFrame::GnssPosition {
            latitude_deg,
            longitude_deg,
            altitude_m,
            satellites,
        } => {
            let mut u = SensorUpdate::new(SensorCategory::Gps, 0, timestamp);
            if let (Some(lat), Some(lon)) = (latitude_deg, longitude_deg) {
                u.push("latitude", FieldValue::Float(*lat));
                u.push("longitude", FieldValue::Float(*lon));
            }
            if let Some(alt) = altitude_m {
                u.push("altitude", FieldValue::Float(*alt));
            }
            if let Some(n) = satellites {
                u.push("satellites", FieldValue::Integer(*n as i64));
            }
            vec![u]
        }

        DecodedFrame::CrossTrackError { xte_m } => {
            let mut u = SensorUpdate::new(SensorCategory::Navigation, 0, timestamp);
            if let Some(xte) = xte_m {
                u.push("cross_track_error", FieldValue::Float(*xte));
            }
            vec![u]
        }

        DecodedFrame::NavigationData {
            distance_m,
            bearing_rad,
            waypoint_number,
        } => {
            let mut u = SensorUpdate::new(SensorCategory::Navigation, 0, timestamp);
            if let Some(d) = distance_m {
                u.push("distance_to_waypoint", FieldValue::Float(*d));
            }
            if let Some(b) = bearing_rad {
                u.push(
                    "bearing_to_waypoint",
                    FieldValue::Float(normalize_bearing(degrees_from_radians(*b))),
                );
            }
            if let Some(n) = waypoint_number {
                u.push("waypoint_id", FieldValue::Integer(*n as i64));
            }
            vec![u]
        }

        DecodedFrame::RouteWaypoint { route_id, route_name } => {
            let mut u = SensorUpdate::new(SensorCategory::Navigation, 0, timestamp);
            if let Some(id) = route_id {
                u.push("route_id", FieldValue::Integer(*id as i64));
            }
            if let Some(name) = route_name {
                u.push("route_name", FieldValue::Text(name.clone()));
            }
            vec![u]
        }

        DecodedFrame::Wind {
            reference,
            speed_ms,
            angle_rad,
        } => {
            let Some(reference) = reference else {
                return Err(DecodeError::invalid(label(), "wind reference not available"));
            };
            let mut u = SensorUpdate::new(SensorCategory::Wind, 0, timestamp);
            let speed = speed_ms.map(|v| knots_from_mps(v));
            let angle = angle_rad.map(|v| degrees_from_radians(v));
            match reference {
                WindReference::Apparent => {
                    if let Some(a) = angle {
                        u.push("apparent_angle", FieldValue::Float(normalize_relative(a)));
                    }
                    if let Some(s) = speed {
                        u.push("apparent_speed", FieldValue::Float(s));
                    }
                }
                WindReference::TrueNorth | WindReference::MagneticNorth => {
                    if let Some(a) = angle {
                        u.push("direction", FieldValue::Float(normalize_bearing(a)));
                    }
                    if let Some(s) = speed {
                        u.push("true_speed", FieldValue::Float(s));
                    }
                }
                WindReference::TrueBoat => {
                    if let Some(a) = angle {
                        u.push("true_angle", FieldValue::Float(normalize_relative(a)));
                    }
                    if let Some(s) = speed {
                        u.push("true_speed", FieldValue::Float(s));
                    }
                }
            }
            vec![u]
        }

        DecodedFrame::Environment {
            water_temperature_k,
            air_temperature_k,
            pressure_pa,
        } => {
            let mut u = SensorUpdate::new(SensorCategory::Temperature, 0, timestamp);
            if let Some(t) = water_temperature_k {
                u.push_claimed(
                    "water_temperature",
                    FieldValue::Float(celsius_from_kelvin(*t)),
                    arbitration::water_temp_claim(),
                );
            }
            if let Some(t) = air_temperature_k {
                u.push("air_temperature", FieldValue::Float(celsius_from_kelvin(*t)));
            }
            if let Some(p) = pressure_pa {
                u.push("air_pressure", FieldValue::Float(*p));
            }
            vec![u]
        }

        DecodedFrame::Temperature {
            instance,
            source,
            actual_k,
            set_k,
        } => {
            let mut u = SensorUpdate::new(SensorCategory::Temperature, *instance, timestamp);
            if let Some(t) = actual_k.map(|k| celsius_from_kelvin(k)) {
                // Source 0 is sea temperature, 1 outside air; anything else is
                // a generic probe
                match source {
                    0 => u.push_claimed(
                        "water_temperature",
                        FieldValue::Float(t),
                        arbitration::water_temp_claim(),
                    ),
                    1 => u.push("air_temperature", FieldValue::Float(t)),
                    _ => u.push("actual", FieldValue::Float(t)),
                }
            }
            if let Some(t) = set_k {
                u.push("set_point", FieldValue::Float(celsius_from_kelvin(*t)));
            }
            vec![u]
        }
    };

    let updates: Vec<SensorUpdate> = updates.into_iter().filter(|u| !u.is_empty()).collect();
    if updates.is_empty() {
        return Err(DecodeError::invalid(label(), "no mappable fields"));
    }
    Ok(updates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameDecoder;
    use chrono::Utc;

    fn map(frame: BinaryFrame) -> Result<Vec<SensorUpdate>> {
        let decoded = FrameDecoder::decode(&frame)?;
        map_frame(&frame, &decoded, Utc::now())
    }

    #[test]
    fn test_engine_rapid_update() {
        let frame = BinaryFrame::new(
            127488,
            0x23,
            vec![0x00, 0x20, 0x1C, 0xFF, 0xFF, 0x7F, 0xFF, 0xFF],
        );
        let updates = map(frame).unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].category, SensorCategory::Engine);
        assert_eq!(updates[0].field("rpm"), Some(&FieldValue::Float(1800.0)));
    }

    #[test]
    fn test_battery_temperature_converted_to_celsius() {
        // 298.15 K = 25 C
        let voltage: u16 = 1260;
        let temp: u16 = 29815;
        let mut payload = vec![0x01];
        payload.extend_from_slice(&voltage.to_le_bytes());
        payload.extend_from_slice(&[0xFF, 0x7F]);
        payload.extend_from_slice(&temp.to_le_bytes());
        let updates = map(BinaryFrame::new(127508, 0x20, payload)).unwrap();
        let u = &updates[0];
        assert_eq!(u.instance, 1);
        assert_eq!(u.field("voltage"), Some(&FieldValue::Float(12.6)));
        let celsius = u.field("temperature").unwrap().as_f64().unwrap();
        assert!((celsius - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_depth_frame_claims_transducer_priority() {
        let frame = BinaryFrame::new(
            128267,
            0x10,
            vec![0x01, 0x08, 0x02, 0x00, 0x00, 0xF4, 0x01, 0xFF],
        );
        let updates = map(frame).unwrap();
        let claimed = updates[0].fields.iter().find(|f| f.key == "depth").unwrap();
        assert_eq!(claimed.claim.unwrap().priority, 2);
        assert_eq!(
            updates[0].field("depth_below_transducer"),
            Some(&FieldValue::Float(5.2))
        );
    }

    #[test]
    fn test_speed_frame_converted_to_knots() {
        // 5.0 m/s through water
        let water: u16 = 500;
        let mut payload = vec![0x00];
        payload.extend_from_slice(&water.to_le_bytes());
        payload.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
        let updates = map(BinaryFrame::new(128259, 0x15, payload)).unwrap();
        let knots = updates[0].field("through_water").unwrap().as_f64().unwrap();
        assert!((knots - 9.719_222).abs() < 1e-5);
    }

    #[test]
    fn test_apparent_wind_frame_normalized() {
        // angle 200 degrees apparent
        let speed: u16 = 1000;
        let angle: u16 = (200.0_f64.to_radians() * 1e4) as u16;
        let mut payload = vec![0x00];
        payload.extend_from_slice(&speed.to_le_bytes());
        payload.extend_from_slice(&angle.to_le_bytes());
        payload.push(0x02);
        let updates = map(BinaryFrame::new(130306, 0x07, payload)).unwrap();
        let a = updates[0].field("apparent_angle").unwrap().as_f64().unwrap();
        assert!((a + 160.0).abs() < 0.01);
    }

    #[test]
    fn test_fluid_level_names_type() {
        let level: i16 = 12500;
        let mut payload = vec![0x01];
        payload.extend_from_slice(&level.to_le_bytes());
        payload.extend_from_slice(&[0xFF, 0xFF, 0xFF, 0xFF]);
        let updates = map(BinaryFrame::new(127505, 0x30, payload)).unwrap();
        let u = &updates[0];
        assert_eq!(u.field("level"), Some(&FieldValue::Float(50.0)));
        assert_eq!(
            u.field("fluid_type"),
            Some(&FieldValue::Text("fuel".to_string()))
        );
    }

    #[test]
    fn test_temperature_frame_sea_source_claims_water_temp() {
        let actual: u16 = 29015; // 17 C
        let mut payload = vec![0x00, 0x00, 0x00];
        payload.extend_from_slice(&actual.to_le_bytes());
        payload.extend_from_slice(&[0xFF, 0xFF]);
        let updates = map(BinaryFrame::new(130312, 0x40, payload)).unwrap();
        let claimed = updates[0]
            .fields
            .iter()
            .find(|f| f.key == "water_temperature")
            .unwrap();
        assert_eq!(claimed.claim.unwrap().priority, 2);
    }

    #[test]
    fn test_cog_sog_frame() {
        let cog: u16 = 7854; // 0.7854 rad = 45 degrees
        let sog: u16 = 515; // 5.15 m/s
        let mut payload = vec![0x00, 0x00];
        payload.extend_from_slice(&cog.to_le_bytes());
        payload.extend_from_slice(&sog.to_le_bytes());
        let updates = map(BinaryFrame::new(129026, 0x05, payload)).unwrap();
        let u = &updates[0];
        let cog_deg = u.field("course_over_ground").unwrap().as_f64().unwrap();
        assert!((cog_deg - 45.0).abs() < 0.01);
        let sog_kn = u.field("speed_over_ground").unwrap().as_f64().unwrap();
        assert!((sog_kn - 10.010_799).abs() < 1e-5);
    }
}
