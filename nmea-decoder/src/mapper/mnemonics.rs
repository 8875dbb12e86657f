//! Generic-transducer mnemonic table
//!
//! A transducer 4-tuple carries a short textual identifier encoding device
//! family and instance ("BATT0", "ENGINE#1", "AIRTEMP"). The table below is
//! closed: an identifier that matches no family is a structured
//! "unrecognized mnemonic" result, counted by the caller, never a silent
//! continuation.

use crate::types::SensorCategory;

/// Device family encoded by a transducer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MnemonicFamily {
    Battery,
    Engine,
    Tank,
    AirTemperature,
    WaterTemperature,
    Temperature,
    Rudder,
    Pitch,
    Roll,
}

impl MnemonicFamily {
    /// The sensor category updates for this family are routed to
    pub fn category(&self) -> SensorCategory {
        match self {
            MnemonicFamily::Battery => SensorCategory::Battery,
            MnemonicFamily::Engine => SensorCategory::Engine,
            MnemonicFamily::Tank => SensorCategory::Tank,
            MnemonicFamily::AirTemperature
            | MnemonicFamily::WaterTemperature
            | MnemonicFamily::Temperature => SensorCategory::Temperature,
            MnemonicFamily::Rudder => SensorCategory::Rudder,
            MnemonicFamily::Pitch | MnemonicFamily::Roll => SensorCategory::Compass,
        }
    }
}

/// A successfully matched identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MnemonicMatch {
    pub family: MnemonicFamily,
    pub instance: u8,
}

/// Structured result for identifiers outside the closed table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized transducer mnemonic: {0}")]
pub struct UnrecognizedMnemonic(pub String);

/// Family stems, longest-first where one is a prefix of another. The stem
/// must match the identifier exactly once the instance suffix is stripped.
const FAMILIES: &[(&str, MnemonicFamily)] = &[
    ("BATTERY", MnemonicFamily::Battery),
    ("BATT", MnemonicFamily::Battery),
    ("BAT", MnemonicFamily::Battery),
    ("ENGINE", MnemonicFamily::Engine),
    ("ENG", MnemonicFamily::Engine),
    ("FUEL", MnemonicFamily::Tank),
    ("FRESHWATER", MnemonicFamily::Tank),
    ("WASTE", MnemonicFamily::Tank),
    ("TANK", MnemonicFamily::Tank),
    ("AIRTEMP", MnemonicFamily::AirTemperature),
    ("WATERTEMP", MnemonicFamily::WaterTemperature),
    ("SEATEMP", MnemonicFamily::WaterTemperature),
    ("TEMP", MnemonicFamily::Temperature),
    ("RUDDER", MnemonicFamily::Rudder),
    ("PITCH", MnemonicFamily::Pitch),
    ("ROLL", MnemonicFamily::Roll),
];

/// Match an identifier against the mnemonic table
///
/// Case-insensitive; an optional `#` may separate stem and instance; a
/// missing instance suffix means instance 0.
pub fn match_mnemonic(id: &str) -> Result<MnemonicMatch, UnrecognizedMnemonic> {
    let upper = id.trim().to_ascii_uppercase();
    let (stem, suffix) = split_suffix(&upper);

    let instance: u8 = if suffix.is_empty() {
        0
    } else {
        suffix
            .parse()
            .map_err(|_| UnrecognizedMnemonic(id.to_string()))?
    };

    for (name, family) in FAMILIES {
        if stem == *name {
            return Ok(MnemonicMatch {
                family: *family,
                instance,
            });
        }
    }
    Err(UnrecognizedMnemonic(id.to_string()))
}

/// Split a trailing decimal instance suffix (and optional `#`) off the stem
fn split_suffix(id: &str) -> (&str, &str) {
    let digits_at = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .map(|(i, _)| i)
        .last();
    match digits_at {
        Some(i) => {
            let stem = &id[..i];
            (stem.strip_suffix('#').unwrap_or(stem), &id[i..])
        }
        None => (id.strip_suffix('#').unwrap_or(id), ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_battery_variants() {
        for id in ["BAT0", "BATT0", "BATTERY0", "bat0"] {
            let m = match_mnemonic(id).unwrap();
            assert_eq!(m.family, MnemonicFamily::Battery, "{id}");
            assert_eq!(m.instance, 0, "{id}");
        }
    }

    #[test]
    fn test_instance_suffix() {
        assert_eq!(match_mnemonic("ENGINE#1").unwrap().instance, 1);
        assert_eq!(match_mnemonic("ENG2").unwrap().instance, 2);
        assert_eq!(match_mnemonic("FUEL").unwrap().instance, 0);
        assert_eq!(match_mnemonic("BATT12").unwrap().instance, 12);
    }

    #[test]
    fn test_temperature_families() {
        assert_eq!(
            match_mnemonic("AIRTEMP").unwrap().family,
            MnemonicFamily::AirTemperature
        );
        assert_eq!(
            match_mnemonic("WATERTEMP0").unwrap().family,
            MnemonicFamily::WaterTemperature
        );
        assert_eq!(
            match_mnemonic("TEMP3").unwrap().family,
            MnemonicFamily::Temperature
        );
    }

    #[test]
    fn test_attitude_families() {
        assert_eq!(match_mnemonic("PITCH").unwrap().family, MnemonicFamily::Pitch);
        assert_eq!(match_mnemonic("ROLL").unwrap().family, MnemonicFamily::Roll);
        assert_eq!(
            match_mnemonic("PITCH").unwrap().family.category(),
            SensorCategory::Compass
        );
    }

    #[test]
    fn test_unrecognized() {
        for id in ["FOO0", "BATX1", "ENGINEOIL", "", "TEMP999"] {
            assert!(match_mnemonic(id).is_err(), "{id}");
        }
    }

    #[test]
    fn test_category_routing() {
        assert_eq!(
            match_mnemonic("FUEL1").unwrap().family.category(),
            SensorCategory::Tank
        );
        assert_eq!(
            match_mnemonic("RUDDER").unwrap().family.category(),
            SensorCategory::Rudder
        );
    }
}
