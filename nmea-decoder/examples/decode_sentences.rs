//! Decode a handful of canned sentences and print the resulting updates.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example decode_sentences
//! ```

use nmea_decoder::stats::DecoderStats;
use nmea_decoder::{DecoderConfig, ParsedSentence, SensorMapper, SentenceParser};

fn main() {
    env_logger::init();

    let mapper = SensorMapper::new(DecoderConfig::new());
    let mut stats = DecoderStats::new();
    let now = chrono::Utc::now();

    let feed = [
        "$GPRMC,123519,A,4807.038,N,01131.000,E,5.5,084.4,230394,,",
        "$SDDPT,3.2,0.5",
        "$WIMWV,214.8,R,10.1,N,A",
        "$IIRPM,E,0,1800.0,A*6C",
        "$IIXDR,U,12.6,V,BATT0,C,23.5,C,BATT0",
        "$GPZDA,160012.71,11,03,2004,-1,00",
        "not a sentence",
    ];

    for line in feed {
        println!("{}", line);
        let result = SentenceParser::parse(line)
            .and_then(|raw| {
                ParsedSentence::from_raw(&raw).map(|parsed| (raw, parsed))
            })
            .and_then(|(raw, parsed)| mapper.map_sentence(&raw, &parsed, now, &mut stats));
        match result {
            Ok(updates) => {
                for update in updates {
                    println!("  -> {} instance {}", update.category, update.instance);
                    for field in &update.fields {
                        println!("     {} = {}", field.key, field.value);
                    }
                }
            }
            Err(e) => println!("  dropped: {}", e),
        }
    }

    println!("\nunrecognized mnemonics: {}", stats.unrecognized_mnemonics);
}
