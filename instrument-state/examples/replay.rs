//! Replay a short mixed telemetry feed through the full pipeline and print
//! the instrument panel as it changes.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example replay
//! ```

use anyhow::Result;
use instrument_state::{Pipeline, TrackerConfig};
use nmea_decoder::types::BinaryFrame;
use nmea_decoder::DecoderConfig;

fn main() -> Result<()> {
    env_logger::init();

    let mut pipeline = Pipeline::new(
        DecoderConfig::new(),
        TrackerConfig::new().with_min_notify_gap_ms(0),
    );

    pipeline.tracker_mut().subscribe(|instances| {
        println!("-- panel now shows {} instruments", instances.len());
        for instance in instances {
            println!("   [{}] {}", instance.group, instance.title);
        }
    });

    let now = chrono::Utc::now();
    let lines = [
        "$GPRMC,123519,A,4807.038,N,01131.000,E,5.5,084.4,230394,,",
        "$SDDBT,11.5,f,3.5,M,1.9,F",
        "$IIRPM,E,0,1800.0,A*6C",
        "$IIXDR,U,12.6,V,BATT0",
    ];
    for line in lines {
        pipeline.process_line(line, now);
    }

    // A battery status frame for the second bank arrives on the bus side
    let voltage: u16 = 1282;
    let mut payload = vec![0x01];
    payload.extend_from_slice(&voltage.to_le_bytes());
    payload.extend_from_slice(&[0xFF, 0x7F, 0xFF, 0xFF]);
    pipeline.process_frame(&BinaryFrame::new(127508, 0x20, payload), now);

    pipeline.tick(now);

    let stats = pipeline.stats();
    println!(
        "\nprocessed {} sentences and {} frames, {} updates",
        stats.sentences_seen, stats.frames_seen, stats.updates_emitted
    );
    Ok(())
}
