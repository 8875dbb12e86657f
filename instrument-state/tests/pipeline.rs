//! End-to-end tests: wire messages in, store state and instance set out

use chrono::{Duration, TimeZone, Utc};
use instrument_state::{Pipeline, TrackerConfig};
use nmea_decoder::types::{BinaryFrame, FieldValue, SensorCategory, Timestamp};
use nmea_decoder::DecoderConfig;
use std::cell::RefCell;
use std::rc::Rc;

fn base() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::new(
        DecoderConfig::new(),
        TrackerConfig::new()
            .with_stale_after_ms(10_000)
            .with_min_notify_gap_ms(0),
    )
}

#[test]
fn rpm_sentence_end_to_end() {
    let mut p = pipeline();
    assert_eq!(p.process_line("$IIRPM,E,0,1800.0,A*6C", base()), 1);

    let state = p.store().state(SensorCategory::Engine, 0).unwrap();
    assert_eq!(state.value("rpm"), Some(&FieldValue::Float(1800.0)));
    assert!(p.tracker().contains(SensorCategory::Engine, 0));
}

#[test]
fn depth_priority_holds_in_delivery_order() {
    // Waterline -> transducer -> keel: the primary field keeps the waterline
    // reading even after lower-priority messages arrive
    let mut p = pipeline();
    let t = base();
    p.process_line("$SDDBS,,f,10.0,M,,F", t);
    p.process_line("$SDDBT,,f,8.0,M,,F", t);
    p.process_line("$SDDBK,,f,7.0,M,,F", t);

    let state = p.store().state(SensorCategory::Depth, 0).unwrap();
    assert_eq!(state.value("depth"), Some(&FieldValue::Float(10.0)));
    // Raw reference-specific readings are all retained
    assert_eq!(state.value("depth_below_surface"), Some(&FieldValue::Float(10.0)));
    assert_eq!(state.value("depth_below_transducer"), Some(&FieldValue::Float(8.0)));
    assert_eq!(state.value("depth_below_keel"), Some(&FieldValue::Float(7.0)));
}

#[test]
fn depth_priority_upgrades_in_reverse_order() {
    let mut p = pipeline();
    let t = base();
    p.process_line("$SDDBK,,f,7.0,M,,F", t);
    let state = p.store().state(SensorCategory::Depth, 0).unwrap();
    assert_eq!(state.value("depth"), Some(&FieldValue::Float(7.0)));

    p.process_line("$SDDBT,,f,8.0,M,,F", t);
    let state = p.store().state(SensorCategory::Depth, 0).unwrap();
    assert_eq!(state.value("depth"), Some(&FieldValue::Float(8.0)));

    p.process_line("$SDDBS,,f,10.0,M,,F", t);
    let state = p.store().state(SensorCategory::Depth, 0).unwrap();
    assert_eq!(state.value("depth"), Some(&FieldValue::Float(10.0)));

    // And never regresses afterwards
    p.process_line("$SDDBT,,f,8.5,M,,F", t);
    let state = p.store().state(SensorCategory::Depth, 0).unwrap();
    assert_eq!(state.value("depth"), Some(&FieldValue::Float(10.0)));
}

#[test]
fn binary_and_ascii_depth_share_arbitration() {
    let mut p = pipeline();
    let t = base();
    // Surface-referenced sentence first
    p.process_line("$SDDBS,,f,10.0,M,,F", t);
    // Transducer-referenced frame: depth 5.2 m
    let frame = BinaryFrame::new(
        128267,
        0x10,
        vec![0x01, 0x08, 0x02, 0x00, 0x00, 0xF4, 0x01, 0xFF],
    );
    assert_eq!(p.process_frame(&frame, t), 1);

    let state = p.store().state(SensorCategory::Depth, 0).unwrap();
    assert_eq!(state.value("depth"), Some(&FieldValue::Float(10.0)));
    assert_eq!(state.value("depth_below_transducer"), Some(&FieldValue::Float(5.2)));
}

#[test]
fn apparent_wind_angle_normalized_end_to_end() {
    let mut p = pipeline();
    p.process_line("$WIMWV,200.0,R,12.0,N,A", base());
    let state = p.store().state(SensorCategory::Wind, 0).unwrap();
    assert_eq!(state.value("apparent_angle"), Some(&FieldValue::Float(-160.0)));
}

#[test]
fn transducer_tuples_merge_across_sentences() {
    // Voltage then temperature for the same battery: the second update must
    // not erase the first field
    let mut p = pipeline();
    let t = base();
    p.process_line("$IIXDR,U,12.6,V,BATT0", t);
    p.process_line("$IIXDR,C,23.5,C,BATT0", t + Duration::seconds(1));

    let state = p.store().state(SensorCategory::Battery, 0).unwrap();
    assert_eq!(state.value("voltage"), Some(&FieldValue::Float(12.6)));
    assert_eq!(state.value("temperature"), Some(&FieldValue::Float(23.5)));
    assert_eq!(p.tracker().len(), 1);
}

#[test]
fn text_only_state_never_detects_an_instance() {
    let mut p = pipeline();
    let t = base();
    // Route/waypoint frame carrying only a route name (id not available)
    let mut payload = vec![0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00];
    payload.extend_from_slice(&[0x06, 0x01, b'H', b'O', b'M', b'E']);
    let frame = BinaryFrame::new(129285, 0x0A, payload);
    assert_eq!(p.process_frame(&frame, t), 1);

    // State exists, but no measurement yet: no widget
    let state = p.store().state(SensorCategory::Navigation, 0).unwrap();
    assert_eq!(
        state.value("route_name"),
        Some(&FieldValue::Text("HOME".to_string()))
    );
    assert!(!p.tracker().contains(SensorCategory::Navigation, 0));

    // One real measurement flips it to detected
    let xte: i32 = 1250;
    let mut payload = vec![0x00, 0x00];
    payload.extend_from_slice(&xte.to_le_bytes());
    let frame = BinaryFrame::new(129283, 0x0A, payload);
    assert_eq!(p.process_frame(&frame, t), 1);
    assert!(p.tracker().contains(SensorCategory::Navigation, 0));
    assert_eq!(p.tracker().len(), 1);
}

#[test]
fn stale_instance_expires_and_is_recreated() {
    let mut p = pipeline();
    let t0 = base();
    p.process_line("$IIRPM,E,0,1800.0,A*6C", t0);
    assert!(p.tracker().contains(SensorCategory::Engine, 0));

    // Past the 10 s staleness threshold the sweep removes it
    let t1 = t0 + Duration::seconds(11);
    p.tick(t1);
    assert!(!p.tracker().contains(SensorCategory::Engine, 0));
    // Store state survives; only the projection expired
    assert!(p.store().state(SensorCategory::Engine, 0).is_some());

    // Data resumes: the instance is created anew
    let t2 = t1 + Duration::seconds(1);
    p.process_line("$IIRPM,E,0,1750.0,A", t2);
    assert!(p.tracker().contains(SensorCategory::Engine, 0));
    assert_eq!(p.tracker().snapshot()[0].last_seen, t2);
}

#[test]
fn short_engine_frame_counts_one_failure_and_emits_nothing() {
    let mut p = pipeline();
    let frame = BinaryFrame::new(127488, 0x23, vec![0x01, 0x20]);
    assert_eq!(p.process_frame(&frame, base()), 0);

    assert_eq!(p.stats().frames_seen, 1);
    assert_eq!(p.stats().frames_failed, 1);
    assert_eq!(p.stats().updates_emitted, 0);
    assert!(p.store().is_empty());
    assert!(p.tracker().is_empty());
}

#[test]
fn unsupported_sentence_counted_separately() {
    let mut p = pipeline();
    assert_eq!(p.process_line("$GPZDA,160012.71,11,03,2004,-1,00", base()), 0);
    assert_eq!(p.stats().sentences_seen, 1);
    assert_eq!(p.stats().sentences_failed, 1);
    assert_eq!(p.stats().unsupported, 1);
}

#[test]
fn mixed_feed_builds_instrument_panel() {
    let snapshots: Rc<RefCell<Vec<Vec<String>>>> = Rc::new(RefCell::new(Vec::new()));
    let mut p = pipeline();
    let sink = Rc::clone(&snapshots);
    p.tracker_mut().subscribe(move |instances| {
        sink.borrow_mut()
            .push(instances.iter().map(|d| d.id.clone()).collect());
    });

    let t = base();
    let feed = [
        "$GPRMC,123519,A,4807.038,N,01131.000,E,5.5,084.4,230394,,",
        "$HCHDG,101.1,0.5,E,7.5,W",
        "$SDDPT,3.2,0.5",
        "$WIMWV,214.8,R,10.1,N,A",
        "$IIRPM,E,0,1800.0,A*6C",
        "$IIRPM,E,1,1810.0,A",
        "$IIXDR,U,12.6,V,BATT0",
    ];
    for (i, line) in feed.iter().enumerate() {
        assert!(
            p.process_line(line, t + Duration::milliseconds(i as i64 * 100)) > 0,
            "{line}"
        );
    }

    let ids: Vec<String> = p.tracker().snapshot().into_iter().map(|d| d.id).collect();
    assert_eq!(
        ids,
        vec![
            "gps-0",
            "compass-0",
            "wind-0",
            "depth-0",
            "engine-0",
            "engine-1",
            "battery-0"
        ]
    );
    // One notification per net change
    assert_eq!(snapshots.borrow().len(), 7);
    assert_eq!(p.stats().updates_emitted, 7);
    assert_eq!(p.stats().sentences_failed, 0);
}
