//! End-to-end pipeline test: replayed bytes through reassembly, ledger,
//! markers, recording, and CSV export.

use std::time::Duration;

use anyhow::{Context, Result, ensure};
use futures::StreamExt;

use adclink::wire::format::{CHANNEL_COUNT, FOOTER_SIZE, PACKET_SIZE, encode};
use adclink::{Adclink, AcquisitionError, ChannelLabels, ReplayTransport, SampleIndex, UpdateRate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adclink=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

fn frame_of(value: u16) -> [u8; PACKET_SIZE] {
    encode(&[value; CHANNEL_COUNT])
}

/// A capture with leading noise, one corrupted frame, and three good frames.
fn noisy_capture() -> Vec<u8> {
    let mut capture = vec![0x5A; 37]; // line noise before the device syncs

    let mut corrupt = frame_of(999).to_vec();
    let len = corrupt.len();
    corrupt[len - FOOTER_SIZE..].copy_from_slice(&[0, 0, 0, 0]);
    capture.extend_from_slice(&corrupt);

    for value in [100u16, 200, 300] {
        capture.extend_from_slice(&frame_of(value));
    }
    capture
}

#[tokio::test]
async fn replay_to_csv_round_trip() -> Result<()> {
    init_tracing();

    let transport =
        ReplayTransport::with_pacing(noisy_capture(), 64, Duration::from_millis(1));
    let handle = Adclink::attach(transport);
    let ledger = handle.ledger();

    // Arm recording and place a marker before the first frame arrives:
    // it must land on index 0.
    ledger.start_recording();
    ensure!(ledger.add_marker("baseline") == SampleIndex(0));

    // Drain the live stream until the replay ends.
    let mut batches = handle.subscribe(UpdateRate::Native);
    let mut last_seen = None;
    while let Some(batch) = batches.next().await {
        last_seen = Some(batch.index);
    }
    ensure!(last_seen == Some(SampleIndex(2)), "final batch not observed: {last_seen:?}");

    handle.stop().await.context("replay should end cleanly")?;

    // The corrupted frame was resynchronized past, not ingested; the three
    // good frames got gapless indices 0..=2.
    ensure!(ledger.next_index() == SampleIndex(3));
    let snapshot = ledger.snapshot_for_render();
    ensure!(snapshot.channels[0] == vec![100, 200, 300]);

    ledger.stop_recording();

    let dir = tempfile::tempdir().context("tempdir")?;
    let path = dir.path().join("session.csv");
    let labels = ChannelLabels::default();
    adclink::export::export_recording(&ledger, &labels, &path)
        .context("export should succeed")?;

    let csv = std::fs::read_to_string(&path).context("reading export back")?;
    let mut lines = csv.lines();

    let header = lines.next().context("header line")?;
    ensure!(header.starts_with("SampleIndex,Channel CH00,"));
    ensure!(header.ends_with("MarkerIndex,MarkerLabel"));

    let rows: Vec<&str> = lines.collect();
    ensure!(rows.len() == 3, "expected 3 data rows, got {}", rows.len());
    ensure!(rows[0].starts_with("0,100,"));
    ensure!(rows[0].ends_with(",0,baseline"), "marker row malformed: {}", rows[0]);
    ensure!(rows[1].ends_with(",,"));
    ensure!(rows[2].starts_with("2,300,"));

    Ok(())
}

#[tokio::test]
async fn export_before_any_recording_is_rejected() {
    let transport = ReplayTransport::with_pacing(
        frame_of(1).to_vec(),
        PACKET_SIZE,
        Duration::from_millis(1),
    );
    let handle = Adclink::attach(transport);
    let ledger = handle.ledger();

    // Frames may flow, but recording was never armed.
    handle.stop().await.expect("clean stop");

    let dir = tempfile::tempdir().expect("tempdir");
    let err = adclink::export::export_recording(
        &ledger,
        &ChannelLabels::default(),
        dir.path().join("none.csv"),
    )
    .unwrap_err();
    assert!(matches!(err, AcquisitionError::EmptyRecording));
}

#[tokio::test]
async fn missing_capture_file_fails_at_open() {
    let Err(err) = Adclink::replay("/nonexistent/capture.bin").await else {
        panic!("opening a missing capture must fail");
    };
    assert!(matches!(err, AcquisitionError::Transport { .. }));
}
