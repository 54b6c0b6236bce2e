//! CSV export of recorded sample snapshots.
//!
//! Column layout, in fixed order:
//!
//! ```text
//! SampleIndex, Channel <label_0>, ..., Channel <label_39>, MarkerIndex, MarkerLabel
//! ```
//!
//! Each data row is one recorded snapshot. `MarkerIndex`/`MarkerLabel` are
//! both empty unless the row's index carries a marker, in which case
//! `MarkerIndex` repeats `SampleIndex` and `MarkerLabel` holds the label.
//!
//! A failed export never touches the in-memory recording; the requester can
//! fix the destination and try again.

use std::borrow::Cow;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::config::ChannelLabels;
use crate::error::{AcquisitionError, Result};
use crate::ledger::{SampleLedger, SampleRecord};

/// Write recorded snapshots as CSV to `writer`.
pub fn write_csv<W: Write>(
    records: &[SampleRecord],
    labels: &ChannelLabels,
    writer: &mut W,
) -> io::Result<()> {
    write!(writer, "SampleIndex")?;
    for label in labels.iter() {
        write!(writer, ",{}", escape(&format!("Channel {label}")))?;
    }
    writeln!(writer, ",MarkerIndex,MarkerLabel")?;

    for record in records {
        write!(writer, "{}", record.index)?;
        for value in &record.channels {
            write!(writer, ",{value}")?;
        }
        match &record.marker {
            Some(label) => writeln!(writer, ",{},{}", record.index, escape(label))?,
            None => writeln!(writer, ",,")?,
        }
    }

    writer.flush()
}

/// Export `records` to a CSV file at `path`.
///
/// I/O failures map to [`AcquisitionError::ExportWrite`] with path context.
pub fn export_to_path<P: AsRef<Path>>(
    records: &[SampleRecord],
    labels: &ChannelLabels,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let write = || -> io::Result<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_csv(records, labels, &mut writer)
    };
    write().map_err(|e| AcquisitionError::export_write_error(path.to_path_buf(), e))?;
    info!(rows = records.len(), path = %path.display(), "recording exported");
    Ok(())
}

/// Export a ledger's current recording to `path`.
///
/// Fails with [`AcquisitionError::EmptyRecording`] when nothing has been
/// recorded. The recording itself is retained whether or not the write
/// succeeds.
pub fn export_recording<P: AsRef<Path>>(
    ledger: &SampleLedger,
    labels: &ChannelLabels,
    path: P,
) -> Result<()> {
    let records = ledger.export_snapshot()?;
    export_to_path(&records, labels, path)
}

/// Minimal RFC 4180 quoting: fields containing a comma, quote, or line
/// break are wrapped in quotes with embedded quotes doubled.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains(['"', ',', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
