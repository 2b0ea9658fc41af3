//! ADIF record encoder and export preamble.

use std::fmt::Write as _;
use std::io::{self, Write};

use chrono::{DateTime, Utc};

use crate::models::QsoRecord;

/// ADIF version declared in every export header.
pub const ADIF_VERSION: &str = "3.1.0";

/// Values written into the export preamble.
#[derive(Debug, Clone)]
pub struct ExportHeader {
    pub program_id: String,
    pub program_version: String,
    pub generated_at: DateTime<Utc>,
}

/// Encode one record as a line of ADIF ending in `<EOR>`.
///
/// Fields are written in a fixed order; empty strings, zero numbers, and
/// `false` are omitted. Declared lengths count characters.
pub fn encode_record(record: &QsoRecord) -> String {
    let mut out = String::with_capacity(256);

    push_field(&mut out, "CALL", &record.callsign);
    push_field(&mut out, "QSO_DATE", &compact(&record.date, b'-', &[4, 7]));
    push_field(&mut out, "TIME_ON", &compact(&record.time_on, b':', &[2, 5]));
    push_field(&mut out, "TIME_OFF", &compact(&record.time_off, b':', &[2, 5]));
    if record.frequency_mhz != 0.0 {
        push_field(&mut out, "FREQ", &record.frequency_mhz.to_string());
    }
    push_field(&mut out, "BAND", &record.band);
    push_field(&mut out, "MODE", &record.mode);
    push_field(&mut out, "RST_SENT", &record.rst_sent);
    push_field(&mut out, "RST_RCVD", &record.rst_received);
    push_field(&mut out, "NAME", &record.operator_name);
    push_field(&mut out, "QTH", &record.location);
    push_field(&mut out, "COUNTRY", &record.country);
    push_field(&mut out, "GRIDSQUARE", &record.grid_square);
    if record.power_watts != 0 {
        push_field(&mut out, "TX_PWR", &record.power_watts.to_string());
    }
    push_field(&mut out, "COMMENT", &record.comment);
    if record.confirmed {
        push_field(&mut out, "QSL_RCVD", "Y");
    }

    out.push_str("<EOR>\n");
    out
}

/// Drop the separators from `YYYY-MM-DD` or `HH:MM:SS`. A value of any
/// other shape is returned unchanged.
fn compact(value: &str, sep: u8, sep_at: &[usize]) -> String {
    let bytes = value.as_bytes();
    let expected_len = sep_at.last().map_or(0, |last| last + 3);
    let shaped = bytes.len() == expected_len
        && bytes.iter().enumerate().all(|(i, &b)| {
            if sep_at.contains(&i) {
                b == sep
            } else {
                b.is_ascii_digit()
            }
        });
    if shaped {
        value.bytes().filter(|&b| b != sep).map(char::from).collect()
    } else {
        value.to_string()
    }
}

fn push_field(out: &mut String, name: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    // Writing to a String cannot fail.
    let _ = write!(out, "<{}:{}>{} ", name, value.chars().count(), value);
}

/// Write the export preamble, ending with `<EOH>` and a blank line.
pub fn write_header<W: Write>(w: &mut W, header: &ExportHeader) -> io::Result<()> {
    writeln!(
        w,
        "Generated by {} v{} on {}",
        header.program_id,
        header.program_version,
        header.generated_at.format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(w)?;
    writeln!(w, "<ADIF_VER:{}>{}", ADIF_VERSION.len(), ADIF_VERSION)?;
    writeln!(
        w,
        "<PROGRAMID:{}>{}",
        header.program_id.chars().count(),
        header.program_id
    )?;
    writeln!(
        w,
        "<PROGRAMVERSION:{}>{}",
        header.program_version.chars().count(),
        header.program_version
    )?;
    writeln!(w, "<EOH>")?;
    writeln!(w)?;
    Ok(())
}

/// Write a complete export: preamble followed by every record.
///
/// Returns the number of records written.
pub fn write_adif<'a, W, I>(w: &mut W, header: &ExportHeader, records: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a QsoRecord>,
{
    write_header(w, header)?;
    let mut count = 0;
    for record in records {
        w.write_all(encode_record(record).as_bytes())?;
        count += 1;
    }
    Ok(count)
}
