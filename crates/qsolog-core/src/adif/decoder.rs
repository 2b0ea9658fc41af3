//! ADIF record decoder.
//!
//! Maps the tokens of a [`RawRecord`] onto a canonical [`QsoRecord`]:
//! field names are matched case-insensitively, values are trimmed, dates
//! and times are normalized, numbers are parsed leniently, and missing
//! fields receive logbook defaults. A record without a callsign is
//! rejected with [`RecordError::Validation`].

use chrono::{DateTime, Utc};

use crate::band::band_for_frequency;
use crate::error::RecordError;
use crate::models::QsoRecord;

use super::tokenizer::{tokenize, RawRecord};

const DEFAULT_MODE: &str = "SSB";
const DEFAULT_RST: &str = "59";

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Converts raw records into [`QsoRecord`]s.
///
/// The clock supplies the defaults for a missing date or start time.
/// [`Decoder::new`] uses the system clock in UTC; tests can pin it with
/// [`Decoder::with_clock`].
pub struct Decoder {
    clock: Clock,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            clock: Box::new(Utc::now),
        }
    }

    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    /// Decode one record.
    pub fn decode(&self, raw: &RawRecord<'_>) -> Result<QsoRecord, RecordError> {
        let mut record = QsoRecord::default();

        for token in &raw.tokens {
            if token.is_truncated() {
                tracing::warn!(
                    ordinal = raw.ordinal,
                    field = token.name,
                    declared = token.declared_len,
                    actual = token.value.chars().count(),
                    "field value shorter than declared length; keeping what was read"
                );
            }

            let value = token.value.trim();
            let name = token.name.to_ascii_uppercase();
            match name.as_str() {
                "CALL" => record.callsign = value.to_string(),
                "QSO_DATE" => record.date = normalize_date(value),
                "TIME_ON" => record.time_on = normalize_time(value),
                "TIME_OFF" => record.time_off = normalize_time(value),
                "FREQ" => record.frequency_mhz = parse_frequency(value),
                "BAND" => record.band = value.to_string(),
                "MODE" => record.mode = value.to_string(),
                "RST_SENT" => record.rst_sent = value.to_string(),
                "RST_RCVD" => record.rst_received = value.to_string(),
                "NAME" => record.operator_name = value.to_string(),
                "QTH" => record.location = value.to_string(),
                "COUNTRY" => record.country = value.to_string(),
                "GRIDSQUARE" => record.grid_square = value.to_string(),
                "TX_PWR" => record.power_watts = parse_power(value),
                "COMMENT" => record.comment = value.to_string(),
                "QSL_RCVD" => record.confirmed = value.eq_ignore_ascii_case("Y"),
                _ => {}
            }
        }

        if record.callsign.is_empty() {
            return Err(RecordError::Validation {
                ordinal: raw.ordinal,
                field: "CALL",
            });
        }

        self.apply_defaults(&mut record);
        Ok(record)
    }

    /// Tokenize and decode `input`, yielding one result per record.
    pub fn decode_str<'a>(
        &'a self,
        input: &'a str,
    ) -> impl Iterator<Item = Result<QsoRecord, RecordError>> + 'a {
        tokenize(input).map(move |raw| raw.and_then(|raw| self.decode(&raw)))
    }

    fn apply_defaults(&self, record: &mut QsoRecord) {
        if record.date.is_empty() || record.time_on.is_empty() {
            let now = (self.clock)();
            if record.date.is_empty() {
                record.date = now.format("%Y-%m-%d").to_string();
            }
            if record.time_on.is_empty() {
                record.time_on = now.format("%H:%M:%S").to_string();
            }
        }
        if record.time_off.is_empty() {
            record.time_off = record.time_on.clone();
        }
        if record.mode.is_empty() {
            record.mode = DEFAULT_MODE.to_string();
        }
        if record.rst_sent.is_empty() {
            record.rst_sent = DEFAULT_RST.to_string();
        }
        if record.rst_received.is_empty() {
            record.rst_received = DEFAULT_RST.to_string();
        }
        if record.band.is_empty() && record.frequency_mhz > 0.0 {
            record.band = band_for_frequency(record.frequency_mhz).to_string();
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokenize and decode `input` with the system clock.
pub fn decode_all(input: &str) -> impl Iterator<Item = Result<QsoRecord, RecordError>> + '_ {
    let decoder = Decoder::new();
    tokenize(input).map(move |raw| raw.and_then(|raw| decoder.decode(&raw)))
}

/// `YYYYMMDD` becomes `YYYY-MM-DD`; other shapes pass through.
fn normalize_date(value: &str) -> String {
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}-{}", &value[..4], &value[4..6], &value[6..])
    } else {
        value.to_string()
    }
}

/// `HHMM` becomes `HH:MM:00` and `HHMMSS` becomes `HH:MM:SS`; other
/// shapes pass through.
fn normalize_time(value: &str) -> String {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }
    match value.len() {
        4 => format!("{}:{}:00", &value[..2], &value[2..]),
        6 => format!("{}:{}:{}", &value[..2], &value[2..4], &value[4..]),
        _ => value.to_string(),
    }
}

fn parse_frequency(value: &str) -> f64 {
    match value.parse::<f64>() {
        Ok(mhz) if mhz.is_finite() => mhz,
        _ => 0.0,
    }
}

fn parse_power(value: &str) -> i32 {
    if let Ok(watts) = value.parse::<i32>() {
        return watts;
    }
    match value.parse::<f64>() {
        Ok(watts) if watts.is_finite() => watts.trunc() as i32,
        _ => 0,
    }
}
