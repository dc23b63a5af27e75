use crate::spreadsheet::reference::index_to_reference;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use iso8601_duration::Duration as IsoDuration;
use std::fmt::Display;

/// Raw types of cell data found in workbook files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as `1` / `0`
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// ISO 8601 duration strings (ODS time cells)
    IsoDuration,
    /// Literal string values
    InlineString,
    /// Index into the shared string table
    SharedString,
    /// Error values such as `#DIV/0!`
    Error,
}

impl CellType {
    /// Maps built-in Excel number format IDs to date/time cell types.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Classifies a custom number format code by the date and time tokens outside
    /// of literals, escapes and bracketed sections.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }

    pub(crate) fn is_1904(&self) -> bool {
        matches!(self, Self::NumberDateTime1904 | Self::NumberDate1904 | Self::NumberTime1904)
    }

    /// Numbers carrying a date, with or without a time part.
    pub(crate) fn is_serial_date(&self) -> bool {
        matches!(
            self,
            Self::NumberDateTime1900 | Self::NumberDate1900 | Self::NumberDateTime1904 | Self::NumberDate1904
        )
    }

    /// Numbers carrying only a time of day.
    pub(crate) fn is_serial_time(&self) -> bool {
        matches!(self, Self::NumberTime1900 | Self::NumberTime1904)
    }
}

/// A single non-empty cell with its position, raw type and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    /// Raw value as stored in the file
    pub(crate) value: String,
}

impl Cell {
    /// Returns the A1-style reference of the cell.
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    pub(crate) fn to_boolean(&self) -> bool {
        self.value == "1" || self.value.eq_ignore_ascii_case("true")
    }

    /// True for numbers that are whole and fit into a 64-bit integer.
    pub(crate) fn is_integer(&self) -> bool {
        self.value.parse::<i64>().is_ok()
            || self.value.parse::<f64>().map(fits_bigint).unwrap_or(false)
    }

    pub(crate) fn to_bigint(&self) -> Result<i64, String> {
        if let Ok(value) = self.value.parse::<i64>() {
            return Ok(value);
        }
        match self.value.parse::<f64>() {
            Ok(value) if fits_bigint(value) => Ok(value as i64),
            _ => Err(format!("parse '{}' to bigint failed", self.value)),
        }
    }

    pub(crate) fn to_double(&self) -> Result<f64, String> {
        self.value.parse::<f64>().map_err(|_| format!("parse '{}' to double failed", self.value))
    }

    /// Converts a date or datetime cell to a timestamp.
    /// Handles Excel serial numbers (1900 and 1904 epochs) and ISO dates.
    pub(crate) fn to_datetime(&self) -> Result<NaiveDateTime, String> {
        match self.kind {
            CellType::NumberDateTime1900 | CellType::NumberDate1900 | CellType::NumberTime1900 |
            CellType::NumberDateTime1904 | CellType::NumberDate1904 | CellType::NumberTime1904 => {
                serial_to_datetime(self.to_double()?, self.kind.is_1904())
                    .ok_or_else(|| format!("serial '{}' out of date range", self.value))
            }
            CellType::IsoDateTime => {
                if self.value.contains('T') {
                    NaiveDateTime::parse_from_str(&self.value, "%Y-%m-%dT%H:%M:%S%.f")
                        .map_err(|_| format!("parse '{}' to NaiveDateTime failed", self.value))
                } else {
                    NaiveDate::parse_from_str(&self.value, "%Y-%m-%d")
                        .map_err(|_| format!("parse '{}' to NaiveDate failed", self.value))
                        .map(|date| date.and_time(NaiveTime::MIN))
                }
            }
            _ => Err(format!("parse '{}' to datetime failed", self.value)),
        }
    }

    /// Converts a time-of-day cell to its `HH:MM:SS` text.
    pub(crate) fn to_time_string(&self) -> Result<String, String> {
        match self.kind {
            CellType::IsoDuration => {
                let duration = self.value
                    .parse::<IsoDuration>()
                    .map_err(|_| format!("parse '{}' to iso8601 duration failed", self.value))?;
                let hours = (duration.day * 24.0 + duration.hour) as i64;
                let minutes = duration.minute as i64;
                let seconds = duration.second as i64;
                Ok(format!("{hours:02}:{minutes:02}:{seconds:02}"))
            }
            _ => Ok(self.to_datetime()?.time().format("%H:%M:%S").to_string()),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered = match self.kind {
            CellType::Boolean => Ok(self.to_boolean().to_string()),
            CellType::NumberDate1900 | CellType::NumberDate1904 => {
                self.to_datetime().map(|datetime| datetime.format("%Y-%m-%d").to_string())
            }
            CellType::NumberDateTime1900 | CellType::NumberDateTime1904 | CellType::IsoDateTime => {
                self.to_datetime().map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            CellType::NumberTime1900 | CellType::NumberTime1904 | CellType::IsoDuration => self.to_time_string(),
            _ => Ok(self.value.to_owned()),
        };
        // A value that does not parse as its declared type is shown as stored
        write!(f, "{}", rendered.unwrap_or_else(|_| self.value.to_owned()))
    }
}

fn fits_bigint(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64
}

/// Converts an Excel serial number to a timestamp.
/// Serials below 60 in the 1900 system are shifted by a day to undo the Lotus 1-2-3 leap year bug.
fn serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.trunc() as i64;
    let offset = if is_1904 {
        1_462
    } else if days < 60 {
        1
    } else {
        0
    };
    let date = NaiveDate::from_ymd_opt(1899, 12, 30)?
        .checked_add_signed(Duration::try_days(days + offset)?)?;
    let micros = (serial.fract() * 86_400_000_000f64).round() as i64;
    date.and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::microseconds(micros))
}
