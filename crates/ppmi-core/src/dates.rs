//! Calendar-date parsing and the visit-date lookup table.
//!
//! Most questionnaire exports carry a month/year info date per row; imaging
//! and assay exports often carry no usable date at all. For the latter, a
//! (participant, visit) → date table is assembled from a default set of
//! administrative forms that are filled in at nearly every visit.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use ppmi_ingest::{integer_column, read_source_table, string_column};
use ppmi_model::{Result, ScoreRow, Visit, columns};

/// Forms used to recover visit dates when an export lacks them.
pub const DEFAULT_DATE_FILES: &[&str] = &[
    "Inclusion_Exclusion.csv",
    "Signature_Form.csv",
    "Socio-Economics.csv",
    "Vital_Signs.csv",
];

/// Parse a month/year info date (`03/2011`). Day is pinned to the first.
pub fn parse_info_date(value: &str) -> Option<NaiveDate> {
    let (month, year) = value.trim().split_once('/')?;
    let month: u32 = month.trim().parse().ok()?;
    let year: i32 = year.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Parse an ISO calendar date (`2011-03-14`).
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Lenient parse trying the formats seen across exports.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_iso_date(value)
        .or_else(|| NaiveDate::parse_from_str(value.trim(), "%m/%d/%Y").ok())
        .or_else(|| parse_info_date(value))
}

/// (participant, visit) → collection date, first occurrence wins.
#[derive(Debug, Default, Clone)]
pub struct VisitDates {
    dates: BTreeMap<(i64, Visit), NaiveDate>,
}

impl VisitDates {
    /// Build the lookup from `extra` files plus the defaults, in that
    /// order. Files absent from the export are skipped; an empty lookup is
    /// returned when none exist, so date attachment degrades to a no-op.
    pub fn load(dir: &Path, extra: &[&str]) -> Result<Self> {
        let mut lookup = Self::default();
        for file in extra.iter().chain(DEFAULT_DATE_FILES) {
            if !dir.join(file).is_file() {
                debug!(file, "visit-date source not present, skipping");
                continue;
            }
            let frame = read_source_table(
                dir,
                file,
                &[columns::PARTICIPANT, columns::VISIT, columns::INFO_DATE],
            )?;
            let participants = integer_column(&frame, columns::PARTICIPANT)?;
            let visits = string_column(&frame, columns::VISIT)?;
            let dates = string_column(&frame, columns::INFO_DATE)?;
            for ((participant, visit), date) in participants.iter().zip(&visits).zip(&dates) {
                let (Some(participant), Some(visit), Some(date)) = (
                    participant,
                    visit.as_deref().and_then(Visit::from_code),
                    date.as_deref().and_then(parse_date),
                ) else {
                    continue;
                };
                lookup.dates.entry((*participant, visit)).or_insert(date);
            }
        }
        Ok(lookup)
    }

    pub fn get(&self, participant: i64, visit: Visit) -> Option<NaiveDate> {
        self.dates.get(&(participant, visit)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Fill in missing collection dates on derived rows (left join; rows
    /// without a lookup entry keep no date).
    pub fn annotate(&self, rows: &mut [ScoreRow]) {
        if self.is_empty() {
            return;
        }
        for row in rows {
            if row.collection_date.is_none() {
                row.collection_date = self.get(row.participant, row.visit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_month_year_dates() {
        assert_eq!(
            parse_info_date("03/2011"),
            NaiveDate::from_ymd_opt(2011, 3, 1)
        );
        assert_eq!(parse_info_date("2011-03-14"), None);
        assert_eq!(parse_info_date("13/2011"), None);
    }

    #[test]
    fn lenient_parse_tries_each_format() {
        assert_eq!(
            parse_date("2011-03-14"),
            NaiveDate::from_ymd_opt(2011, 3, 14)
        );
        assert_eq!(parse_date("03/14/2011"), NaiveDate::from_ymd_opt(2011, 3, 14));
        assert_eq!(parse_date("03/2011"), NaiveDate::from_ymd_opt(2011, 3, 1));
        assert_eq!(parse_date("not a date"), None);
    }
}
