use anyhow::{bail, Context};
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Code de jour de semaine, ordre lundi en premier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayCode {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

pub const DAYS: [DayCode; 7] = [
    DayCode::Mon,
    DayCode::Tue,
    DayCode::Wed,
    DayCode::Thu,
    DayCode::Fri,
    DayCode::Sat,
    DayCode::Sun,
];

impl DayCode {
    /// Convertit un index « dimanche = 0 » vers l'ordre lundi en premier.
    pub fn from_sunday_index(index: u32) -> Self {
        DAYS[((index + 6) % 7) as usize]
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::from_sunday_index(date.weekday().num_days_from_sunday())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayCode::Mon => "Mon",
            DayCode::Tue => "Tue",
            DayCode::Wed => "Wed",
            DayCode::Thu => "Thu",
            DayCode::Fri => "Fri",
            DayCode::Sat => "Sat",
            DayCode::Sun => "Sun",
        }
    }
}

impl fmt::Display for DayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        DAYS.iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .with_context(|| format!("unknown weekday code: {s}"))
    }
}

/// Parse une date au jour près : `YYYY-MM-DD`, RFC3339 ou `YYYY-MM-DDTHH:MM:SS`.
/// L'heure éventuelle est ignorée.
pub fn parse_day(raw: &str) -> anyhow::Result<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("empty date");
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::<FixedOffset>::parse_from_rfc3339(raw) {
        return Ok(dt.date_naive());
    }
    let dt = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .with_context(|| format!("invalid date/datetime: {raw}"))?;
    Ok(dt.date())
}

pub fn add_days(start: NaiveDate, offset: u32) -> Option<NaiveDate> {
    start.checked_add_days(Days::new(u64::from(offset)))
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format court d'affichage, ex. `Jan 5`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// (Dé)sérialisation serde d'une date au jour près.
pub mod day_format {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::iso_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_day(&raw).map_err(de::Error::custom)
    }
}
