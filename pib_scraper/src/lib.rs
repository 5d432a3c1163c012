pub mod ai;
pub mod article;
pub mod config;
pub mod error;
pub mod filter;
pub mod harvester;
pub mod pdf;
pub mod pipeline;
pub mod summarizer;
pub mod telemetry;
pub mod utils;

pub use error::Error;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One press-release entry as harvested from the listing page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub title: String,
    pub url: String,
    pub date_label: String,
}

impl ListingItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>, date_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            date_label: date_label.into(),
        }
    }
}

/// A single `(day, month, year)` request against the listing form.
/// `day == 0` selects the whole month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl HarvestDate {
    /// Descriptive label attached to every item harvested for this date.
    pub fn label(&self) -> String {
        if self.day == 0 {
            format!("Month-{}-{}", self.month, self.year)
        } else {
            format!("{}-{}-{}", self.day, self.month, self.year)
        }
    }
}

/// What the user asked to harvest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DateSelection {
    SpecificDate { day: u32, month: u32, year: i32 },
    Months { months: Vec<u32>, year: i32 },
}

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2030;

impl DateSelection {
    /// Expands the selection into one harvest request per month (or the single day).
    pub fn harvest_dates(&self) -> Vec<HarvestDate> {
        match self {
            DateSelection::SpecificDate { day, month, year } => vec![HarvestDate {
                day: *day,
                month: *month,
                year: *year,
            }],
            DateSelection::Months { months, year } => months
                .iter()
                .map(|&month| HarvestDate { day: 0, month, year: *year })
                .collect(),
        }
    }

    /// Checks the ranges the interactive front ends accept.
    pub fn validate(&self) -> Result<(), String> {
        let year = match self {
            DateSelection::SpecificDate { year, .. } | DateSelection::Months { year, .. } => *year,
        };
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(format!("year must be between {MIN_YEAR} and {MAX_YEAR}"));
        }
        match self {
            DateSelection::SpecificDate { day, month, year } => {
                if NaiveDate::from_ymd_opt(*year, *month, *day).is_none() {
                    return Err(format!("{day}-{month}-{year} is not a valid date"));
                }
            }
            DateSelection::Months { months, .. } => {
                if months.is_empty() {
                    return Err("select at least one month".to_string());
                }
                if let Some(bad) = months.iter().find(|m| !(1..=12).contains(*m)) {
                    return Err(format!("month {bad} is out of range"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_whole_month_and_single_day() {
        let month = HarvestDate { day: 0, month: 1, year: 2024 };
        let day = HarvestDate { day: 9, month: 12, year: 2024 };
        assert_eq!(month.label(), "Month-1-2024");
        assert_eq!(day.label(), "9-12-2024");
    }

    #[test]
    fn months_expand_to_whole_month_requests() {
        let selection = DateSelection::Months { months: vec![1, 3], year: 2024 };
        let dates = selection.harvest_dates();
        assert_eq!(dates.len(), 2);
        assert!(dates.iter().all(|d| d.day == 0 && d.year == 2024));
        assert_eq!(dates[1].month, 3);
    }

    #[test]
    fn validation_rejects_out_of_range_input() {
        assert!(DateSelection::SpecificDate { day: 31, month: 2, year: 2024 }.validate().is_err());
        assert!(DateSelection::SpecificDate { day: 9, month: 12, year: 1999 }.validate().is_err());
        assert!(DateSelection::Months { months: vec![], year: 2024 }.validate().is_err());
        assert!(DateSelection::Months { months: vec![13], year: 2024 }.validate().is_err());
        assert!(DateSelection::SpecificDate { day: 9, month: 12, year: 2024 }.validate().is_ok());
    }

    #[test]
    fn selection_deserializes_from_tagged_json() {
        let selection: DateSelection =
            serde_json::from_str(r#"{"mode":"months","months":[1,2],"year":2024}"#).unwrap();
        assert_eq!(selection, DateSelection::Months { months: vec![1, 2], year: 2024 });
    }
}
