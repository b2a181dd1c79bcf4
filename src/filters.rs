//! Filter configuration handed to the ranking engine.
//!
//! The configuration is a plain value: which filters are active, the
//! priority rank the user gave each of them, and per-filter parameters.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::Weekday;
use crate::error::ConfigError;

pub type Rank = u32;

/// Identifiers of the filters the user can enable and reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    DaysOfWeek,
    Time,
    ClassGap,
    Instructor,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            FilterKind::DaysOfWeek => "daysofweek",
            FilterKind::Time => "time",
            FilterKind::ClassGap => "classgap",
            FilterKind::Instructor => "instructor",
        };
        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFilter {
    pub id: FilterKind,
    pub rank: Rank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedDay {
    pub day: Weekday,
    pub rank: Rank,
}

/// Days the user wants to keep free, most important first by rank.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaysOfWeekParams {
    #[serde(default)]
    pub every_day: bool,
    #[serde(default)]
    pub days: Vec<RankedDay>,
}

impl DaysOfWeekParams {
    pub fn avoid(days: impl IntoIterator<Item = Weekday>) -> Self {
        Self {
            every_day: false,
            days: days
                .into_iter()
                .zip(1..)
                .map(|(day, rank)| RankedDay { day, rank })
                .collect(),
        }
    }

    pub fn every_day() -> Self {
        Self {
            every_day: true,
            days: Vec::new(),
        }
    }

    /// Target days in priority order.
    ///
    /// With `every_day` all seven days are targets; days without an explicit
    /// rank follow the ranked ones in calendar order.
    pub fn target_days(&self) -> Vec<Weekday> {
        if self.every_day {
            let rank_of = |day: Weekday| {
                self.days
                    .iter()
                    .find(|ranked| ranked.day == day)
                    .map_or(Rank::MAX, |ranked| ranked.rank)
            };
            Weekday::ALL
                .into_iter()
                .sorted_by_key(|day| rank_of(*day))
                .collect()
        } else {
            self.days
                .iter()
                .sorted_by_key(|ranked| ranked.rank)
                .map(|ranked| ranked.day)
                .collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    #[serde(default)]
    pub filters: Vec<ActiveFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<DaysOfWeekParams>,
}

impl FilterConfig {
    /// Adds an active filter ranked after the ones already present.
    pub fn with_filter(mut self, id: FilterKind) -> Self {
        let rank = self
            .filters
            .iter()
            .map(|f| f.rank)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        self.filters.push(ActiveFilter { id, rank });
        self
    }

    pub fn with_days_of_week(mut self, params: DaysOfWeekParams) -> Self {
        self.days_of_week = Some(params);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(id) = self.filters.iter().map(|f| f.id).duplicates().next() {
            return Err(ConfigError::DuplicateFilter(id));
        }
        if let Some(filter) = self.filters.iter().find(|f| f.rank == 0) {
            return Err(ConfigError::ZeroRank(filter.id.to_string()));
        }
        if let Some(params) = &self.days_of_week {
            if let Some(day) = params.days.iter().map(|d| d.day).duplicates().next() {
                return Err(ConfigError::DuplicateDay(day));
            }
            if let Some(ranked) = params.days.iter().find(|d| d.rank == 0) {
                return Err(ConfigError::ZeroRank(ranked.day.to_string()));
            }
        }
        Ok(())
    }

    /// Active filters, highest priority first. Equal ranks keep list order.
    pub fn priority_order(&self) -> Vec<FilterKind> {
        self.filters
            .iter()
            .sorted_by_key(|f| f.rank)
            .map(|f| f.id)
            .collect()
    }
}
