//! Turns rows scraped from the class search portal into course offerings.
//!
//! Each row is a header → cell text map as read off the "Class Options"
//! table. Only the fields the generator needs are interpreted.

use std::collections::HashMap;

use itertools::Itertools;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::data::{
    ClassMeeting, ClassOption, Combination, CourseOffering, Dataset, MeetingDetail, Minutes, Seats,
    Weekday,
};
use crate::error::TimeParseError;

pub const DAYS_AND_TIMES: &str = "Days and Times";
pub const STATUS: &str = "Status";
pub const AVAILABLE_SEATS: &str = "Available Seats";
pub const INSTRUCTOR: &str = "Instructor";

/// A course as scraped: its title, code and raw option rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCourse {
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub rows: Vec<HashMap<String, String>>,
}

/// Parses a 12-hour clock such as `9:00AM` or `12:30pm` into minutes since
/// midnight.
pub fn parse_clock(text: &str) -> Result<Minutes, TimeParseError> {
    let invalid = || TimeParseError::InvalidClock(text.to_string());
    let upper = text.trim().to_ascii_uppercase();
    let (clock, pm) = if let Some(clock) = upper.strip_suffix("AM") {
        (clock, false)
    } else if let Some(clock) = upper.strip_suffix("PM") {
        (clock, true)
    } else {
        return Err(invalid());
    };

    let (hours, minutes) = clock.split_once(':').ok_or_else(invalid)?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: Minutes = hours.parse().map_err(|_| invalid())?;
    let minutes: Minutes = minutes.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&hours) || minutes >= 60 {
        return Err(invalid());
    }

    let hours = match (pm, hours) {
        (false, 12) => 0,
        (true, 12) => 12,
        (true, h) => h + 12,
        (false, h) => h,
    };
    Ok(hours * 60 + minutes)
}

// earliest weekday name in `text`, with its byte offset
fn next_day(text: &str) -> Option<(usize, Weekday)> {
    Weekday::ALL
        .into_iter()
        .filter_map(|day| {
            text.find(&day.name().to_ascii_lowercase())
                .map(|pos| (pos, day))
        })
        .min_by_key(|(pos, _)| *pos)
}

// splits `9:00am to ...` into the clock token and the rest
fn split_clock(text: &str) -> (&str, &str) {
    let digits_end = text
        .find(|c: char| !(c.is_ascii_digit() || c == ':'))
        .unwrap_or(text.len());
    let end = text[digits_end..]
        .chars()
        .take(2)
        .fold(digits_end, |acc, c| acc + c.len_utf8());
    text.split_at(end)
}

/// Splits a "Days and Times" cell into `(day, start, end)` slots.
///
/// `Monday 9:00AM to 11:00AM Wednesday 2:00PM to 4:00PM` yields two slots.
/// Text without any weekday name (e.g. `TBA`) yields none. A weekday name
/// that is not followed by `<time> to <time>` is an error.
pub fn parse_days_and_times(
    text: &str,
) -> Result<Vec<(Weekday, Minutes, Minutes)>, TimeParseError> {
    let lower = text.to_ascii_lowercase();
    let mut rest = lower.as_str();
    let mut slots = Vec::new();

    while let Some((pos, day)) = next_day(rest) {
        rest = rest[pos + day.name().len()..].trim_start();

        let (start, after) = split_clock(rest);
        let start = parse_clock(start)?;
        let after = after
            .trim_start()
            .strip_prefix("to")
            .ok_or_else(|| TimeParseError::MissingSeparator {
                day,
                text: text.to_string(),
            })?
            .trim_start();
        let (end, after) = split_clock(after);
        let end = parse_clock(end)?;

        slots.push((day, start, end));
        rest = after;
    }
    Ok(slots)
}

// an open row without a seat column is registrable
fn parse_seats(row: &HashMap<String, String>) -> Seats {
    let Some(text) = row.get(AVAILABLE_SEATS) else {
        return 1;
    };
    match text.trim().parse() {
        Ok(seats) => seats,
        Err(_) => {
            warn!("Unreadable seat count {:?}, treating option as full", text);
            0
        }
    }
}

/// Builds one class option from a scraped row, or `None` when the row has
/// no seats left.
///
/// A malformed time range only costs that meeting its schedule: the error is
/// logged and the meeting is kept with no slots.
pub fn option_from_row(row: &HashMap<String, String>) -> Option<ClassOption> {
    let days_and_times = row.get(DAYS_AND_TIMES).map(String::as_str).unwrap_or("");
    let seats_available = parse_seats(row);
    if seats_available <= 0 {
        warn!("Dropping full class option {:?}", days_and_times);
        return None;
    }

    let slots = parse_days_and_times(days_and_times).unwrap_or_else(|e| {
        error!("Error processing {:?}: {}", days_and_times, e);
        Vec::new()
    });
    let instructor = row.get(INSTRUCTOR).cloned().unwrap_or_default();
    let misc = slots
        .into_iter()
        .map(|(day, start, end)| MeetingDetail {
            day,
            start,
            end,
            seats_available,
            instructor: instructor.clone(),
        })
        .collect();

    Some(ClassOption {
        classes: vec![ClassMeeting { misc }],
    })
}

/// Keeps the open rows of a scraped course that still have seats and
/// converts them to options.
pub fn course_from_raw(raw: &RawCourse) -> CourseOffering {
    let options: Vec<ClassOption> = raw
        .rows
        .iter()
        .filter(|row| row.get(STATUS).is_some_and(|status| status.trim() == "Open"))
        .filter_map(option_from_row)
        .collect();
    info!(
        "Filtered {} to {} open classes out of {} total classes.",
        raw.title,
        options.len(),
        raw.rows.len()
    );

    CourseOffering {
        title: raw.title.clone(),
        code: raw.code.clone(),
        options,
    }
}

/// Dataset keyed by course title, in scrape order.
pub fn ingest(courses: &[RawCourse]) -> Dataset {
    courses
        .iter()
        .map(|raw| (raw.title.clone(), course_from_raw(raw)))
        .collect()
}

/// Distinct instructor names across the combinations, sorted.
pub fn instructors(combinations: &[Combination]) -> Vec<String> {
    combinations
        .iter()
        .flat_map(|combination| combination.details())
        .map(|detail| detail.instructor.trim())
        .filter(|name| !name.is_empty())
        .unique()
        .sorted()
        .map(str::to_string)
        .collect()
}
