use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::UnknownDay;

// Type aliases for clarity
pub type Minutes = u32;
pub type Seats = i32;

/// Day of the week a meeting recurs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Weekday {
    type Err = UnknownDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Weekday::ALL
            .into_iter()
            .find(|day| day.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownDay(s.to_string()))
    }
}

impl TryFrom<String> for Weekday {
    type Error = UnknownDay;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Weekday> for String {
    fn from(day: Weekday) -> Self {
        day.name().to_string()
    }
}

fn default_seats() -> Seats {
    1
}

/// One weekly time slot of a class meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingDetail {
    pub day: Weekday,
    pub start: Minutes,
    pub end: Minutes,
    #[serde(default = "default_seats")]
    pub seats_available: Seats,
    #[serde(default)]
    pub instructor: String,
}

impl MeetingDetail {
    /// Half-open interval test: touching slots do not overlap.
    pub fn overlaps(&self, other: &MeetingDetail) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }
}

/// A class component (lecture, lab, ...) of an option.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassMeeting {
    #[serde(default)]
    pub misc: Vec<MeetingDetail>,
}

/// One mutually-exclusive way of taking a course.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassOption {
    #[serde(default)]
    pub classes: Vec<ClassMeeting>,
}

impl ClassOption {
    /// Every meeting detail of every class component.
    pub fn details(&self) -> impl Iterator<Item = &MeetingDetail> {
        self.classes.iter().flat_map(|class| class.misc.iter())
    }
}

/// A course the user must schedule, with its candidate options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOffering {
    pub title: String,
    pub code: String,
    #[serde(rename = "class", alias = "options", default)]
    pub options: Vec<ClassOption>,
}

/// Course offerings keyed by course key, in the order the keys were recorded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    courses: Vec<(String, CourseOffering)>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a course. Re-inserting a key replaces it in place.
    pub fn insert(&mut self, key: impl Into<String>, offering: CourseOffering) {
        let key = key.into();
        match self.courses.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = offering,
            None => self.courses.push((key, offering)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CourseOffering> {
        self.courses
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, offering)| offering)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.courses.iter().map(|(k, _)| k.as_str())
    }

    pub fn offerings(&self) -> impl Iterator<Item = &CourseOffering> {
        self.courses.iter().map(|(_, offering)| offering)
    }
}

impl FromIterator<(String, CourseOffering)> for Dataset {
    fn from_iter<I: IntoIterator<Item = (String, CourseOffering)>>(iter: I) -> Self {
        let mut dataset = Dataset::new();
        for (key, offering) in iter {
            dataset.insert(key, offering);
        }
        dataset
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.courses.len()))?;
        for (key, offering) in &self.courses {
            map.serialize_entry(key, offering)?;
        }
        map.end()
    }
}

struct DatasetVisitor;

impl<'de> Visitor<'de> for DatasetVisitor {
    type Value = Dataset;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map from course key to course offering")
    }

    // Entries arrive in document order, which is the course processing order.
    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Dataset, A::Error> {
        let mut dataset = Dataset::new();
        while let Some((key, offering)) = access.next_entry::<String, CourseOffering>()? {
            dataset.insert(key, offering);
        }
        Ok(dataset)
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DatasetVisitor)
    }
}

/// One course's chosen option inside a combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub title: String,
    pub code: String,
    pub option: ClassOption,
}

/// A full schedule candidate: one entry per course, in course order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness: Option<f64>,
    pub courses: Vec<CourseEntry>,
}

impl Combination {
    pub fn new(courses: Vec<CourseEntry>) -> Self {
        Self {
            fitness: None,
            courses,
        }
    }

    pub fn details(&self) -> impl Iterator<Item = &MeetingDetail> {
        self.courses.iter().flat_map(|entry| entry.option.details())
    }
}
