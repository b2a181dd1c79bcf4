//! Class timetable generation and ranking.
//!
//! [`generator`] enumerates one option per course and prunes combinations
//! with time clashes or full classes; [`fitness`] scores the survivors
//! against a [`filters::FilterConfig`] and sorts them best first.

pub mod data;
pub mod error;
pub mod filters;
pub mod fitness;
pub mod generator;
pub mod ingest;
pub mod server;
pub mod session;
pub mod transport;

pub use data::{
    ClassMeeting, ClassOption, Combination, CourseEntry, CourseOffering, Dataset, MeetingDetail,
    Weekday,
};
pub use error::Error;
pub use filters::{FilterConfig, FilterKind};
pub use session::RankingSession;
