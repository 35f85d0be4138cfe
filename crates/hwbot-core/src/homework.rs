//! Wire model of the review-status API.

use serde::Deserialize;

/// Decoded body of a successful poll.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PollResponse {
    pub homeworks: Vec<HomeworkRecord>,
    /// Server-side "now"; the next poll asks for changes since this point.
    pub current_date: i64,
}

impl PollResponse {
    /// The API lists the most recently updated homework first.
    pub fn newest(&self) -> Option<&HomeworkRecord> {
        self.homeworks.first()
    }
}

/// One homework entry. Every field is optional on the wire; the interpreter
/// decides whether the record is usable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct HomeworkRecord {
    #[serde(default)]
    pub homework_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Rejected,
    Reviewing,
}

impl HomeworkStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "reviewing" => Some(Self::Reviewing),
            _ => None,
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Approved => "The reviewer liked everything, the work is accepted!",
            Self::Rejected => "Unfortunately, errors were found in the work.",
            Self::Reviewing => "It is under review.",
        }
    }
}
