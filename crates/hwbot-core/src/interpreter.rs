use crate::{
    errors::InterpretError,
    homework::{HomeworkRecord, HomeworkStatus},
};

/// What the newest homework record means for the chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interpretation {
    /// Nothing changed since the cursor. The normal steady state.
    NoNewWork,
    Verdict(String),
    Error(InterpretError),
}

/// Turn the newest record of a poll into a message. Pure.
pub fn interpret(record: Option<&HomeworkRecord>) -> Interpretation {
    let Some(record) = record else {
        return Interpretation::NoNewWork;
    };

    let Some(name) = record
        .homework_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
    else {
        return Interpretation::Error(InterpretError::MissingName);
    };

    let Some(status) = record.status.as_deref().and_then(HomeworkStatus::parse) else {
        return Interpretation::Error(InterpretError::UnrecognizedStatus(record.status.clone()));
    };

    Interpretation::Verdict(format_verdict(name, status))
}

pub fn format_verdict(name: &str, status: HomeworkStatus) -> String {
    format!("Work \"{name}\" was reviewed!\n\n{}", status.verdict())
}
