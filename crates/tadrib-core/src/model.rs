//! Core data model types for tadrib.
//!
//! Every entity is a plain serde record whose JSON shape is the persisted
//! format. Human-readable text is [`Bilingual`], never a bare string, except
//! for links, icon identifiers, counters and dates.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// The two supported display locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ar,
    Fr,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Ar => write!(f, "ar"),
            Locale::Fr => write!(f, "fr"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ar" | "arabic" => Ok(Locale::Ar),
            "fr" | "french" => Ok(Locale::Fr),
            other => Err(format!("unknown locale: {other}")),
        }
    }
}

/// Text carried in both locales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    pub ar: String,
    pub fr: String,
}

impl Bilingual {
    pub fn new(ar: impl Into<String>, fr: impl Into<String>) -> Self {
        Self {
            ar: ar.into(),
            fr: fr.into(),
        }
    }

    /// The same text in both locales (proper nouns, model names).
    pub fn same(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            ar: text.clone(),
            fr: text,
        }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::Ar => &self.ar,
            Locale::Fr => &self.fr,
        }
    }

    pub fn set(&mut self, locale: Locale, text: impl Into<String>) {
        match locale {
            Locale::Ar => self.ar = text.into(),
            Locale::Fr => self.fr = text.into(),
        }
    }
}

/// A reading passage with its comprehension questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub id: i64,
    pub title: Bilingual,
    pub specialization: Bilingual,
    /// HTML body.
    pub content: Bilingual,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    OpenEnded,
    TrueFalse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub text: Bilingual,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<AnswerOption>>,
    /// Only meaningful when `options` is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer_id: Option<String>,
}

impl Question {
    pub fn add_option(&mut self, option: AnswerOption) {
        self.options.get_or_insert_with(Vec::new).push(option);
    }

    /// Remove an option, clearing the correct answer if it pointed there.
    pub fn remove_option(&mut self, option_id: &str) -> Option<AnswerOption> {
        let options = self.options.as_mut()?;
        let index = options.iter().position(|o| o.id == option_id)?;
        let removed = options.remove(index);
        if self.correct_answer_id.as_deref() == Some(option_id) {
            self.correct_answer_id = None;
        }
        Some(removed)
    }

    pub fn set_correct_answer(&mut self, option_id: &str) -> Result<(), ValidationError> {
        let known = self
            .options
            .as_ref()
            .is_some_and(|opts| opts.iter().any(|o| o.id == option_id));
        if !known {
            return Err(ValidationError::UnknownOption(option_id.to_string()));
        }
        self.correct_answer_id = Some(option_id.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: Bilingual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub title: Bilingual,
    pub description: Bilingual,
    /// Key into the UI icon registry.
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialization {
    pub id: i64,
    pub name: Bilingual,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainee_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub name: Bilingual,
    pub specialization: Bilingual,
    pub presentation_title: Bilingual,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_file_name: Option<String>,
    /// Embedded file as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_file_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Unset when the stored date is missing or not `YYYY-MM-DD`.
    #[serde(
        default,
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    /// Empty, or one of `members`.
    #[serde(default)]
    pub team_leader: String,
}

/// Accept any string for a calendar date, keeping only valid ones.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let day = s.trim().get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }))
}

impl Team {
    pub fn add_member(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.members.contains(&name) {
            self.members.push(name);
        }
    }

    /// Remove a member, clearing the leader if it was them.
    pub fn remove_member(&mut self, name: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != name);
        if self.team_leader == name {
            self.team_leader.clear();
        }
        self.members.len() != before
    }

    /// Set the leader; an empty name clears it.
    pub fn set_leader(&mut self, name: &str) -> Result<(), ValidationError> {
        if !name.is_empty() && !self.members.iter().any(|m| m == name) {
            return Err(ValidationError::NotATeamMember(name.to_string()));
        }
        self.team_leader = name.to_string();
        Ok(())
    }
}

/// Reference material used to seed generated quizzes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestContext {
    pub id: i64,
    pub title: Bilingual,
    pub content: Bilingual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatChannel {
    pub id: String,
    pub name: Bilingual,
    /// Seeded once, only read by [`ChatChannel::reset_system_prompt`].
    pub default_system_prompt: Bilingual,
    pub system_prompt: Bilingual,
    pub icon: String,
    pub model: String,
}

impl ChatChannel {
    pub fn reset_system_prompt(&mut self) {
        self.system_prompt = self.default_system_prompt.clone();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub sender: String,
    pub avatar: String,
    pub text: String,
    /// Display timestamp (`HH:MM`).
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_audio: Option<bool>,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, avatar: impl Into<String>, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: now.timestamp_millis(),
            sender: sender.into(),
            avatar: avatar.into(),
            text: text.into(),
            timestamp: now.format("%H:%M").to_string(),
            has_audio: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub title: Bilingual,
    #[serde(rename = "type")]
    pub kind: Bilingual,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDataPoint {
    pub month: String,
    /// Percentage of completed activities.
    pub completion: u32,
    /// Average test score, in percent.
    pub average_score: u32,
    /// Attendance rate, in percent.
    pub attendance: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Trainer,
    Trainee,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Trainer => write!(f, "trainer"),
            UserRole::Trainee => write!(f, "trainee"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// Admin-managed account.
///
/// The password is stored in plaintext to stay compatible with existing
/// stores. Do not deploy this shape anywhere real.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_change_password: Option<bool>,
}

/// Timestamp-derived id for a new record.
///
/// Bumped past the largest existing id, so two records created within the
/// same millisecond still get distinct ids. When the largest id is
/// `i64::MAX`, the smallest unused positive id is taken instead.
pub fn next_id(existing: impl IntoIterator<Item = i64>) -> i64 {
    let now = Utc::now().timestamp_millis();
    let taken: BTreeSet<i64> = existing.into_iter().collect();
    match taken.last() {
        Some(&max) if max >= now => max
            .checked_add(1)
            .or_else(|| (1..).find(|id| !taken.contains(id)))
            .unwrap_or(0),
        _ => now,
    }
}

/// Move the element at `from` so it ends up at position `to`.
pub fn move_item<T>(list: &mut Vec<T>, from: usize, to: usize) -> Result<(), ValidationError> {
    let len = list.len();
    for index in [from, to] {
        if index >= len {
            return Err(ValidationError::OutOfBounds { index, len });
        }
    }
    let item = list.remove(from);
    list.insert(to, item);
    Ok(())
}
