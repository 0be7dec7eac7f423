//! Event entity - one narrative beat offering the player a handful of choices
//!
//! An event is age-gated, may carry prerequisites, and offers 2 to 4 choices
//! whose stat effects shape the player's run. Its selection score weights
//! random draws among eligible events.
//!
//! # Valid by construction
//!
//! Every constructor funnels through [`Event::new`], which validates fields in
//! a fixed order (event ID, title, description, age range, choices, branch
//! weight, rarity factor) and reports the first broken rule. There are no raw
//! setters: changes go through [`Event::with_updates`], which re-runs the same
//! validation, so an event can never drift into an invalid state.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::some_if_not_empty;
use crate::error::DomainError;
use crate::ids::EventId;
use crate::value_objects::{
    AgeRange, BranchWeight, EventCode, EventDescription, EventTitle, RarityFactor, COMMON_THRESHOLD,
    MAX_AGE, MIN_AGE, RARE_THRESHOLD,
};

const MIN_CHOICES: usize = 2;
const MAX_CHOICES: usize = 4;

/// Requirement per stat name. Only key presence is evaluated today.
pub type Prerequisites = BTreeMap<String, serde_json::Value>;

// =============================================================================
// Classification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Milestone,
    Random,
    Opportunity,
    Chain,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Milestone => "milestone",
            Self::Random => "random",
            Self::Opportunity => "opportunity",
            Self::Chain => "chain",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "milestone" => Ok(Self::Milestone),
            "random" => Ok(Self::Random),
            "opportunity" => Ok(Self::Opportunity),
            "chain" => Ok(Self::Chain),
            _ => Err(DomainError::parse(format!("Unknown event type: {}", s))),
        }
    }
}

/// Where the event content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    #[default]
    Scripted,
    AiGenerated,
    AiCached,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scripted => "scripted",
            Self::AiGenerated => "ai_generated",
            Self::AiCached => "ai_cached",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scripted" => Ok(Self::Scripted),
            "ai_generated" => Ok(Self::AiGenerated),
            "ai_cached" => Ok(Self::AiCached),
            _ => Err(DomainError::parse(format!("Unknown event source: {}", s))),
        }
    }
}

// =============================================================================
// Choice and StatEffect
// =============================================================================

/// A signed change to one player stat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatEffect {
    pub stat: String,
    pub delta: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StatEffect {
    pub fn new(stat: impl Into<String>, delta: f64) -> Self {
        Self {
            stat: stat.into(),
            delta,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One option within an event.
///
/// `chained_event_id` is a lookup key for a follow-up event, not an owning
/// reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub effects: Vec<StatEffect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chained_event_id: Option<String>,
}

impl Choice {
    pub fn new(id: impl Into<String>, text: impl Into<String>, effects: Vec<StatEffect>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            effects,
            chained_event_id: None,
        }
    }

    pub fn with_chained_event(mut self, event_id: impl Into<String>) -> Self {
        self.chained_event_id = Some(event_id.into());
        self
    }

    /// True if this choice links to a follow-up event.
    pub fn is_chained(&self) -> bool {
        self.chained_event_id
            .as_deref()
            .is_some_and(|id| !id.is_empty())
    }
}

fn validate_choices(choices: &[Choice]) -> Result<(), DomainError> {
    if !(MIN_CHOICES..=MAX_CHOICES).contains(&choices.len()) {
        return Err(DomainError::validation(format!(
            "Event must have between {} and {} choices",
            MIN_CHOICES, MAX_CHOICES
        )));
    }

    for (index, choice) in choices.iter().enumerate() {
        let position = index + 1;
        if choice.id.is_empty() {
            return Err(DomainError::validation(format!(
                "Choice {} must have a valid ID",
                position
            )));
        }
        if choice.text.is_empty() {
            return Err(DomainError::validation(format!(
                "Choice {} must have text",
                position
            )));
        }
        if choice.effects.is_empty() {
            return Err(DomainError::validation(format!(
                "Choice {} must have at least one effect",
                position
            )));
        }
    }

    Ok(())
}

// =============================================================================
// Draft, update and record shapes
// =============================================================================

/// Unvalidated input for [`Event::new`].
///
/// `EventDraft::new` fills the same defaults the game has always used:
/// ages 0-120, no tags, branch weight 1.0, rarity 1.0, scripted, active.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub event_id: String,
    pub event_type: EventType,
    pub title: String,
    pub description: String,
    pub min_age: i32,
    pub max_age: i32,
    pub choices: Vec<Choice>,
    pub tags: Vec<String>,
    pub branch_weight: f64,
    pub rarity_factor: f64,
    pub source: EventSource,
    pub prerequisites: Option<Prerequisites>,
    pub ai_signature_hash: Option<String>,
    pub id: Option<EventId>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl EventDraft {
    pub fn new(
        event_id: impl Into<String>,
        event_type: EventType,
        title: impl Into<String>,
        description: impl Into<String>,
        choices: Vec<Choice>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type,
            title: title.into(),
            description: description.into(),
            min_age: MIN_AGE,
            max_age: MAX_AGE,
            choices,
            tags: Vec::new(),
            branch_weight: 1.0,
            rarity_factor: 1.0,
            source: EventSource::Scripted,
            prerequisites: None,
            ai_signature_hash: None,
            id: None,
            created_at: None,
            is_active: true,
        }
    }

    pub fn with_ages(mut self, min_age: i32, max_age: i32) -> Self {
        self.min_age = min_age;
        self.max_age = max_age;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_branch_weight(mut self, branch_weight: f64) -> Self {
        self.branch_weight = branch_weight;
        self
    }

    pub fn with_rarity_factor(mut self, rarity_factor: f64) -> Self {
        self.rarity_factor = rarity_factor;
        self
    }

    pub fn with_source(mut self, source: EventSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_prerequisites(mut self, prerequisites: Prerequisites) -> Self {
        self.prerequisites = Some(prerequisites);
        self
    }

    pub fn with_ai_signature_hash(mut self, hash: impl Into<String>) -> Self {
        self.ai_signature_hash = Some(hash.into());
        self
    }

    /// Set the ID (used when loading from storage).
    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Changes to the mutable fields of an event. `None` keeps the current value.
///
/// `id`, `eventId`, `createdAt` and the AI signature are fixed for the
/// event's lifetime and cannot be changed here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    /// `Some(None)` clears the prerequisites.
    #[serde(default, deserialize_with = "crate::common::nullable")]
    pub prerequisites: Option<Option<Prerequisites>>,
    pub choices: Option<Vec<Choice>>,
    pub tags: Option<Vec<String>>,
    pub branch_weight: Option<f64>,
    pub rarity_factor: Option<f64>,
    pub source: Option<EventSource>,
    pub is_active: Option<bool>,
}

/// Persisted/wire shape of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: EventId,
    pub event_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub title: String,
    pub description: String,
    pub min_age: i32,
    pub max_age: i32,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub branch_weight: f64,
    pub rarity_factor: f64,
    pub source: EventSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prerequisites: Option<Prerequisites>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_signature_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

// =============================================================================
// Event
// =============================================================================

/// A narrative beat with age gating, prerequisites and 2-4 choices.
///
/// # Invariants
///
/// - `event_code` matches `evt_<digits>` and is 5-20 characters
/// - `title` is 3-255 characters, `description` at least 10
/// - `0 <= min_age <= max_age <= 120`
/// - 2-4 choices, each with an ID, text and at least one effect
/// - `branch_weight` in [0.0, 10.0], `rarity_factor` in [0.1, 10.0]
///
/// # Example
///
/// ```
/// use chrono::TimeZone;
/// use whatif_domain::{Choice, Event, StatEffect};
///
/// let now = chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap();
/// let choices = vec![
///     Choice::new("c1", "Accept diploma", vec![StatEffect::new("knowledge", 3.0)]),
///     Choice::new("c2", "Give a speech", vec![StatEffect::new("social", 2.0)]),
/// ];
/// let event = Event::create_milestone(
///     "evt_00100",
///     "Graduation",
///     "You graduate from high school",
///     18,
///     choices,
///     vec!["education".to_string()],
///     now,
/// )
/// .unwrap();
///
/// assert!(event.can_trigger_at(18));
/// assert_eq!(event.summary(), "Graduation (milestone) - 2 choices");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EventRecord", into = "EventRecord")]
pub struct Event {
    // Identity
    id: EventId,
    event_code: EventCode,

    // Classification
    event_type: EventType,
    source: EventSource,
    ai_signature_hash: Option<String>,

    // Content
    title: EventTitle,
    description: EventDescription,
    choices: Vec<Choice>,
    tags: Vec<String>,
    prerequisites: Option<Prerequisites>,

    // Gating and weighting
    ages: AgeRange,
    branch_weight: BranchWeight,
    rarity_factor: RarityFactor,

    // Lifecycle
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl Event {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Validate `draft` and build an event.
    ///
    /// `now` stamps `created_at` and the generated ID when the draft does not
    /// carry them.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for the first broken rule.
    pub fn new(draft: EventDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let event_code = EventCode::new(draft.event_id)?;
        let title = EventTitle::new(draft.title)?;
        let description = EventDescription::new(draft.description)?;
        let ages = AgeRange::new(draft.min_age, draft.max_age)?;
        validate_choices(&draft.choices)?;
        let branch_weight = BranchWeight::new(draft.branch_weight)?;
        let rarity_factor = RarityFactor::new(draft.rarity_factor)?;

        Ok(Self {
            id: draft.id.unwrap_or_else(|| EventId::generate(now)),
            event_code,
            event_type: draft.event_type,
            source: draft.source,
            ai_signature_hash: draft.ai_signature_hash.and_then(some_if_not_empty),
            title,
            description,
            choices: draft.choices,
            tags: draft.tags,
            prerequisites: draft.prerequisites,
            ages,
            branch_weight,
            rarity_factor,
            is_active: draft.is_active,
            created_at: draft.created_at.unwrap_or(now),
        })
    }

    /// A milestone fires at exactly one age with neutral weighting.
    pub fn create_milestone(
        event_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        age: i32,
        choices: Vec<Choice>,
        tags: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let draft = EventDraft::new(event_id, EventType::Milestone, title, description, choices)
            .with_ages(age, age)
            .with_tags(tags)
            .with_branch_weight(1.0)
            .with_rarity_factor(1.0);
        Self::new(draft, now)
    }

    /// A random event has a lowered branch weight (0.8). Pass `1.0` as
    /// `rarity_factor` for an ordinary one.
    pub fn create_random(
        event_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        min_age: i32,
        max_age: i32,
        choices: Vec<Choice>,
        tags: Vec<String>,
        rarity_factor: f64,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let draft = EventDraft::new(event_id, EventType::Random, title, description, choices)
            .with_ages(min_age, max_age)
            .with_tags(tags)
            .with_branch_weight(0.8)
            .with_rarity_factor(rarity_factor);
        Self::new(draft, now)
    }

    /// An opportunity is weighted 0.9 and slightly rare (1.2).
    pub fn create_opportunity(
        event_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        min_age: i32,
        max_age: i32,
        choices: Vec<Choice>,
        tags: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let draft = EventDraft::new(event_id, EventType::Opportunity, title, description, choices)
            .with_ages(min_age, max_age)
            .with_tags(tags)
            .with_branch_weight(0.9)
            .with_rarity_factor(1.2);
        Self::new(draft, now)
    }

    /// Rebuild an event from its persisted record.
    ///
    /// The record goes through the same validation as a fresh event, so a
    /// corrupt row fails here instead of leaking into the game.
    pub fn from_data(record: EventRecord) -> Result<Self, DomainError> {
        let created_at = record.created_at;
        let mut draft = EventDraft::new(
            record.event_id,
            record.event_type,
            record.title,
            record.description,
            record.choices,
        )
        .with_ages(record.min_age, record.max_age)
        .with_tags(record.tags)
        .with_branch_weight(record.branch_weight)
        .with_rarity_factor(record.rarity_factor)
        .with_source(record.source)
        .with_id(record.id)
        .with_created_at(created_at)
        .with_active(record.is_active);
        draft.prerequisites = record.prerequisites;
        draft.ai_signature_hash = record.ai_signature_hash;
        Self::new(draft, created_at)
    }

    /// The persisted/wire shape of this event.
    pub fn to_record(&self) -> EventRecord {
        EventRecord {
            id: self.id.clone(),
            event_id: self.event_code.as_str().to_string(),
            event_type: self.event_type,
            title: self.title.as_str().to_string(),
            description: self.description.as_str().to_string(),
            min_age: self.ages.min(),
            max_age: self.ages.max(),
            choices: self.choices.clone(),
            tags: self.tags.clone(),
            branch_weight: self.branch_weight.value(),
            rarity_factor: self.rarity_factor.value(),
            source: self.source,
            prerequisites: self.prerequisites.clone(),
            ai_signature_hash: self.ai_signature_hash.clone(),
            created_at: self.created_at,
            is_active: self.is_active,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> &EventId {
        &self.id
    }

    /// The business key, e.g. `evt_00123`.
    #[inline]
    pub fn event_code(&self) -> &EventCode {
        &self.event_code
    }

    #[inline]
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    #[inline]
    pub fn source(&self) -> EventSource {
        self.source
    }

    #[inline]
    pub fn ai_signature_hash(&self) -> Option<&str> {
        self.ai_signature_hash.as_deref()
    }

    #[inline]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    #[inline]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    #[inline]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[inline]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[inline]
    pub fn prerequisites(&self) -> Option<&Prerequisites> {
        self.prerequisites.as_ref()
    }

    #[inline]
    pub fn min_age(&self) -> i32 {
        self.ages.min()
    }

    #[inline]
    pub fn max_age(&self) -> i32 {
        self.ages.max()
    }

    #[inline]
    pub fn branch_weight(&self) -> f64 {
        self.branch_weight.value()
    }

    #[inline]
    pub fn rarity_factor(&self) -> f64 {
        self.rarity_factor.value()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Look up a choice by its ID.
    pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
        self.choices.iter().find(|choice| choice.id == choice_id)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Apply `update` and re-validate the result.
    ///
    /// `id`, the event code, the AI signature and `created_at` carry over
    /// unchanged. On error `self` is untouched.
    pub fn with_updates(&self, update: EventUpdate) -> Result<Self, DomainError> {
        let mut draft = self.to_draft();
        if let Some(event_type) = update.event_type {
            draft.event_type = event_type;
        }
        if let Some(title) = update.title {
            draft.title = title;
        }
        if let Some(description) = update.description {
            draft.description = description;
        }
        if let Some(min_age) = update.min_age {
            draft.min_age = min_age;
        }
        if let Some(max_age) = update.max_age {
            draft.max_age = max_age;
        }
        if let Some(prerequisites) = update.prerequisites {
            draft.prerequisites = prerequisites;
        }
        if let Some(choices) = update.choices {
            draft.choices = choices;
        }
        if let Some(tags) = update.tags {
            draft.tags = tags;
        }
        if let Some(branch_weight) = update.branch_weight {
            draft.branch_weight = branch_weight;
        }
        if let Some(rarity_factor) = update.rarity_factor {
            draft.rarity_factor = rarity_factor;
        }
        if let Some(source) = update.source {
            draft.source = source;
        }
        if let Some(is_active) = update.is_active {
            draft.is_active = is_active;
        }
        Self::new(draft, self.created_at)
    }

    /// Toggle availability. The flag carries no invariant.
    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    fn to_draft(&self) -> EventDraft {
        let mut draft = EventDraft::new(
            self.event_code.as_str(),
            self.event_type,
            self.title.as_str(),
            self.description.as_str(),
            self.choices.clone(),
        )
        .with_ages(self.ages.min(), self.ages.max())
        .with_tags(self.tags.clone())
        .with_branch_weight(self.branch_weight.value())
        .with_rarity_factor(self.rarity_factor.value())
        .with_source(self.source)
        .with_id(self.id.clone())
        .with_created_at(self.created_at)
        .with_active(self.is_active);
        draft.prerequisites = self.prerequisites.clone();
        draft.ai_signature_hash = self.ai_signature_hash.clone();
        draft
    }

    // =========================================================================
    // Domain behavior
    // =========================================================================

    /// True if the event is active and `age` falls inside its window.
    pub fn can_trigger_at(&self, age: i32) -> bool {
        self.is_active && self.ages.contains(age)
    }

    /// True if every prerequisite stat is present in `player_stats`.
    ///
    /// Only presence is checked; the stored requirement value is not compared.
    pub fn meets_prerequisites<V>(&self, player_stats: &BTreeMap<String, V>) -> bool {
        match &self.prerequisites {
            None => true,
            Some(prerequisites) => prerequisites
                .keys()
                .all(|stat| player_stats.contains_key(stat)),
        }
    }

    /// `branch_weight * rarity_factor`; higher is more likely to be drawn.
    pub fn selection_score(&self) -> f64 {
        self.branch_weight.value() * self.rarity_factor.value()
    }

    pub fn is_rare(&self) -> bool {
        self.rarity_factor.value() > RARE_THRESHOLD
    }

    pub fn is_common(&self) -> bool {
        self.rarity_factor.value() < COMMON_THRESHOLD
    }

    /// Pick a choice uniformly.
    ///
    /// `roll(min, max)` must return an integer in the inclusive range, the
    /// same contract as the engine's random port. Not for anything that
    /// needs unpredictability.
    pub fn random_choice(&self, roll: impl FnOnce(i32, i32) -> i32) -> &Choice {
        let last = self.choices.len() - 1;
        let picked = roll(0, last as i32);
        let index = usize::try_from(picked).unwrap_or(0).min(last);
        &self.choices[index]
    }

    pub fn has_chained_events(&self) -> bool {
        self.choices.iter().any(Choice::is_chained)
    }

    /// Every stat name touched by any choice.
    pub fn affected_stats(&self) -> BTreeSet<&str> {
        self.choices
            .iter()
            .flat_map(|choice| choice.effects.iter())
            .map(|effect| effect.stat.as_str())
            .collect()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn has_type(&self, event_type: EventType) -> bool {
        self.event_type == event_type
    }

    /// `"<title> (<type>) - <N> choices"`
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) - {} choices",
            self.title,
            self.event_type,
            self.choices.len()
        )
    }
}

impl TryFrom<EventRecord> for Event {
    type Error = DomainError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        Self::from_data(record)
    }
}

impl From<Event> for EventRecord {
    fn from(event: Event) -> Self {
        event.to_record()
    }
}
