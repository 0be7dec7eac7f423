//! Event authoring, weighted selection and choice resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use whatif_domain::{
    Choice, DomainError, Event, EventCode, EventDraft, EventSource, EventType, EventUpdate,
    Prerequisites, RunStats,
};

use crate::infrastructure::ports::{ClockPort, EventRepo, RandomPort, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Event not found: {0}")]
    NotFound(String),
    #[error("Choice {choice_id} not found in event {event_code}")]
    ChoiceNotFound {
        event_code: String,
        choice_id: String,
    },
    #[error("Event already exists: {0}")]
    AlreadyExists(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Authoring payload for a new event. Omitted fields take the event defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    pub event_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub min_age: Option<i32>,
    #[serde(default)]
    pub max_age: Option<i32>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub branch_weight: Option<f64>,
    #[serde(default)]
    pub rarity_factor: Option<f64>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub prerequisites: Option<Prerequisites>,
    #[serde(default)]
    pub ai_signature_hash: Option<String>,
}

impl CreateEventInput {
    fn into_draft(self) -> EventDraft {
        let mut draft = EventDraft::new(
            self.event_id,
            self.event_type,
            self.title,
            self.description,
            self.choices,
        )
        .with_tags(self.tags);
        if let Some(min_age) = self.min_age {
            draft.min_age = min_age;
        }
        if let Some(max_age) = self.max_age {
            draft.max_age = max_age;
        }
        if let Some(branch_weight) = self.branch_weight {
            draft.branch_weight = branch_weight;
        }
        if let Some(rarity_factor) = self.rarity_factor {
            draft.rarity_factor = rarity_factor;
        }
        if let Some(source) = self.source {
            draft.source = source;
        }
        draft.prerequisites = self.prerequisites;
        draft.ai_signature_hash = self.ai_signature_hash;
        draft
    }
}

/// Result of taking a choice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOutcome {
    pub choice_id: String,
    pub stats: RunStats,
    /// Follow-up event to present next, if the choice links one.
    pub chained_event_id: Option<String>,
}

pub struct EventOps {
    repo: Arc<dyn EventRepo>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl EventOps {
    pub fn new(
        repo: Arc<dyn EventRepo>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            repo,
            clock,
            random,
        }
    }

    pub async fn create_event(&self, input: CreateEventInput) -> Result<Event, EventError> {
        let event = Event::new(input.into_draft(), self.clock.now())?;

        if self.repo.get_by_code(event.event_code()).await?.is_some() {
            return Err(EventError::AlreadyExists(event.event_code().to_string()));
        }
        self.repo.save(&event).await?;

        tracing::info!(
            event_code = %event.event_code(),
            event_type = %event.event_type(),
            "Event created"
        );
        Ok(event)
    }

    /// A code that is not even well-formed simply finds nothing.
    pub async fn get_event(&self, code: &str) -> Result<Option<Event>, EventError> {
        let Ok(code) = EventCode::new(code) else {
            return Ok(None);
        };
        Ok(self.repo.get_by_code(&code).await?)
    }

    pub async fn list_active(&self) -> Result<Vec<Event>, EventError> {
        Ok(self.repo.list_active().await?)
    }

    /// Apply `update` and save. The event code, ID and creation time never change.
    pub async fn update_event(&self, code: &str, update: EventUpdate) -> Result<Event, EventError> {
        let current = self.require(code).await?;
        let updated = current.with_updates(update)?;
        self.repo.save(&updated).await?;

        tracing::info!(event_code = %code, "Event updated");
        Ok(updated)
    }

    /// Draw the next event for a player of `age` holding `stats`.
    ///
    /// Candidates are active events whose age window contains `age` and
    /// whose prerequisites are present in `stats`. Each is drawn with
    /// probability proportional to its selection score; a score of zero is
    /// never drawn. `None` when nothing qualifies.
    pub async fn select_event(
        &self,
        age: i32,
        stats: &BTreeMap<String, f64>,
    ) -> Result<Option<Event>, EventError> {
        let candidates: Vec<Event> = self
            .repo
            .list_active()
            .await?
            .into_iter()
            .filter(|event| {
                event.can_trigger_at(age)
                    && event.meets_prerequisites(stats)
                    && event.selection_score() > 0.0
            })
            .collect();

        let total: f64 = candidates.iter().map(Event::selection_score).sum();
        if candidates.is_empty() || total <= 0.0 {
            tracing::debug!(age, "No eligible event");
            return Ok(None);
        }

        let roll = self.random.gen_unit() * total;
        let mut cumulative = 0.0;
        let mut picked = None;
        for (index, event) in candidates.iter().enumerate() {
            cumulative += event.selection_score();
            if roll < cumulative {
                picked = Some(index);
                break;
            }
        }
        // Float rounding can leave the roll just past the final bucket.
        let index = picked.unwrap_or(candidates.len() - 1);
        let event = candidates.into_iter().nth(index);

        if let Some(event) = &event {
            tracing::debug!(
                age,
                event_code = %event.event_code(),
                score = event.selection_score(),
                "Selected event"
            );
        }
        Ok(event)
    }

    /// Resolve `choice_id` of event `code` against `stats`.
    pub async fn apply_choice(
        &self,
        code: &str,
        choice_id: &str,
        stats: RunStats,
    ) -> Result<ChoiceOutcome, EventError> {
        let event = self.require(code).await?;
        let choice = event
            .choice(choice_id)
            .ok_or_else(|| EventError::ChoiceNotFound {
                event_code: code.to_string(),
                choice_id: choice_id.to_string(),
            })?;
        Ok(outcome(choice, stats))
    }

    /// Resolve a uniformly random choice of event `code`.
    pub async fn apply_random_choice(
        &self,
        code: &str,
        stats: RunStats,
    ) -> Result<ChoiceOutcome, EventError> {
        let event = self.require(code).await?;
        let choice = event.random_choice(|min, max| self.random.gen_range(min, max));
        Ok(outcome(choice, stats))
    }

    async fn require(&self, code: &str) -> Result<Event, EventError> {
        self.get_event(code)
            .await?
            .ok_or_else(|| EventError::NotFound(code.to_string()))
    }
}

fn outcome(choice: &Choice, stats: RunStats) -> ChoiceOutcome {
    ChoiceOutcome {
        choice_id: choice.id.clone(),
        stats: stats.apply_choice(choice),
        chained_event_id: choice.chained_event_id.clone().filter(|id| !id.is_empty()),
    }
}
