//! Batch orchestration: classify an ordered batch of tickets against their
//! parallel histories.
//!
//! Every input ticket yields exactly one outcome at the same position.
//! Per-ticket problems (missing fields, bad timestamps) become a
//! [`TicketFailure`] in that slot; an empty history degrades to
//! [`WaitingParty::Staff`] with a warning attached. Only a caller error
//! (mismatched lengths) fails the whole batch.

use crate::classifier::Classifier;
use crate::error::{QueueCheckError, Result};
use crate::policy::StatusPolicyTable;
use crate::teams::TeamDirectory;
use crate::ticket::{RawTicket, TicketSnapshot};
use crate::types::{HealthState, WaitingParty};
use crate::waiting::{WaitingDetector, WaitingInput};
use chrono::{Duration, NaiveDateTime};
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub ticket_id: String,
    pub subject: String,
    pub queue: String,
    pub status: String,
    pub owner: String,
    pub health: HealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waiting: Option<WaitingParty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDateTime>,
    pub age_seconds: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Classification {
    pub fn age(&self) -> Duration {
        Duration::seconds(self.age_seconds)
    }
}

#[derive(Debug, Serialize)]
pub struct TicketFailure {
    pub ticket_id: String,
    #[serde(serialize_with = "as_display")]
    pub error: QueueCheckError,
}

fn as_display<S: Serializer>(err: &QueueCheckError, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(err)
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TicketOutcome {
    Classified(Classification),
    Failed(TicketFailure),
}

impl TicketOutcome {
    pub fn ticket_id(&self) -> &str {
        match self {
            TicketOutcome::Classified(c) => &c.ticket_id,
            TicketOutcome::Failed(f) => &f.ticket_id,
        }
    }
}

/// One outcome per input ticket, in input order.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<TicketOutcome>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn ticket_ids(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().map(TicketOutcome::ticket_id)
    }

    pub fn classifications(&self) -> impl Iterator<Item = &Classification> {
        self.outcomes.iter().filter_map(|o| match o {
            TicketOutcome::Classified(c) => Some(c),
            TicketOutcome::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &TicketFailure> {
        self.outcomes.iter().filter_map(|o| match o {
            TicketOutcome::Failed(f) => Some(f),
            TicketOutcome::Classified(_) => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct Orchestrator<'a> {
    policies: &'a StatusPolicyTable,
    detector: WaitingDetector<'a>,
    classifier: Classifier,
}

impl<'a> Orchestrator<'a> {
    pub fn new(policies: &'a StatusPolicyTable, teams: &'a TeamDirectory, unowned: &'a str) -> Self {
        Self {
            policies,
            detector: WaitingDetector::new(teams, unowned),
            classifier: Classifier::default(),
        }
    }

    /// Classify `tickets[i]` against `histories[i]` for every `i`.
    pub fn run(
        &self,
        tickets: &[RawTicket],
        histories: &[String],
        now: NaiveDateTime,
    ) -> Result<BatchReport> {
        if tickets.len() != histories.len() {
            return Err(QueueCheckError::BatchLengthMismatch {
                tickets: tickets.len(),
                histories: histories.len(),
            });
        }

        let outcomes = tickets
            .iter()
            .zip(histories)
            .enumerate()
            .map(|(index, (raw, history))| match self.classify(raw, history, now) {
                Ok(c) => TicketOutcome::Classified(c),
                Err(error) => {
                    let ticket_id = raw
                        .get("id")
                        .cloned()
                        .unwrap_or_else(|| format!("#{index}"));
                    warn!(ticket = %ticket_id, %error, "ticket could not be classified");
                    TicketOutcome::Failed(TicketFailure { ticket_id, error })
                }
            })
            .collect();
        Ok(BatchReport { outcomes })
    }

    /// Classify a single ticket. Errors are scoped to this ticket.
    pub fn classify(
        &self,
        raw: &RawTicket,
        history: &str,
        now: NaiveDateTime,
    ) -> Result<Classification> {
        let ticket = TicketSnapshot::from_raw(raw)?;
        debug!(ticket = %ticket.id, requestor = ?ticket.requestor, "classifying");

        let policy = self.policies.resolve(&ticket.status);
        let mut warnings = Vec::new();
        let waiting = match policy {
            None => {
                info!(ticket = %ticket.id, status = %ticket.status, "no policy for status");
                None
            }
            Some(_) => Some(self.waiting_party(&ticket, history, &mut warnings)),
        };

        let verdict = self.classifier.evaluate(
            &ticket,
            policy,
            waiting.unwrap_or(WaitingParty::Staff),
            now,
        )?;
        debug!(ticket = %ticket.id, health = %verdict.health, "classified");

        Ok(Classification {
            health: verdict.health,
            waiting,
            needs: verdict.needs,
            deadline: verdict.deadline,
            age_seconds: verdict.age.num_seconds(),
            warnings,
            ticket_id: ticket.id,
            subject: ticket.subject,
            queue: ticket.queue,
            status: ticket.status,
            owner: ticket.owner,
        })
    }

    fn waiting_party(
        &self,
        ticket: &TicketSnapshot,
        history: &str,
        warnings: &mut Vec<String>,
    ) -> WaitingParty {
        let input = WaitingInput {
            ticket: &ticket.id,
            owner: &ticket.owner,
            queue: &ticket.queue,
            history,
        };
        match self.detector.detect(input) {
            Ok(party) => party,
            Err(error) => {
                warn!(ticket = %ticket.id, %error, "falling back to staff");
                warnings.push(format!("{error}; assumed waiting on staff"));
                WaitingParty::Staff
            }
        }
    }
}
