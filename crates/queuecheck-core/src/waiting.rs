//! Who is the ball with: the customer or staff?
//!
//! The heuristic looks only at the last non-blank line of a ticket's
//! history. If the owner's name is on that line, staff spoke last and the
//! ticket is waiting on the customer. Unowned tickets check the line against
//! every member of the team that owns the queue instead. Matching is plain
//! substring search, so a name that collides with other words on the line
//! yields a false `Customer`.

use crate::error::{QueueCheckError, Result};
use crate::teams::TeamDirectory;
use crate::types::WaitingParty;
use tracing::debug;

/// Owner value the backend reports for unassigned tickets.
pub const DEFAULT_UNOWNED: &str = "Nobody";

/// Inputs for one waiting-party decision.
#[derive(Debug, Clone, Copy)]
pub struct WaitingInput<'a> {
    pub ticket: &'a str,
    pub owner: &'a str,
    pub queue: &'a str,
    pub history: &'a str,
}

pub struct WaitingDetector<'a> {
    teams: &'a TeamDirectory,
    unowned: &'a str,
}

impl<'a> WaitingDetector<'a> {
    pub fn new(teams: &'a TeamDirectory, unowned: &'a str) -> Self {
        Self { teams, unowned }
    }

    pub fn detect(&self, input: WaitingInput<'_>) -> Result<WaitingParty> {
        let line = meaningful_line(input.history).ok_or_else(|| QueueCheckError::HistoryEmpty {
            ticket: input.ticket.to_string(),
        })?;
        debug!(ticket = input.ticket, line, "meaningful history line");

        if !input.owner.is_empty() && line.contains(input.owner) {
            return Ok(WaitingParty::Customer);
        }
        if input.owner == self.unowned {
            let Some(team) = self.teams.team_for_queue(input.queue) else {
                debug!(
                    ticket = input.ticket,
                    queue = input.queue,
                    "no team owns queue; assuming staff"
                );
                return Ok(WaitingParty::Staff);
            };
            if self.teams.has_member_in(team, line) {
                return Ok(WaitingParty::Customer);
            }
        }
        Ok(WaitingParty::Staff)
    }
}

/// The last non-blank line of a history, i.e. the tail of the most recent
/// activity record.
pub fn meaningful_line(history: &str) -> Option<&str> {
    history.lines().rev().find(|l| !l.trim().is_empty())
}
