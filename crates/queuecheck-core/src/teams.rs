//! Team directory: which team owns a queue, and whether a line of history
//! text mentions one of that team's members.

use crate::error::{QueueCheckError, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamDirectory {
    teams: BTreeMap<String, Vec<String>>,
}

impl TeamDirectory {
    /// Build a directory, rejecting blank member identifiers (a blank
    /// identifier is a substring of every line).
    pub fn new(teams: BTreeMap<String, Vec<String>>) -> Result<Self> {
        for (team, members) in &teams {
            if team.trim().is_empty() {
                return Err(QueueCheckError::InvalidTeam {
                    team: team.clone(),
                    reason: "team name is empty".to_string(),
                });
            }
            if members.iter().any(|m| m.trim().is_empty()) {
                return Err(QueueCheckError::InvalidTeam {
                    team: team.clone(),
                    reason: "member identifier is empty".to_string(),
                });
            }
        }
        Ok(Self { teams })
    }

    pub fn members(&self, team: &str) -> &[String] {
        self.teams.get(team).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Resolve the team that owns `queue`: an exact name match wins,
    /// otherwise the first team (in name order) whose name occurs inside the
    /// queue name.
    pub fn team_for_queue(&self, queue: &str) -> Option<&str> {
        if let Some((name, _)) = self.teams.get_key_value(queue) {
            return Some(name.as_str());
        }
        self.teams
            .keys()
            .find(|name| queue.contains(name.as_str()))
            .map(String::as_str)
    }

    /// True if any member of `team` appears as a substring of `text`.
    pub fn has_member_in(&self, team: &str, text: &str) -> bool {
        self.members(team).iter().any(|m| text.contains(m.as_str()))
    }
}
