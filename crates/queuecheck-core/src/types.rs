use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ActivityAttribute
// ---------------------------------------------------------------------------

/// Which ticket timestamp a policy measures staleness from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAttribute {
    Created,
    Updated,
}

impl ActivityAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityAttribute::Created => "created",
            ActivityAttribute::Updated => "updated",
        }
    }

    /// What the ticket needs once it is overdue, worded for the queue's POC.
    pub fn needs(self, queue: &str) -> String {
        match self {
            ActivityAttribute::Created => format!("needs update from {queue} POC"),
            ActivityAttribute::Updated => {
                format!("needs checkin from customer or {queue} POC")
            }
        }
    }
}

impl fmt::Display for ActivityAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityAttribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ActivityAttribute::Created),
            "updated" => Ok(ActivityAttribute::Updated),
            _ => Err(format!(
                "unknown activity attribute '{s}': must be created or updated"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// WaitingParty
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitingParty {
    Customer,
    Staff,
}

impl fmt::Display for WaitingParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitingParty::Customer => f.write_str("customer"),
            WaitingParty::Staff => f.write_str("staff"),
        }
    }
}

// ---------------------------------------------------------------------------
// HealthState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    OnTime,
    WaitingOnCustomer,
    WaitingOnCustomerStalled,
    ShouldBeStalled,
    TicketExpired,
    OverdueNeedsStaff,
    NoPolicy,
}

impl HealthState {
    pub fn all() -> &'static [HealthState] {
        &[
            HealthState::OnTime,
            HealthState::WaitingOnCustomer,
            HealthState::WaitingOnCustomerStalled,
            HealthState::ShouldBeStalled,
            HealthState::TicketExpired,
            HealthState::OverdueNeedsStaff,
            HealthState::NoPolicy,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::OnTime => "on_time",
            HealthState::WaitingOnCustomer => "waiting_on_customer",
            HealthState::WaitingOnCustomerStalled => "waiting_on_customer_stalled",
            HealthState::ShouldBeStalled => "should_be_stalled",
            HealthState::TicketExpired => "ticket_expired",
            HealthState::OverdueNeedsStaff => "overdue_needs_staff",
            HealthState::NoPolicy => "no_policy",
        }
    }

    /// Human-facing label used when rendering a ticket line.
    pub fn label(self) -> &'static str {
        match self {
            HealthState::OnTime => "On Time",
            HealthState::WaitingOnCustomer => "Waiting on Customer",
            HealthState::WaitingOnCustomerStalled => "Waiting on Customer (ticket stalled)",
            HealthState::ShouldBeStalled => "Should be moved to 'stalled' status",
            HealthState::TicketExpired => "Ticket should be expired",
            HealthState::OverdueNeedsStaff => "Overdue",
            HealthState::NoPolicy => "No policy specified",
        }
    }

    /// True when someone on staff has to act on the ticket.
    pub fn needs_attention(self) -> bool {
        matches!(
            self,
            HealthState::OverdueNeedsStaff
                | HealthState::ShouldBeStalled
                | HealthState::TicketExpired
        )
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
