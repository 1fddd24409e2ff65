use crate::deadline::{timing, whole_days};
use crate::error::{QueueCheckError, Result};
use crate::policy::PolicyEntry;
use crate::ticket::TicketSnapshot;
use crate::types::{HealthState, WaitingParty};
use chrono::{Duration, NaiveDateTime};

/// Status name a ticket carries while paused on the customer.
pub const STALLED: &str = "stalled";

// ---------------------------------------------------------------------------
// HealthContext
// ---------------------------------------------------------------------------

pub struct HealthContext<'a> {
    pub overdue: bool,
    pub waiting: WaitingParty,
    pub status: &'a str,
    pub age: Duration,
    pub slow_hours: f64,
}

impl HealthContext<'_> {
    fn stalled(&self) -> bool {
        self.status.eq_ignore_ascii_case(STALLED)
    }

    fn customer(&self) -> bool {
        self.waiting == WaitingParty::Customer
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// One row of the decision table. Rules are tried in order; the first whose
/// condition holds decides the state.
pub struct Rule {
    pub id: &'static str,
    pub condition: fn(&HealthContext) -> bool,
    pub state: HealthState,
}

pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "on_time",
            condition: |ctx| !ctx.overdue,
            state: HealthState::OnTime,
        },
        Rule {
            id: "stalled_within_slow",
            condition: |ctx| {
                ctx.customer()
                    && ctx.stalled()
                    && (whole_days(ctx.age) as f64) < ctx.slow_hours / 24.0
            },
            state: HealthState::WaitingOnCustomerStalled,
        },
        Rule {
            id: "stalled_past_slow",
            condition: |ctx| ctx.customer() && ctx.stalled(),
            state: HealthState::TicketExpired,
        },
        Rule {
            id: "customer_within_slow",
            condition: |ctx| {
                ctx.customer()
                    && (ctx.age.num_milliseconds() as f64) / 1000.0 < ctx.slow_hours * 3600.0
            },
            state: HealthState::WaitingOnCustomer,
        },
        Rule {
            id: "customer_past_slow",
            condition: |ctx| ctx.customer(),
            state: HealthState::ShouldBeStalled,
        },
    ]
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct Classifier {
    rules: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn classify(&self, ctx: &HealthContext) -> HealthState {
        self.rules
            .iter()
            .find(|rule| (rule.condition)(ctx))
            .map(|rule| rule.state)
            // Overdue and staff spoke last: nothing else claims it.
            .unwrap_or(HealthState::OverdueNeedsStaff)
    }

    /// Classify one ticket. `waiting` is only consulted on overdue tickets.
    pub fn evaluate(
        &self,
        ticket: &TicketSnapshot,
        policy: Option<&PolicyEntry>,
        waiting: WaitingParty,
        now: NaiveDateTime,
    ) -> Result<Verdict> {
        let Some(policy) = policy else {
            return Ok(Verdict {
                health: HealthState::NoPolicy,
                needs: None,
                deadline: None,
                age: now - ticket.updated,
            });
        };

        let t = timing(policy, ticket.last_active(policy.activity), now).ok_or_else(|| {
            QueueCheckError::DeadlineOutOfRange {
                ticket: ticket.id.clone(),
            }
        })?;
        let ctx = HealthContext {
            overdue: t.overdue,
            waiting,
            status: &ticket.status,
            age: t.age,
            slow_hours: policy.slow_hours,
        };
        Ok(Verdict {
            health: self.classify(&ctx),
            needs: Some(policy.activity.needs(&ticket.queue)),
            deadline: Some(t.deadline),
            age: t.age,
        })
    }
}

/// The result of classifying one ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub health: HealthState,
    pub needs: Option<String>,
    pub deadline: Option<NaiveDateTime>,
    pub age: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityAttribute;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn ticket(status: &str, last_active: NaiveDateTime) -> TicketSnapshot {
        TicketSnapshot {
            id: "ticket/7".to_string(),
            subject: "vpn down".to_string(),
            queue: "support".to_string(),
            status: status.to_string(),
            owner: "bob".to_string(),
            requestor: None,
            created: last_active - Duration::days(30),
            updated: last_active,
        }
    }

    fn ctx(overdue: bool, waiting: WaitingParty, status: &str, age: Duration, slow: f64) -> HealthState {
        Classifier::default().classify(&HealthContext {
            overdue,
            waiting,
            status,
            age,
            slow_hours: slow,
        })
    }

    #[test]
    fn not_overdue_is_on_time_regardless_of_waiting() {
        for waiting in [WaitingParty::Customer, WaitingParty::Staff] {
            assert_eq!(
                ctx(false, waiting, "stalled", Duration::days(100), 24.0),
                HealthState::OnTime
            );
        }
    }

    #[test]
    fn overdue_staff() {
        assert_eq!(
            ctx(true, WaitingParty::Staff, "open", Duration::hours(72), 48.0),
            HealthState::OverdueNeedsStaff
        );
        assert_eq!(
            ctx(true, WaitingParty::Staff, "stalled", Duration::hours(72), 48.0),
            HealthState::OverdueNeedsStaff
        );
    }

    #[test]
    fn stalled_customer_by_whole_days() {
        assert_eq!(
            ctx(true, WaitingParty::Customer, "stalled", Duration::days(9), 240.0),
            HealthState::WaitingOnCustomerStalled
        );
        // 10 days 23 hours is still 10 whole days
        assert_eq!(
            ctx(
                true,
                WaitingParty::Customer,
                "Stalled",
                Duration::days(10) + Duration::hours(23),
                240.0
            ),
            HealthState::TicketExpired
        );
        assert_eq!(
            ctx(true, WaitingParty::Customer, "stalled", Duration::days(11), 240.0),
            HealthState::TicketExpired
        );
    }

    #[test]
    fn open_customer_by_seconds() {
        assert_eq!(
            ctx(true, WaitingParty::Customer, "open", Duration::hours(47), 48.0),
            HealthState::WaitingOnCustomer
        );
        assert_eq!(
            ctx(true, WaitingParty::Customer, "open", Duration::hours(48), 48.0),
            HealthState::ShouldBeStalled
        );
    }

    #[test]
    fn evaluate_open_ticket_overdue_on_staff() {
        let policy = PolicyEntry::new(ActivityAttribute::Updated, 4.0, 48.0);
        let t = ticket("open", now() - Duration::hours(72));
        let v = Classifier::default()
            .evaluate(&t, Some(&policy), WaitingParty::Staff, now())
            .unwrap();
        assert_eq!(v.health, HealthState::OverdueNeedsStaff);
        assert_eq!(
            v.needs.as_deref(),
            Some("needs checkin from customer or support POC")
        );
        assert_eq!(v.deadline, Some(t.updated + Duration::hours(48)));
        assert_eq!(v.age, Duration::hours(72));
    }

    #[test]
    fn evaluate_measures_from_created() {
        let policy = PolicyEntry::new(ActivityAttribute::Created, 1.0, 4.0);
        let t = ticket("new", now() - Duration::hours(1));
        let v = Classifier::default()
            .evaluate(&t, Some(&policy), WaitingParty::Staff, now())
            .unwrap();
        // created is 30 days before updated
        assert_eq!(v.health, HealthState::OverdueNeedsStaff);
        assert_eq!(v.needs.as_deref(), Some("needs update from support POC"));
        assert_eq!(v.deadline, Some(t.created + Duration::hours(4)));
    }

    #[test]
    fn evaluate_stalled_scenarios() {
        let policy = PolicyEntry::new(ActivityAttribute::Updated, 4.0, 240.0);
        let c = Classifier::default();
        let nine = ticket("stalled", now() - Duration::days(9));
        let eleven = ticket("stalled", now() - Duration::days(11));
        // nine days is inside the ten-day deadline
        assert_eq!(
            c.evaluate(&nine, Some(&policy), WaitingParty::Customer, now()).unwrap().health,
            HealthState::OnTime
        );
        assert_eq!(
            c.evaluate(&eleven, Some(&policy), WaitingParty::Customer, now()).unwrap().health,
            HealthState::TicketExpired
        );
    }

    #[test]
    fn evaluate_reports_unreachable_deadline() {
        let policy = PolicyEntry::new(ActivityAttribute::Updated, 4.0, 48.0);
        let far = NaiveDate::from_ymd_opt(262_142, 12, 31)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let err = Classifier::default()
            .evaluate(&ticket("open", far), Some(&policy), WaitingParty::Staff, now())
            .unwrap_err();
        assert!(matches!(
            err,
            QueueCheckError::DeadlineOutOfRange { ref ticket } if ticket == "ticket/7"
        ));
        assert!(err.is_per_ticket());
    }

    #[test]
    fn evaluate_without_policy() {
        let t = ticket("resolved", now() - Duration::hours(5));
        let v = Classifier::default()
            .evaluate(&t, None, WaitingParty::Customer, now())
            .unwrap();
        assert_eq!(v.health, HealthState::NoPolicy);
        assert!(v.needs.is_none());
        assert!(v.deadline.is_none());
        assert_eq!(v.age, Duration::hours(5));
    }

    #[test]
    fn rule_ids_are_unique() {
        let rules = default_rules();
        let mut ids: Vec<_> = rules.iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }
}
