use crate::error::{QueueCheckError, Result};
use crate::types::ActivityAttribute;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Timestamp format the backend uses for `Created` and `LastUpdated`.
pub const TICKET_TIME: &str = "%a %b %d %H:%M:%S %Y";

/// A ticket record as the backend returns it: field name to text value.
pub type RawTicket = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSnapshot {
    pub id: String,
    pub subject: String,
    pub queue: String,
    pub status: String,
    pub owner: String,
    pub requestor: Option<String>,
    pub created: NaiveDateTime,
    pub updated: NaiveDateTime,
}

impl TicketSnapshot {
    pub fn from_raw(raw: &RawTicket) -> Result<Self> {
        let id = field(raw, "?", "id")?.to_string();
        let created = parse_time(&id, "Created", field(raw, &id, "Created")?)?;
        let updated = parse_time(&id, "LastUpdated", field(raw, &id, "LastUpdated")?)?;
        Ok(Self {
            subject: field(raw, &id, "Subject")?.to_string(),
            queue: field(raw, &id, "Queue")?.to_string(),
            status: field(raw, &id, "Status")?.to_string(),
            owner: field(raw, &id, "Owner")?.to_string(),
            requestor: raw
                .get("Requestors")
                .filter(|r| !r.trim().is_empty())
                .cloned(),
            created,
            updated,
            id,
        })
    }

    /// The timestamp a policy measures from.
    pub fn last_active(&self, activity: ActivityAttribute) -> NaiveDateTime {
        match activity {
            ActivityAttribute::Created => self.created,
            ActivityAttribute::Updated => self.updated,
        }
    }
}

fn field<'a>(raw: &'a RawTicket, ticket: &str, name: &'static str) -> Result<&'a str> {
    raw.get(name)
        .map(String::as_str)
        .ok_or_else(|| QueueCheckError::MissingField {
            ticket: ticket.to_string(),
            field: name,
        })
}

fn parse_time(ticket: &str, field: &'static str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TICKET_TIME).map_err(|source| {
        QueueCheckError::TimeParse {
            ticket: ticket.to_string(),
            field,
            value: value.to_string(),
            source,
        }
    })
}
