//! RTQL search query for the tickets a check run should look at.

use crate::error::{QueueCheckError, Result};

/// Build the search query:
///
/// `[owner clause and ](Queue = "a" or ...)[ and (Status != "x" and ...)]`
///
/// An empty `owners` list searches every owner; an empty `skip_states` list
/// searches every status.
pub fn build_query(owners: &[String], queues: &[String], skip_states: &[String]) -> Result<String> {
    if queues.is_empty() {
        return Err(QueueCheckError::NoQueues);
    }

    let mut clauses = Vec::with_capacity(3);
    match owners {
        [] => {}
        [one] => clauses.push(format!("Owner = {}", quote(one))),
        many => clauses.push(format!("({})", join(many, "Owner =", " or "))),
    }
    clauses.push(format!("({})", join(queues, "Queue =", " or ")));
    if !skip_states.is_empty() {
        clauses.push(format!("({})", join(skip_states, "Status !=", " and ")));
    }
    Ok(clauses.join(" and "))
}

fn join(values: &[String], op: &str, sep: &str) -> String {
    values
        .iter()
        .map(|v| format!("{op} {}", quote(v)))
        .collect::<Vec<_>>()
        .join(sep)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}
