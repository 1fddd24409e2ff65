use owo_colors::OwoColorize;
use queuecheck_core::batch::{BatchReport, Classification};
use queuecheck_core::deadline::format_age;
use queuecheck_core::types::HealthState;
use serde::Serialize;

const SUBJECT_WIDTH: usize = 25;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// `{id}: {subject}, {age}. Status: {status}` with the subject cut to 25
/// characters.
pub fn ticket_line(c: &Classification) -> String {
    let subject: String = c.subject.chars().take(SUBJECT_WIDTH).collect();
    format!(
        "{}: {}, {}. Status: {}",
        c.ticket_id,
        subject,
        format_age(c.age()),
        c.status
    )
}

/// One colored line per ticket.
pub fn render(c: &Classification) -> String {
    let ticket = ticket_line(c).bold().to_string();
    let Some(deadline) = c.deadline else {
        return format!("{} for: {}", c.health.label(), ticket);
    };

    let label = format!("{} {}:", c.health.label(), deadline);
    let label = match c.health {
        HealthState::OnTime => label.green().to_string(),
        HealthState::WaitingOnCustomerStalled => label.yellow().to_string(),
        HealthState::TicketExpired => label.bright_black().to_string(),
        HealthState::WaitingOnCustomer => label.blue().to_string(),
        HealthState::ShouldBeStalled => label.cyan().to_string(),
        HealthState::OverdueNeedsStaff => label.red().to_string(),
        HealthState::NoPolicy => label,
    };
    let needs = c.needs.as_deref().unwrap_or_default();
    let needs = if c.health == HealthState::OverdueNeedsStaff {
        needs.magenta().underline().to_string()
    } else {
        needs.white().to_string()
    };
    format!("{label} {ticket} {needs}")
}

pub fn print_report(report: &BatchReport) {
    for c in report.classifications() {
        println!("{}", render(c));
        for warning in &c.warnings {
            println!("    {} {}", "warning:".yellow(), warning);
        }
    }
    for failure in report.failures() {
        eprintln!("{} {}: {}", "failed:".red(), failure.ticket_id, failure.error);
    }
}
