use crate::output::{print_json, print_report};
use crate::rt::RtClient;
use anyhow::Context;
use chrono::Local;
use queuecheck_core::batch::{BatchReport, Orchestrator};
use queuecheck_core::config::{Config, WarnLevel};
use queuecheck_core::query::build_query;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct CheckOptions<'a> {
    /// Overrides the config's `owner` list.
    pub who: Option<&'a str>,
    /// Overrides the config's `batch_size`.
    pub batch_size: Option<usize>,
    pub json: bool,
}

pub fn run(paramfile: &Path, opts: CheckOptions<'_>) -> anyhow::Result<()> {
    let started = Instant::now();
    info!(path = %paramfile.display(), who = ?opts.who, "loading config");
    let config = Config::load(paramfile)
        .with_context(|| format!("failed to load config from {}", paramfile.display()))?;

    for w in config.validate() {
        if w.level == WarnLevel::Warning {
            warn!("{}", w.message);
        }
    }
    let policies = config.policies().context("invalid states configuration")?;
    let teams = config.team_directory().context("invalid teams configuration")?;

    let owners = match opts.who {
        Some(who) => vec![who.to_string()],
        None => config.owners(),
    };
    let query = build_query(&owners, &config.queues, config.skip_states())
        .context("cannot build search query")?;
    info!(query = %query, "running search");

    let client = RtClient::new(&config.url, config.creds.clone())
        .context("failed to create RT client")?;
    let hits = client.search(&query).context("RT search failed")?;
    info!(tickets = hits.len(), "search finished");
    for hit in &hits {
        debug!(id = %hit.id, subject = %hit.subject, "matched ticket");
    }

    let batch_size = opts.batch_size.unwrap_or(config.batch_size).max(1);
    let orchestrator = Orchestrator::new(&policies, &teams, &config.unowned_sentinel);
    let mut all = BatchReport::default();

    for chunk in hits.chunks(batch_size) {
        let ids: Vec<String> = chunk.iter().map(|h| h.id.clone()).collect();
        let (tickets, histories) = client
            .fetch_batch(&ids)
            .with_context(|| format!("failed to fetch tickets {}", ids.join(", ")))?;
        let report = orchestrator.run(&tickets, &histories, Local::now().naive_local())?;
        if !opts.json {
            print_report(&report);
        }
        all.outcomes.extend(report.outcomes);
    }

    if opts.json {
        print_json(&all)?;
    } else {
        let attention = all
            .classifications()
            .filter(|c| c.health.needs_attention())
            .count();
        println!(
            "{} tickets checked, {} need attention, {} failed",
            all.len(),
            attention,
            all.failures().count()
        );
    }

    info!(elapsed_ms = started.elapsed().as_millis() as u64, "check finished");
    Ok(())
}
