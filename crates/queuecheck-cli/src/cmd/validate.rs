use crate::output::print_json;
use anyhow::Context;
use queuecheck_core::config::{Config, WarnLevel};
use std::path::Path;

pub fn run(paramfile: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(paramfile)
        .with_context(|| format!("failed to load config from {}", paramfile.display()))?;
    let warnings = config.validate();

    if json {
        print_json(&warnings)?;
    } else if warnings.is_empty() {
        println!("config OK: {}", paramfile.display());
    } else {
        for w in &warnings {
            let tag = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("{tag}: {}", w.message);
        }
    }

    let errors = warnings
        .iter()
        .filter(|w| w.level == WarnLevel::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config has {errors} error(s)");
    }
    Ok(())
}
