use crate::error::{QueueCheckError, Result};
use crate::policy::StatusPolicyTable;
use crate::teams::TeamDirectory;
use crate::waiting::DEFAULT_UNOWNED;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Backend login, posted as the `user` and `pass` form fields.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("pass", &"***")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// OwnerFilter
// ---------------------------------------------------------------------------

/// `owner:` accepts a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerFilter {
    One(String),
    Many(Vec<String>),
}

impl OwnerFilter {
    pub fn names(&self) -> Vec<String> {
        match self {
            OwnerFilter::One(name) => vec![name.clone()],
            OwnerFilter::Many(names) => names.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the backend's REST API, e.g. `https://rt.example.org/REST/1.0`.
    pub url: String,
    pub creds: Credentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerFilter>,
    #[serde(default)]
    pub queues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_states: Option<Vec<String>>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_unowned")]
    pub unowned_sentinel: String,
    #[serde(default)]
    pub states: BTreeMap<String, Option<Value>>,
    #[serde(default)]
    pub teams: BTreeMap<String, Vec<String>>,
}

fn default_batch_size() -> usize {
    5
}

fn default_unowned() -> String {
    DEFAULT_UNOWNED.to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QueueCheckError::ConfigNotFound(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn policies(&self) -> Result<StatusPolicyTable> {
        StatusPolicyTable::from_raw(&self.states)
    }

    pub fn team_directory(&self) -> Result<TeamDirectory> {
        TeamDirectory::new(self.teams.clone())
    }

    /// Owners named in the config; empty means every owner.
    pub fn owners(&self) -> Vec<String> {
        self.owner.as_ref().map(OwnerFilter::names).unwrap_or_default()
    }

    pub fn skip_states(&self) -> &[String] {
        self.skip_states.as_deref().unwrap_or(&[])
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.queues.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "no queues configured".to_string(),
            });
        }

        if self.skip_states().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no skip_states configured; every status will be searched".to_string(),
            });
        }

        if self.batch_size == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "batch_size is 0; tickets will be fetched one at a time".to_string(),
            });
        }

        for (team, members) in &self.teams {
            if members.is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("team '{team}' has no members"),
                });
            }
        }

        match self.policies() {
            Ok(table) => {
                for (status, policy) in table.iter() {
                    if let Some(p) = policy {
                        if p.fast_hours > p.slow_hours {
                            warnings.push(ConfigWarning {
                                level: WarnLevel::Warning,
                                message: format!(
                                    "status '{status}' has fast={} greater than slow={}",
                                    p.fast_hours, p.slow_hours
                                ),
                            });
                        }
                    }
                }
            }
            Err(e) => warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: e.to_string(),
            }),
        }

        if let Err(e) = self.team_directory() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: e.to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
