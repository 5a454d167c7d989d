use crate::error::{GitliticsError, Result};
use crate::model::CommitInfo;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Canonical name mapped to the other spellings it should absorb.
pub type AliasTable = BTreeMap<String, Vec<String>>;

/// Which signature field identifies an author.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IdentityField {
    #[default]
    Name,
    Mail,
}

/// Maps commit signatures to the key their statistics are grouped under.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    field: IdentityField,
    lookup: HashMap<String, String>,
}

impl IdentityResolver {
    /// Builds the resolver, rejecting alias tables that would make resolution
    /// depend on entry order or chain one canonical key into another.
    pub fn new(field: IdentityField, aliases: &AliasTable) -> Result<Self> {
        let mut lookup: HashMap<String, String> = HashMap::new();

        for canonical in aliases.keys() {
            if canonical.is_empty() {
                return Err(GitliticsError::Config(
                    "author.duplicates: canonical key must not be empty".to_string(),
                ));
            }
            lookup.insert(canonical.clone(), canonical.clone());
        }

        for (canonical, spellings) in aliases {
            for alias in spellings {
                if alias.is_empty() {
                    return Err(GitliticsError::Config(format!(
                        "author.duplicates: empty alias listed for '{canonical}'"
                    )));
                }
                match lookup.get(alias) {
                    Some(existing) if existing == canonical => {}
                    Some(existing) => {
                        return Err(GitliticsError::Config(format!(
                            "author.duplicates: '{alias}' is claimed by both '{existing}' and '{canonical}'"
                        )));
                    }
                    None => {
                        lookup.insert(alias.clone(), canonical.clone());
                    }
                }
            }
        }

        Ok(Self { field, lookup })
    }

    pub fn resolve(&self, name: &str, email: &str) -> String {
        let candidate = match self.field {
            IdentityField::Name => name,
            IdentityField::Mail => email,
        };
        self.lookup
            .get(candidate)
            .cloned()
            .unwrap_or_else(|| candidate.to_string())
    }

    pub fn resolve_commit(&self, info: &CommitInfo) -> String {
        self.resolve(&info.author_name, &info.author_email)
    }
}
