//! Load demo data from a YAML file.
//!
//! The file has up to four lists, each entry shaped like the matching API
//! request body:
//!
//! ```yaml
//! residents:
//!   - fullName: Siti Aminah
//!     sex: P
//!     hamlet: Sukamaju
//!     rw: "02"
//!     rt: "05"
//! transactions:
//!   - type: pemasukan
//!     amount: 250000
//!     description: Iuran warga
//!     date: "2026-10-01"
//!     category: iuran
//! activities:
//!   - title: Kerja bakti
//!     date: "2026-10-26"
//! roster:
//!   - fullName: Budi Santoso
//!     role: Ketua RT
//!     displayOrder: 1
//! ```
//!
//! Every entry is validated before anything is written.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use village_portal_api::db::{self, PgStore, RepositoryError, Store};
use village_portal_core::{
    ActivityDraft, ActivityFields, ResidentDraft, ResidentFields, RosterDraft, RosterFields,
    TransactionDraft, TransactionFields,
};

use super::{MissingEnvVar, database_url};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVar),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{} validation errors found", .0.len())]
    Invalid(Vec<String>),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedFile {
    pub residents: Vec<ResidentDraft>,
    pub transactions: Vec<TransactionDraft>,
    pub activities: Vec<ActivityDraft>,
    pub roster: Vec<RosterDraft>,
}

/// A seed file that passed validation.
#[derive(Debug, Default)]
pub struct SeedPlan {
    residents: Vec<ResidentFields>,
    transactions: Vec<TransactionFields>,
    activities: Vec<ActivityFields>,
    roster: Vec<RosterFields>,
}

/// Rows written per section.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub residents: usize,
    pub transactions: usize,
    pub activities: usize,
    pub roster: usize,
}

fn validate_all<D, F, E: std::fmt::Display>(
    section: &str,
    drafts: Vec<D>,
    validate: impl Fn(D) -> Result<F, E>,
    errors: &mut Vec<String>,
) -> Vec<F> {
    drafts
        .into_iter()
        .enumerate()
        .filter_map(|(index, draft)| match validate(draft) {
            Ok(fields) => Some(fields),
            Err(e) => {
                errors.push(format!("{section}[{index}]: {e}"));
                None
            }
        })
        .collect()
}

impl SeedFile {
    /// Validate every entry, collecting all errors rather than stopping at
    /// the first.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Invalid`] listing each bad entry by section and
    /// position.
    pub fn validate(self) -> Result<SeedPlan, SeedError> {
        let mut errors = Vec::new();
        let plan = SeedPlan {
            residents: validate_all("residents", self.residents, ResidentDraft::validate, &mut errors),
            transactions: validate_all(
                "transactions",
                self.transactions,
                TransactionDraft::validate,
                &mut errors,
            ),
            activities: validate_all("activities", self.activities, ActivityDraft::validate, &mut errors),
            roster: validate_all("roster", self.roster, RosterDraft::validate, &mut errors),
        };

        if errors.is_empty() {
            Ok(plan)
        } else {
            Err(SeedError::Invalid(errors))
        }
    }
}

impl SeedPlan {
    /// Write every entry through the store.
    ///
    /// # Errors
    ///
    /// Stops at the first store failure; earlier rows stay written.
    pub async fn apply(&self, store: &dyn Store) -> Result<SeedReport, SeedError> {
        for fields in &self.residents {
            store.create_resident(fields).await?;
        }
        for fields in &self.transactions {
            store.create_transaction(fields).await?;
        }
        for fields in &self.activities {
            store.create_activity(fields).await?;
        }
        for fields in &self.roster {
            store.create_roster_member(fields).await?;
        }

        Ok(SeedReport {
            residents: self.residents.len(),
            transactions: self.transactions.len(),
            activities: self.activities.len(),
            roster: self.roster.len(),
        })
    }
}

/// Parse and validate seed YAML.
///
/// # Errors
///
/// Returns an error for malformed YAML or invalid entries.
pub fn parse(content: &str) -> Result<SeedPlan, SeedError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    file.validate()
}

/// Seed the database from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, or a database
/// operation fails.
pub async fn from_file(path: &Path) -> Result<SeedReport, SeedError> {
    tracing::info!(path = %path.display(), "Loading seed data from file");
    let content = tokio::fs::read_to_string(path).await?;

    let plan = match parse(&content) {
        Ok(plan) => plan,
        Err(SeedError::Invalid(errors)) => {
            tracing::error!("Seed validation failed:");
            for err in &errors {
                tracing::error!("  - {err}");
            }
            return Err(SeedError::Invalid(errors));
        }
        Err(e) => return Err(e),
    };
    tracing::info!("Seed file validated successfully");

    let url = database_url()?;
    let store = PgStore::new(db::create_pool(&url).await?);
    tracing::info!("Connected to database");

    let report = plan.apply(&store).await?;

    tracing::info!("Seeding complete!");
    tracing::info!("  Residents: {}", report.residents);
    tracing::info!("  Transactions: {}", report.transactions);
    tracing::info!("  Activities: {}", report.activities);
    tracing::info!("  Roster members: {}", report.roster);

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use village_portal_api::db::{MemoryStore, RosterQuery};
    use village_portal_core::TransactionFilter;

    use super::*;

    const DEMO: &str = r#"
residents:
  - fullName: Siti Aminah
    sex: P
    hamlet: Sukamaju
    rt: "05"
    rw: "02"
    category: tetap
  - fullName: Budi Santoso
    sex: L
    hamlet: Sukamaju
    rt: "05"
    rw: "02"
transactions:
  - type: pemasukan
    amount: 250000
    description: Iuran warga
    date: "2026-10-01"
    category: iuran
  - type: pengeluaran
    amount: "75000.50"
    description: Konsumsi rapat
    date: "2026-10-05"
    category: konsumsi
activities:
  - title: Kerja bakti
    date: "2026-10-26"
    status: direncanakan
roster:
  - fullName: Budi Santoso
    role: Ketua RT
    displayOrder: 1
    active: true
"#;

    #[test]
    fn test_module_doc_example_is_valid() {
        let doc = include_str!("seed.rs")
            .lines()
            .skip_while(|line| *line != "//! ```yaml")
            .skip(1)
            .take_while(|line| *line != "//! ```")
            .map(|line| line.strip_prefix("//! ").unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n");

        let plan = parse(&doc).unwrap();
        assert_eq!(plan.residents.len(), 1);
        assert_eq!(plan.transactions.len(), 1);
        assert_eq!(plan.activities.len(), 1);
        assert_eq!(plan.roster.len(), 1);
    }

    #[test]
    fn test_empty_file_is_empty_plan() {
        let plan = parse("{}").unwrap();
        assert!(plan.residents.is_empty());
        assert!(plan.roster.is_empty());
    }

    #[test]
    fn test_collects_every_invalid_entry() {
        let yaml = r#"
residents:
  - sex: L
transactions:
  - type: pemasukan
    description: Tanpa jumlah
    date: "2026-10-01"
  - type: hibah
    amount: 10
    description: Jenis salah
    date: "2026-10-01"
"#;
        let Err(SeedError::Invalid(errors)) = parse(yaml) else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors[0].starts_with("residents[0]: "));
        assert!(errors[1].starts_with("transactions[0]: "));
        assert!(errors[2].starts_with("transactions[1]: "));
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        assert!(matches!(parse("warga: []"), Err(SeedError::Yaml(_))));
    }

    #[tokio::test]
    async fn test_apply_writes_through_store() {
        let store = MemoryStore::new();
        let report = parse(DEMO).unwrap().apply(&store).await.unwrap();

        assert_eq!(
            report,
            SeedReport {
                residents: 2,
                transactions: 2,
                activities: 1,
                roster: 1,
            }
        );
        assert_eq!(store.list_residents().await.unwrap().len(), 2);
        assert_eq!(
            store
                .list_transactions(&TransactionFilter::default())
                .await
                .unwrap()
                .len(),
            2
        );
        assert_eq!(store.list_activities(None).await.unwrap().len(), 1);
        assert_eq!(
            store.list_roster(RosterQuery::default()).await.unwrap()[0].role,
            "Ketua RT"
        );
    }

    #[tokio::test]
    async fn test_from_file_rejects_invalid_before_connecting() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"activities:\n  - title: Tanpa tanggal\n").unwrap();

        let result = from_file(file.path()).await;
        assert!(matches!(result, Err(SeedError::Invalid(ref e)) if e.len() == 1));
    }
}
