//! Closed enumerations stored by the portal.
//!
//! Each enum serializes as `snake_case` and also accepts the Indonesian labels
//! used by existing back-office forms.

use serde::{Deserialize, Serialize};

/// Direction of a cash-fund transaction.
///
/// Amounts are always stored non-negative; the sign is implied by the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "portal.transaction_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[serde(alias = "pemasukan", alias = "INCOME")]
    Income,
    #[serde(alias = "pengeluaran", alias = "EXPENSE")]
    Expense,
}

impl TransactionType {
    /// Stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "pemasukan" => Ok(Self::Income),
            "expense" | "pengeluaran" => Ok(Self::Expense),
            _ => Err(format!("invalid transaction type: {s}")),
        }
    }
}

/// Lifecycle of an activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "portal.activity_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    #[serde(alias = "direncanakan", alias = "rencana")]
    Planned,
    #[serde(alias = "berlangsung", alias = "in-progress")]
    InProgress,
    #[serde(alias = "selesai")]
    Done,
}

impl ActivityStatus {
    /// Stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Whether the activity still belongs on the agenda.
    #[must_use]
    pub const fn is_upcoming(self) -> bool {
        matches!(self, Self::Planned | Self::InProgress)
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planned" | "direncanakan" | "rencana" => Ok(Self::Planned),
            "in_progress" | "in-progress" | "berlangsung" => Ok(Self::InProgress),
            "done" | "selesai" => Ok(Self::Done),
            _ => Err(format!("invalid activity status: {s}")),
        }
    }
}

/// Resident sex as recorded on the family card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "portal.sex", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    #[serde(alias = "laki-laki", alias = "L")]
    Male,
    #[serde(alias = "perempuan", alias = "P")]
    Female,
}

impl Sex {
    /// Stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "l" | "laki-laki" => Ok(Self::Male),
            "female" | "p" | "perempuan" => Ok(Self::Female),
            _ => Err(format!("invalid sex: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_accepts_indonesian_labels() {
        let t: TransactionType = serde_json::from_str("\"pemasukan\"").unwrap();
        assert_eq!(t, TransactionType::Income);
        let t: TransactionType = serde_json::from_str("\"pengeluaran\"").unwrap();
        assert_eq!(t, TransactionType::Expense);
        assert_eq!(
            serde_json::to_string(&TransactionType::Expense).unwrap(),
            "\"expense\""
        );
    }

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("Income".parse(), Ok(TransactionType::Income));
        assert_eq!(" pengeluaran ".parse(), Ok(TransactionType::Expense));
        assert!("transfer".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_activity_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&ActivityStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let s: ActivityStatus = serde_json::from_str("\"selesai\"").unwrap();
        assert_eq!(s, ActivityStatus::Done);
        assert_eq!(ActivityStatus::default(), ActivityStatus::Planned);
    }

    #[test]
    fn test_activity_status_upcoming() {
        assert!(ActivityStatus::Planned.is_upcoming());
        assert!(ActivityStatus::InProgress.is_upcoming());
        assert!(!ActivityStatus::Done.is_upcoming());
    }

    #[test]
    fn test_sex_accepts_family_card_codes() {
        let s: Sex = serde_json::from_str("\"L\"").unwrap();
        assert_eq!(s, Sex::Male);
        let s: Sex = serde_json::from_str("\"perempuan\"").unwrap();
        assert_eq!(s, Sex::Female);
    }
}
