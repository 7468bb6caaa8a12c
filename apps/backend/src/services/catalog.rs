//! Question and prize catalog seeding.

use std::path::Path;

use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::repos::prizes::{self, PrizeCreate};
use crate::repos::questions::{self, QuestionCreate};

/// JSON catalog document: `{"questions": [...], "prizes": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub questions: Vec<QuestionCreate>,
    #[serde(default = "default_prizes")]
    pub prizes: Vec<PrizeCreate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub questions: usize,
    pub prizes: usize,
}

/// Prize table used when a catalog omits its own.
pub fn default_prizes() -> Vec<PrizeCreate> {
    [
        ("Cesta de Navidad", "cesta", 17, 1),
        ("Pack de Vino", "vino", 20, 2),
        ("Pack de Cava", "cava", 20, 3),
    ]
    .into_iter()
    .map(|(name, prize_type, units, priority)| PrizeCreate {
        name: name.to_string(),
        prize_type: prize_type.to_string(),
        units,
        priority,
    })
    .collect()
}

pub async fn load_from_path(path: &Path) -> Result<Catalog, AppError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::config(format!("cannot read catalog {}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::config(format!("invalid catalog {}: {e}", path.display())))
}

/// Insert the catalog unless questions or prizes already exist.
pub async fn seed(db: &DatabaseConnection, catalog: Catalog) -> Result<SeedReport, DomainError> {
    let txn = db.begin().await?;
    if questions::stats(&txn).await?.total > 0 || prizes::count(&txn).await? > 0 {
        txn.rollback().await?;
        info!("catalog already present; skipping seed");
        return Ok(SeedReport {
            questions: 0,
            prizes: 0,
        });
    }

    let report = SeedReport {
        questions: catalog.questions.len(),
        prizes: catalog.prizes.len(),
    };
    for question in catalog.questions {
        questions::insert_question(&txn, question).await?;
    }
    for prize in catalog.prizes {
        prizes::insert_prize(&txn, prize).await?;
    }
    txn.commit().await?;

    info!(
        questions = report.questions,
        prizes = report.prizes,
        "catalog seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnswerOption;

    #[test]
    fn catalog_without_prizes_uses_defaults() {
        let catalog: Catalog = serde_json::from_str(
            r#"{"questions":[{"text":"1+1?","option_a":"1","option_b":"2","option_c":"3","option_d":"4","correct_option":"B"}]}"#,
        )
        .unwrap();
        assert_eq!(catalog.questions.len(), 1);
        assert_eq!(catalog.questions[0].correct_option, AnswerOption::B);
        assert_eq!(catalog.prizes, default_prizes());
    }

    #[test]
    fn prize_type_is_read_from_type_field() {
        let catalog: Catalog = serde_json::from_str(
            r#"{"prizes":[{"name":"Jamón","type":"jamon","units":2,"priority":1}]}"#,
        )
        .unwrap();
        assert!(catalog.questions.is_empty());
        assert_eq!(catalog.prizes[0].prize_type, "jamon");
    }

    #[test]
    fn default_prizes_are_priority_ordered() {
        let priorities: Vec<i32> = default_prizes().iter().map(|p| p.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);
    }
}
