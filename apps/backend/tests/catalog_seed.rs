mod common;

use std::io::Write;

use common::{catalog, questions};
use quiz_backend::repos::{prizes, questions as question_repo};
use quiz_backend::services::catalog::{self, Catalog};
use quiz_backend::{build_state, DbKind, DbSettings};

#[tokio::test]
async fn catalog_file_without_prizes_uses_the_default_table() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"questions": [{{"text": "2 + 2?", "option_a": "3", "option_b": "4",
            "option_c": "5", "option_d": "22", "correct_option": "B"}}]}}"#
    )
    .unwrap();

    let loaded = catalog::load_from_path(file.path()).await.unwrap();
    assert_eq!(loaded.questions.len(), 1);
    assert_eq!(loaded.prizes.len(), 3);
    assert_eq!(loaded.prizes[0].name, "Cesta de Navidad");
}

#[tokio::test]
async fn unreadable_or_invalid_catalog_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let err = catalog::load_from_path(&missing).await.unwrap_err();
    assert!(err.to_string().contains("cannot read catalog"), "got {err}");

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"questions": [{"text": "no options"}]}"#).unwrap();
    let err = catalog::load_from_path(&bad).await.unwrap_err();
    assert!(err.to_string().contains("invalid catalog"), "got {err}");
}

#[tokio::test]
async fn seeding_a_file_database_happens_once() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("quiz.db").display());
    let settings = DbSettings::new(url, 2).unwrap();
    assert_eq!(settings.kind, DbKind::SqliteFile);

    let state = build_state()
        .with_db(settings.clone())
        .with_catalog(catalog(3, &[("Cesta", 1, 1)]))
        .build()
        .await
        .unwrap();
    assert_eq!(question_repo::stats(state.db()).await.unwrap().total, 3);
    drop(state);

    // Second boot against the same file: rows already present, nothing added.
    let state = build_state()
        .with_db(settings)
        .with_catalog(Catalog {
            questions: questions(5),
            prizes: Vec::new(),
        })
        .build()
        .await
        .unwrap();
    assert_eq!(question_repo::stats(state.db()).await.unwrap().total, 3);
    assert_eq!(prizes::count(state.db()).await.unwrap(), 1);

    let report = catalog::seed(state.db(), catalog(1, &[])).await.unwrap();
    assert_eq!((report.questions, report.prizes), (0, 0));
}
