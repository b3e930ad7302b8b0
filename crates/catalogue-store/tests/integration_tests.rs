//! Integration tests for catalogue-store
//!
//! These tests verify the insert/lookup cycle and the natural key contract
//! against a real SQLite database.

use catalogue_domain::traits::{ModelStore, StoreFailure};
use catalogue_domain::{CanonicalRecord, ModelId};
use catalogue_store::{SqliteStore, StoreError};
use chrono::NaiveDate;
use serde_json::{json, Map};

fn gpt4() -> CanonicalRecord {
    let mut metadata = Map::new();
    metadata.insert("context_window".to_string(), json!(8192));
    metadata.insert("modalities".to_string(), json!(["text", "image"]));

    CanonicalRecord {
        name: "gpt-4".to_string(),
        display_name: "GPT-4".to_string(),
        organization: Some("OpenAI".to_string()),
        release_date: NaiveDate::from_ymd_opt(2023, 3, 14),
        description: Some("A large multimodal model.".to_string()),
        license: None,
        metadata: Some(metadata),
    }
}

fn named(name: &str) -> CanonicalRecord {
    CanonicalRecord {
        name: name.to_string(),
        display_name: name.to_string(),
        organization: None,
        release_date: None,
        description: None,
        license: None,
        metadata: None,
    }
}

#[tokio::test]
async fn test_store_initialization() {
    let store = SqliteStore::in_memory();
    assert!(store.is_ok(), "Store should initialize successfully");
    assert_eq!(store.unwrap().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_insert_and_find_by_name() {
    let store = SqliteStore::in_memory().unwrap();

    let inserted = store.insert(gpt4()).await.unwrap();
    assert_eq!(inserted.name, "gpt-4");

    let found = store.find_by_name("gpt-4").await.unwrap();
    assert!(found.is_some(), "Should retrieve the entry");

    let found = found.unwrap();
    assert_eq!(found.id, inserted.id);
    assert_eq!(found.display_name, "GPT-4");
    assert_eq!(found.organization.as_deref(), Some("OpenAI"));
    assert_eq!(found.release_date, NaiveDate::from_ymd_opt(2023, 3, 14));
    assert_eq!(found.description, inserted.description);
    assert!(found.license.is_none());
    assert_eq!(found.metadata, inserted.metadata);
    assert_eq!(
        found.created_at.timestamp_millis(),
        inserted.created_at.timestamp_millis()
    );
}

#[tokio::test]
async fn test_find_missing_name() {
    let store = SqliteStore::in_memory().unwrap();
    store.insert(gpt4()).await.unwrap();

    assert!(store.find_by_name("gpt-5").await.unwrap().is_none());
    assert!(store.find_by_name("GPT-4").await.unwrap().is_none(), "Lookup is by exact key");
}

#[tokio::test]
async fn test_get_by_id() {
    let store = SqliteStore::in_memory().unwrap();
    let inserted = store.insert(gpt4()).await.unwrap();

    let fetched = store.get(inserted.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "gpt-4");
    assert!(store.get(ModelId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_name_is_conflict() {
    let store = SqliteStore::in_memory().unwrap();
    store.insert(gpt4()).await.unwrap();

    let err = store.insert(named("gpt-4")).await.unwrap_err();
    assert!(err.is_conflict(), "Should reject duplicate key, got {:?}", err);
    assert!(matches!(err, StoreError::Conflict { ref name } if name == "gpt-4"));
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_null_fields_stay_null() {
    let store = SqliteStore::in_memory().unwrap();
    store.insert(named("llama-2")).await.unwrap();

    let found = store.find_by_name("llama-2").await.unwrap().unwrap();
    assert!(found.organization.is_none());
    assert!(found.release_date.is_none());
    assert!(found.description.is_none());
    assert!(found.license.is_none());
    assert!(found.metadata.is_none());
}

#[tokio::test]
async fn test_list_with_offset_and_limit() {
    let store = SqliteStore::in_memory().unwrap();
    for i in 0..5 {
        store.insert(named(&format!("model-{}", i))).await.unwrap();
    }

    let all = store.list(0, 10).await.unwrap();
    let names: Vec<_> = all.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["model-0", "model-1", "model-2", "model-3", "model-4"]);

    let page = store.list(2, 2).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].name, "model-2");
    assert_eq!(page[1].name, "model-3");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_inserts_single_winner() {
    let store = SqliteStore::in_memory().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.insert(named("mistral-7b")).await })
        })
        .collect();

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) if e.is_conflict() => conflicts += 1,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_persistence_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalogue.db");

    let id = {
        let store = SqliteStore::new(&path).unwrap();
        store.insert(gpt4()).await.unwrap().id
    };

    let reopened = SqliteStore::new(&path).unwrap();
    let found = reopened.find_by_name("gpt-4").await.unwrap().unwrap();
    assert_eq!(found.id, id);

    let err = reopened.insert(named("gpt-4")).await.unwrap_err();
    assert!(err.is_conflict());
}
