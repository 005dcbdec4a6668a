use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jokes_gateway::models::{NewJoke, WriteRequest};
use jokes_gateway::store::{JokeStore, PgJokeStore};

fn test_db_url() -> Option<String> {
    std::env::var("JOKES_TEST_DB_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn schema_db_url(base: &str, schema: &str) -> String {
    let separator = if base.contains('?') { "&" } else { "?" };
    format!("{base}{separator}options=-csearch_path%3D{schema}")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn postgres_store_inserts_and_fetches() {
    let Some(db_url) = test_db_url() else {
        eprintln!("skipping postgres store test; set JOKES_TEST_DB_URL to enable");
        return;
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    let schema = format!("jokes_test_{}_{}", std::process::id(), nanos);

    let admin = sqlx::PgPool::connect(&db_url)
        .await
        .expect("DB connect should succeed");
    sqlx::query(&format!("CREATE SCHEMA {schema}"))
        .execute(&admin)
        .await
        .expect("create schema should succeed");

    let store = PgJokeStore::connect(&schema_db_url(&db_url, &schema), Duration::from_secs(5))
        .await
        .expect("store connect should succeed");
    store.migrate().await.expect("migration should apply");
    store.migrate().await.expect("migration should be idempotent");

    assert!(
        store.random().await.expect("random on empty table").is_none(),
        "fresh table should have no jokes"
    );

    let new_joke = NewJoke::parse(WriteRequest {
        author: "Jane".into(),
        joke_text: "Valid text".into(),
    })
    .expect("valid joke");
    let created = store.insert(new_joke).await.expect("insert should succeed");
    assert!(created.id > 0);
    assert_eq!(created.author, "Jane");
    assert_eq!(created.joke_text, "Valid text");

    let fetched = store
        .random()
        .await
        .expect("random should succeed")
        .expect("table has one joke");
    assert_eq!(fetched, created);

    store.close().await;
    sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
        .execute(&admin)
        .await
        .expect("drop schema should succeed");
    admin.close().await;
}
