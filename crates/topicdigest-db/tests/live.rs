//! Live integration tests for topicdigest-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database from the sqlx
//! test harness, so they need `DATABASE_URL` pointing at a server and are
//! ignored by default. Run with `cargo test -p topicdigest-db -- --ignored`.

use topicdigest_core::{
    ArticleRef, ClusterSnapshot, DigestDocument, DigestStore, SnapshotCluster, Summary,
};
use topicdigest_db::PgStore;

fn snapshot(links: &[&str]) -> ClusterSnapshot {
    ClusterSnapshot {
        clusters: vec![SnapshotCluster {
            common_words: vec!["Budget".to_string(), "Senate".to_string()],
            articles: links
                .iter()
                .map(|l| ArticleRef {
                    title: format!("Senate Budget {l}"),
                    link: format!("https://news.test/{l}"),
                })
                .collect(),
            miscellaneous: false,
        }],
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn snapshot_upsert_replaces_previous(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);

    assert!(store.load_snapshot("politics").await.unwrap().is_none());

    store.save_snapshot("politics", &snapshot(&["1", "2"])).await.unwrap();
    store.save_snapshot("politics", &snapshot(&["3"])).await.unwrap();

    let loaded = store.load_snapshot("politics").await.unwrap().unwrap();
    assert_eq!(loaded, snapshot(&["3"]));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn summaries_round_trip_newest_first(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);

    let mut older = Summary::new(
        "politics",
        DigestDocument::placeholder(),
        snapshot(&["1"]),
        vec!["first".to_string()],
        4,
    );
    older.created_at -= chrono::Duration::hours(1);
    let newer = Summary::new(
        "politics",
        DigestDocument::default(),
        snapshot(&["1", "2"]),
        vec!["second".to_string()],
        6,
    );
    store.append_summary(&older).await.unwrap();
    store.append_summary(&newer).await.unwrap();

    let latest = store.latest_summary("politics").await.unwrap().unwrap();
    assert_eq!(latest.id, newer.id);
    assert_eq!(latest.clusters, newer.clusters);
    assert_eq!(latest.number_of_articles, 6);

    let listed = store.list_summaries("politics", 10).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].id, older.id);
    assert_eq!(listed[1].final_summary, DigestDocument::placeholder());

    assert!(store.list_summaries("other", 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn ping_succeeds_on_live_pool(pool: sqlx::PgPool) {
    topicdigest_db::ping(&pool).await.unwrap();
}
