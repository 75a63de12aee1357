use std::time::Duration;

use snip_storage::{MySqlRepository, ReadRepository, Repository, StorageError};
use snip_test_infra::{MySqlConfig, MySqlServer};
use sqlx::mysql::MySqlPoolOptions;

struct Fixture {
    _mysql: MySqlServer,
    repo: MySqlRepository,
}

impl Fixture {
    async fn start() -> Self {
        let mysql = MySqlServer::new(MySqlConfig::builder().build())
            .await
            .expect("start mysql");
        let url = mysql.database_url().await.expect("mysql url");
        let pool = connect_with_retry(&url).await;

        let repo = MySqlRepository::new(pool);
        repo.migrate().await.expect("create schema");

        Self {
            _mysql: mysql,
            repo,
        }
    }
}

async fn connect_with_retry(url: &str) -> sqlx::MySqlPool {
    let mut last_error = None;

    for _ in 0..20 {
        match MySqlPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
        {
            Ok(pool) => return pool,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect mysql: {last_error:?}");
}

#[tokio::test]
#[ignore = "requires docker"]
async fn save_assigns_ids_and_reads_back() {
    let fixture = Fixture::start().await;

    let first = fixture.repo.save("https://example.org/page").await.unwrap();
    let second = fixture.repo.save("https://example.org/other").await.unwrap();

    assert_eq!(first.id, 1);
    assert!(second.id > first.id);

    let by_id = fixture.repo.find_by_id(first.id).await.unwrap().unwrap();
    assert_eq!(by_id, first);

    let by_url = fixture
        .repo
        .find_by_original_url("https://example.org/other")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_url, second);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn save_conflicts_on_duplicate_url() {
    let fixture = Fixture::start().await;

    fixture.repo.save("https://dup.example").await.unwrap();
    let err = fixture.repo.save("https://dup.example").await.unwrap_err();

    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn url_lookup_is_exact() {
    let fixture = Fixture::start().await;

    fixture.repo.save("https://Case.example/Path").await.unwrap();

    assert!(fixture
        .repo
        .find_by_original_url("https://Case.example/path")
        .await
        .unwrap()
        .is_none());
    assert!(fixture.repo.find_by_id(999).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn long_urls_are_supported() {
    let fixture = Fixture::start().await;
    let long = format!("https://example.org/{}", "a".repeat(4_000));

    let saved = fixture.repo.save(&long).await.unwrap();
    let found = fixture
        .repo
        .find_by_original_url(&long)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.id, saved.id);
    assert_eq!(found.original_url.len(), long.len());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn migrate_is_idempotent() {
    let fixture = Fixture::start().await;

    fixture.repo.migrate().await.unwrap();
    fixture.repo.save("https://example.org").await.unwrap();
}
