use insight::store;
use sqlx::sqlite::SqlitePoolOptions;

async fn setup_test_db() -> sqlx::SqlitePool {
    let pool = SqlitePoolOptions::new()
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test pool");

    store::ensure_schema(&pool).await.expect("ensure schema");
    pool
}

async fn seed(pool: &sqlx::SqlitePool) -> (i64, i64, i64) {
    let a = store::insert_article(
        pool,
        "A",
        "Summary A",
        "https://example.com/a",
        "2024-01-01T08:00:00Z",
    )
    .await
    .expect("insert A");
    let b = store::insert_article(
        pool,
        "B",
        "Summary B",
        "https://example.com/b",
        "2024-01-02T08:00:00Z",
    )
    .await
    .expect("insert B");
    let c = store::insert_article(
        pool,
        "C",
        "Summary C",
        "https://example.com/c",
        "2023-12-24T08:00:00Z",
    )
    .await
    .expect("insert C");
    (a, b, c)
}

#[tokio::test]
async fn test_list_is_newest_first_with_default_flags() {
    let pool = setup_test_db().await;
    seed(&pool).await;

    let articles = store::list_articles(&pool).await.expect("list");

    let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["B", "A", "C"]);

    // Flags default to false when never touched
    assert!(articles.iter().all(|a| !a.is_favorite && !a.is_hidden));
}

#[tokio::test]
async fn test_toggle_favorite_flips_exactly_one_article() {
    let pool = setup_test_db().await;
    let (a, _b, _c) = seed(&pool).await;

    store::set_favorite(&pool, a, true).await.expect("favorite");

    let articles = store::list_articles(&pool).await.expect("list");
    for article in &articles {
        if article.id == a {
            assert!(article.is_favorite);
        } else {
            assert!(!article.is_favorite, "{} must be untouched", article.title);
        }
        assert!(!article.is_hidden, "hide flag must be untouched");
    }

    // Last write wins, including toggling back off
    store::set_favorite(&pool, a, false).await.expect("unfavorite");
    let article = store::get_article(&pool, a).await.expect("get").unwrap();
    assert!(!article.is_favorite);
}

#[tokio::test]
async fn test_hidden_articles_stay_in_the_store() {
    let pool = setup_test_db().await;
    let (_a, b, _c) = seed(&pool).await;

    store::set_hidden(&pool, b, true).await.expect("hide");

    // The adapter always returns the full unfiltered set; visibility
    // filtering happens in the renderer.
    let articles = store::list_articles(&pool).await.expect("list");
    assert_eq!(articles.len(), 3);
    let hidden = articles.iter().find(|a| a.id == b).expect("B present");
    assert!(hidden.is_hidden);
}

#[tokio::test]
async fn test_get_article_by_id() {
    let pool = setup_test_db().await;
    let (a, _b, _c) = seed(&pool).await;

    let found = store::get_article(&pool, a).await.expect("get");
    assert_eq!(found.map(|a| a.title), Some("A".to_string()));

    let missing = store::get_article(&pool, 9999).await.expect("get missing");
    assert!(missing.is_none());
}
