//! Integration tests for `SqliteStore` and `ArticleService` against an
//! in-memory database.

use std::sync::Arc;

use blogshelf_core::{
  Error as CoreError,
  article::ArticleInput,
  identity::{Actor, UserProfile},
  service::ArticleService,
  store::{ArticleFilter, ArticleQuery, ArticleStore},
};
use serde_json::{Value, json};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn service() -> ArticleService<SqliteStore> {
  ArticleService::new(Arc::new(store().await))
}

fn editor() -> Actor {
  Actor {
    id:      Some("user_01".into()),
    profile: Some(UserProfile {
      id:         "user_01".into(),
      email:      Some("editor@example.com".into()),
      first_name: Some("Ed".into()),
      last_name:  Some("Itor".into()),
    }),
  }
}

fn input(value: Value) -> ArticleInput { serde_json::from_value(value).unwrap() }

fn content() -> Value {
  json!({ "time": 1, "blocks": [{ "type": "paragraph", "data": { "text": "Hi" } }] })
}

/// Write a row the way an older client would have, bypassing the encoders.
async fn insert_legacy(s: &SqliteStore, id: &'static str, tags: Option<&'static str>, body: &'static str) {
  s.conn
    .call(move |conn| {
      conn.execute(
        "INSERT INTO blog_article (id, title, url_slug, draft, body, tags, body_images,
                                   created_at, updated_at)
         VALUES (?1, 'Legacy', 'legacy', 0, ?2, ?3, NULL,
                 '2023-01-01 00:00:00', '2023-01-01 00:00:00')",
        rusqlite::params![id, body, tags],
      )?;
      Ok(())
    })
    .await
    .unwrap();
}

// ─── Create / get ────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_roundtrip() {
  let svc = service().await;

  let created = svc
    .create(
      input(json!({
        "title": "Tea & Rust",
        "subtitle": "Brewing",
        "body": content(),
        "tags": ["rust", "tea"],
        "body_images": ["/uploads/a.png"],
        "thumbnail_image": "/static/t.png",
        "metadata": { "series": "1", "dropped": "" },
        "seo_keywords": "rust,tea",
      })),
      &editor(),
    )
    .await
    .unwrap();

  let fetched = svc.get(&created.id).await.unwrap();
  assert_eq!(fetched, created);

  assert_eq!(fetched.title, "Tea & Rust");
  assert_eq!(fetched.subtitle, "Brewing");
  assert_eq!(fetched.body, Some(content()));
  assert_eq!(fetched.tags, ["rust", "tea"]);
  assert_eq!(fetched.body_images, ["/uploads/a.png"]);
  assert_eq!(fetched.thumbnail_image.as_deref(), Some("/static/t.png"));
  assert_eq!(fetched.metadata, Some(json!({ "series": "1" })));
  assert_eq!(fetched.seo_keywords, "rust,tea");

  // Defaults for omitted fields.
  assert_eq!(fetched.author, "editor@example.com");
  assert!(fetched.url_slug.starts_with("tea-rust-"), "{}", fetched.url_slug);
  assert_eq!(fetched.seo_title, "Tea & Rust");
  assert_eq!(fetched.seo_description, "Brewing");
  assert!(!fetched.draft);
}

#[tokio::test]
async fn get_accepts_bare_id() {
  let svc = service().await;
  let created = svc
    .create(input(json!({ "id": "custom", "title": "T" })), &editor())
    .await
    .unwrap();
  assert_eq!(created.id, "blog_article_custom");

  let fetched = svc.get("custom").await.unwrap();
  assert_eq!(fetched.id, "blog_article_custom");
}

#[tokio::test]
async fn get_missing_is_not_found() {
  let svc = service().await;
  assert!(matches!(svc.get("nope").await, Err(CoreError::NotFound(id)) if id == "blog_article_nope"));
}

#[tokio::test]
async fn create_without_identity_uses_admin() {
  let svc = service().await;
  let created = svc.create(input(json!({})), &Actor::default()).await.unwrap();
  assert_eq!(created.author, "Admin");
  assert!(created.url_slug.starts_with("article-"));
  assert_eq!(created.title, "");
}

#[tokio::test]
async fn rapid_creates_get_distinct_ids() {
  let svc = service().await;
  let mut ids = Vec::new();
  for _ in 0..5 {
    ids.push(svc.create(input(json!({ "title": "Same" })), &editor()).await.unwrap().id);
  }
  ids.sort();
  ids.dedup();
  assert_eq!(ids.len(), 5);
}

// ─── List ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_newest_first_with_count() {
  let svc = service().await;
  for title in ["First", "Second", "Third"] {
    svc.create(input(json!({ "title": title })), &editor()).await.unwrap();
  }

  let (page, count) = svc.list(ArticleFilter::default(), 0, 2).await.unwrap();
  assert_eq!(count, 3);
  let titles: Vec<_> = page.iter().map(|a| a.title.as_str()).collect();
  assert_eq!(titles, ["Third", "Second"]);

  let (page, count) = svc.list(ArticleFilter::default(), 2, 2).await.unwrap();
  assert_eq!(count, 3);
  assert_eq!(page.len(), 1);
  assert_eq!(page[0].title, "First");
}

#[tokio::test]
async fn list_filter_applies_to_count() {
  let svc = service().await;
  for title in ["Rust in Production", "Learning rust", "Gardening"] {
    svc.create(input(json!({ "title": title })), &editor()).await.unwrap();
  }

  let (page, count) = svc
    .list(ArticleFilter::title_contains("RUST"), 0, 1)
    .await
    .unwrap();
  assert_eq!(count, 2);
  assert_eq!(page.len(), 1);
}

#[tokio::test]
async fn list_filter_folds_non_ascii_case() {
  let svc = service().await;
  for title in ["CAFÉ Notes", "Café au lait", "Tea"] {
    svc.create(input(json!({ "title": title })), &editor()).await.unwrap();
  }

  for needle in ["café", "CAFÉ", "Café"] {
    let (page, count) = svc
      .list(ArticleFilter::title_contains(needle), 0, 10)
      .await
      .unwrap();
    assert_eq!(count, 2, "needle {needle:?}");
    assert_eq!(page.len(), 2, "needle {needle:?}");
  }

  let (_, count) = svc.list(ArticleFilter::title_contains("ÉS"), 0, 10).await.unwrap();
  assert_eq!(count, 1);
}

#[tokio::test]
async fn list_filter_matches_wildcards_literally() {
  let svc = service().await;
  svc.create(input(json!({ "title": "100% Rust" })), &editor()).await.unwrap();
  svc.create(input(json!({ "title": "1000 Rust tips" })), &editor()).await.unwrap();

  let (_, count) = svc.list(ArticleFilter::title_contains("0%"), 0, 10).await.unwrap();
  assert_eq!(count, 1);
}

#[tokio::test]
async fn list_equality_filter() {
  let svc = service().await;
  svc.create(input(json!({ "title": "Draft", "draft": true })), &editor()).await.unwrap();
  svc.create(input(json!({ "title": "Live" })), &editor()).await.unwrap();

  let filter = ArticleFilter::from_json(&json!({ "draft": true })).unwrap();
  let (page, count) = svc.list(filter, 0, 10).await.unwrap();
  assert_eq!(count, 1);
  assert_eq!(page[0].title, "Draft");
}

// ─── Legacy encodings ────────────────────────────────────────────────────────

#[tokio::test]
async fn legacy_rows_are_normalized() {
  let s = store().await;
  insert_legacy(&s, "blog_article_pg", Some("{news,\"big news\"}"), "not json").await;
  insert_legacy(&s, "blog_article_null", None, "").await;
  insert_legacy(&s, "blog_article_bad", Some("[broken"), "{\"blocks\":[]}").await;

  let pg = s.get("blog_article_pg").await.unwrap().unwrap();
  assert_eq!(pg.tags, ["news", "big news"]);
  assert!(pg.body_images.is_empty());
  assert_eq!(pg.body, Some(json!("not json")));

  let null = s.get("blog_article_null").await.unwrap().unwrap();
  assert!(null.tags.is_empty());
  assert_eq!(null.body, None);

  let bad = s.get("blog_article_bad").await.unwrap().unwrap();
  assert!(bad.tags.is_empty());
  assert_eq!(bad.body, Some(json!({ "blocks": [] })));

  let (page, count) = s
    .list(&ArticleQuery { take: 10, ..Default::default() })
    .await
    .unwrap();
  assert_eq!(count, 3);
  assert_eq!(page.len(), 3);
}

#[tokio::test]
async fn legacy_timestamps_do_not_break_listing() {
  let svc = service().await;
  svc.create(input(json!({ "title": "Fresh" })), &editor()).await.unwrap();
  svc
    .store()
    .conn
    .call(|conn| {
      conn.execute_batch(
        "INSERT INTO blog_article (id, title, url_slug, draft, created_at, updated_at)
         VALUES ('blog_article_pg', 'Imported', 'imported', 0,
                 '2023-01-01 00:00:00.123456+00', '2023-01-02 08:00:00+02'),
                ('blog_article_odd', 'Odd', 'odd', 0, 'last tuesday', 'last tuesday');",
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let (page, count) = svc.list(ArticleFilter::default(), 0, 10).await.unwrap();
  assert_eq!(count, 3);
  assert_eq!(page.len(), 3);

  let imported = page.iter().find(|a| a.id == "blog_article_pg").unwrap();
  assert_eq!(imported.created_at.to_rfc3339(), "2023-01-01T00:00:00.123456+00:00");
  assert_eq!(imported.updated_at.to_rfc3339(), "2023-01-02T06:00:00+00:00");

  let odd = page.iter().find(|a| a.id == "blog_article_odd").unwrap();
  assert_eq!(odd.created_at.timestamp(), 0);

  let (_, published) = svc.list_published(0, 10).await.unwrap();
  assert_eq!(published, 3);
}

// ─── Update: field mode ──────────────────────────────────────────────────────

#[tokio::test]
async fn update_omitted_fields_survive() {
  let svc = service().await;
  let created = svc
    .create(
      input(json!({
        "title": "Original",
        "subtitle": "Sub",
        "thumbnail_image": "/static/keep.png",
        "tags": ["a"],
      })),
      &editor(),
    )
    .await
    .unwrap();

  let updated = svc
    .update(&created.id, input(json!({ "title": "Renamed" })), &editor())
    .await
    .unwrap();

  assert_eq!(updated.title, "Renamed");
  assert_eq!(updated.subtitle, "Sub");
  assert_eq!(updated.thumbnail_image.as_deref(), Some("/static/keep.png"));
  assert_eq!(updated.tags, ["a"]);
  assert_eq!(updated.url_slug, created.url_slug);
  assert_eq!(updated.seo_title, created.seo_title);
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn update_empty_string_persists_empty_string() {
  let svc = service().await;
  let created = svc
    .create(input(json!({ "title": "T", "subtitle": "S", "seo_title": "SEO" })), &editor())
    .await
    .unwrap();

  let updated = svc
    .update(
      &created.id,
      input(json!({ "subtitle": "", "seo_title": null, "thumbnail_image": null })),
      &editor(),
    )
    .await
    .unwrap();

  assert_eq!(updated.subtitle, "");
  assert_eq!(updated.seo_title, "");
  assert_eq!(updated.thumbnail_image.as_deref(), Some(""));
}

#[tokio::test]
async fn update_metadata_pruning() {
  let svc = service().await;
  let created = svc.create(input(json!({ "title": "M" })), &editor()).await.unwrap();

  let updated = svc
    .update(&created.id, input(json!({ "metadata": { "a": "1", "b": "" } })), &editor())
    .await
    .unwrap();
  assert_eq!(updated.metadata, Some(json!({ "a": "1" })));

  let updated = svc
    .update(&created.id, input(json!({ "metadata": { "a": "" } })), &editor())
    .await
    .unwrap();
  assert_eq!(updated.metadata, None);
}

#[tokio::test]
async fn update_structured_fields_roundtrip() {
  let svc = service().await;
  let created = svc.create(input(json!({ "title": "S" })), &editor()).await.unwrap();

  let updated = svc
    .update(
      &created.id,
      input(json!({ "body": content(), "tags": "{x,y}", "body_images": null })),
      &editor(),
    )
    .await
    .unwrap();
  assert_eq!(updated.body, Some(content()));
  assert_eq!(updated.tags, ["x", "y"]);
  assert!(updated.body_images.is_empty());
}

#[tokio::test]
async fn update_fills_defaults_for_legacy_rows() {
  let svc = service().await;
  insert_legacy(svc.store(), "blog_article_old", None, "").await;

  let updated = svc
    .update("old", input(json!({ "subtitle": "Now with subtitle" })), &editor())
    .await
    .unwrap();

  assert_eq!(updated.author, "editor@example.com");
  assert_eq!(updated.seo_title, "Legacy");
  assert_eq!(updated.seo_description, "Now with subtitle");
  assert_eq!(updated.url_slug, "legacy");
}

#[tokio::test]
async fn update_missing_is_not_found() {
  let svc = service().await;
  let result = svc.update("ghost", input(json!({ "title": "x" })), &editor()).await;
  assert!(matches!(result, Err(CoreError::NotFound(_))));
}

// ─── Update: status mode ─────────────────────────────────────────────────────

#[tokio::test]
async fn publishing_empty_article_fails_without_writing() {
  let svc = service().await;
  let created = svc
    .create(input(json!({ "title": "Empty", "draft": true, "body": { "blocks": [] } })), &editor())
    .await
    .unwrap();

  let result = svc
    .update(
      &created.id,
      input(json!({ "change_draft_status": true, "draft": false })),
      &editor(),
    )
    .await;
  assert!(matches!(result, Err(CoreError::ValidationFailed(_))));

  let unchanged = svc.get(&created.id).await.unwrap();
  assert_eq!(unchanged, created);
}

#[tokio::test]
async fn publishing_untitled_article_fails() {
  let svc = service().await;
  let created = svc
    .create(input(json!({ "draft": true, "body": content() })), &editor())
    .await
    .unwrap();

  let result = svc
    .update(&created.id, input(json!({ "change_draft_status": true, "draft": false })), &editor())
    .await;
  assert!(matches!(result, Err(CoreError::ValidationFailed(_))));
}

#[tokio::test]
async fn status_change_only_writes_draft() {
  let svc = service().await;
  let created = svc
    .create(input(json!({ "title": "Ready", "draft": true, "body": content() })), &editor())
    .await
    .unwrap();

  let published = svc
    .update(
      &created.id,
      input(json!({ "change_draft_status": true, "draft": false, "title": "Ignored" })),
      &editor(),
    )
    .await
    .unwrap();
  assert!(!published.draft);
  assert_eq!(published.title, "Ready");

  // Unpublishing never needs validation.
  let hidden = svc
    .update(&created.id, input(json!({ "change_draft_status": true, "draft": true })), &editor())
    .await
    .unwrap();
  assert!(hidden.draft);
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_returns_row_then_nothing() {
  let svc = service().await;
  let created = svc.create(input(json!({ "title": "Bye" })), &editor()).await.unwrap();

  let deleted = svc.delete(&created.id).await.unwrap();
  assert_eq!(deleted.map(|a| a.id), Some(created.id.clone()));

  assert!(svc.delete(&created.id).await.unwrap().is_none());
  assert!(matches!(svc.get(&created.id).await, Err(CoreError::NotFound(_))));
}

// ─── Public reads ────────────────────────────────────────────────────────────

#[tokio::test]
async fn public_list_hides_drafts() {
  let svc = service().await;
  svc.create(input(json!({ "title": "Live", "thumbnail_image": "cover.png" })), &editor()).await.unwrap();
  svc.create(input(json!({ "title": "Hidden", "draft": true })), &editor()).await.unwrap();

  let (page, count) = svc.list_published(0, 50).await.unwrap();
  assert_eq!(count, 1);
  assert!(page.iter().all(|a| !a.draft));
  assert_eq!(page[0].title, "Live");
  assert_eq!(
    page[0].thumbnail_image.as_deref(),
    Some("http://localhost:9000/static/cover.png"),
  );
}

#[tokio::test]
async fn public_get_by_slug() {
  let svc = ArticleService::new(Arc::new(store().await))
    .with_public_origin("https://shop.example.com");
  svc
    .create(
      input(json!({
        "title": "Live",
        "url_slug": "live",
        "thumbnail_image": "/uploads/live.png",
      })),
      &editor(),
    )
    .await
    .unwrap();
  svc
    .create(input(json!({ "title": "Hidden", "url_slug": "hidden", "draft": true })), &editor())
    .await
    .unwrap();

  let live = svc.get_published("live").await.unwrap();
  assert_eq!(
    live.thumbnail_image.as_deref(),
    Some("https://shop.example.com/uploads/live.png"),
  );

  assert!(matches!(svc.get_published("hidden").await, Err(CoreError::NotFound(_))));
  assert!(matches!(svc.get_published("missing").await, Err(CoreError::NotFound(_))));
}
