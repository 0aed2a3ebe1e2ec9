//! Repository behavior against a real PostgreSQL. Needs a Docker daemon:
//! `cargo test -p integration-tests --features db-postgres -- --ignored`

use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use domains::{
    AccountRepo, AdminGrantRepo, Comment, CommentRepo, Complaint, ComplaintRepo, DomainError, Like,
    LikeRepo, LikeSubject, ListingMode, NewAccount, Page, Post, PostFilters, PostQuery, PostRepo,
};
use storage_adapters::postgres::{
    self, PgAccountRepo, PgAdminGrantRepo, PgCommentRepo, PgComplaintRepo, PgLikeRepo, PgPool, PgPostRepo,
};
use testcontainers_modules::{
    postgres::Postgres,
    testcontainers::{runners::AsyncRunner, ContainerAsync},
};
use uuid::Uuid;

async fn database() -> anyhow::Result<(ContainerAsync<Postgres>, PgPool)> {
    let node = Postgres::default().start().await?;
    let url = format!(
        "postgres://postgres:postgres@{}:{}/postgres",
        node.get_host().await?,
        node.get_host_port_ipv4(5432).await?
    );
    let pool = postgres::connect(&url, 5, Duration::from_secs(10)).await?;
    postgres::run_migrations(&pool).await?;
    Ok((node, pool))
}

fn new_account(handle: &str) -> NewAccount {
    NewAccount {
        id: Uuid::now_v7(),
        email: format!("{handle}@example.com"),
        password_hash: "$argon2id$placeholder".into(),
        handle: handle.into(),
        created_at: Utc::now(),
    }
}

fn post(title: &str, bank: &str, today: NaiveDate, start: i64, end: i64) -> Post {
    let shift = |offset: i64| {
        let days = Days::new(offset.unsigned_abs());
        if offset >= 0 { today + days } else { today - days }
    };
    Post {
        id: Uuid::now_v7(),
        title: title.into(),
        content: format!("{title} details"),
        image_url: None,
        bank_name: Some(bank.into()),
        category: Some("market".into()),
        start_date: shift(start),
        end_date: shift(end),
        created_at: Utc::now(),
    }
}

fn titles(listing: &[domains::PostListing]) -> Vec<&str> {
    listing.iter().map(|row| row.post.title.as_str()).collect()
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_accounts_and_grants() -> anyhow::Result<()> {
    let (_node, pool) = database().await?;
    let accounts = PgAccountRepo::new(pool.clone());
    let grants = PgAdminGrantRepo::new(pool);

    let profile = accounts.create_with_handle(new_account("ayse")).await?;
    assert_eq!(profile.username.as_deref(), Some("ayse"));
    assert!(!profile.is_blocked);

    let err = accounts.create_with_handle(new_account("ayse")).await.unwrap_err();
    assert_eq!(err, DomainError::Conflict("A user with this email already exists.".into()));

    let mut stolen_handle = new_account("other");
    stolen_handle.handle = "ayse".into();
    let err = accounts.create_with_handle(stolen_handle).await.unwrap_err();
    assert_eq!(err, DomainError::Conflict("This username is already taken.".into()));
    // the account insert rolled back with the handle
    assert!(accounts.find_by_email("other@example.com").await?.is_none());

    assert!(!grants.is_admin(profile.id).await?);
    assert!(grants.set_admin_by_email("ayse@example.com", true).await?);
    assert!(grants.is_admin(profile.id).await?);
    assert!(grants.set_admin_by_email("ayse@example.com", false).await?);
    assert!(!grants.is_admin(profile.id).await?);
    assert!(!grants.set_admin_by_email("nobody@example.com", true).await?);

    let blocked = accounts.set_blocked(profile.id, true).await?.expect("profile");
    assert!(blocked.is_blocked);
    assert!(accounts.set_blocked(Uuid::now_v7(), true).await?.is_none());
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_post_listing_order() -> anyhow::Result<()> {
    let (_node, pool) = database().await?;
    let posts = PgPostRepo::new(pool);
    let today = Utc::now().date_naive();

    for (title, bank, start, end) in [
        ("Long", "Garanti", -5, 30),
        ("Ended recently", "Akbank", -20, -1),
        ("Ends today", "Akbank", -3, 0),
        ("Ended long ago", "Garanti", -60, -30),
        ("Short", "Garanti", 0, 3),
    ] {
        posts.create(post(title, bank, today, start, end)).await?;
    }

    let page = Page { limit: 50, offset: 0 };
    let unfiltered = posts.list(&PostQuery { mode: ListingMode::Unfiltered, today, page }).await?;
    assert_eq!(titles(&unfiltered), ["Ends today", "Short", "Long", "Ended recently", "Ended long ago"]);
    assert_eq!(unfiltered[0].remaining_days, Some(0));
    assert_eq!(unfiltered[4].remaining_days, None);

    let filters = PostFilters { banks: vec!["Garanti".into()], search: Some("o%".into()), ..Default::default() };
    let filtered = posts.list(&PostQuery { mode: ListingMode::Filtered(filters), today, page }).await?;
    // LIKE wildcards in the search term are literal
    assert!(filtered.is_empty());

    let filters = PostFilters { banks: vec!["Garanti".into()], search: Some("LONG".into()), ..Default::default() };
    let filtered = posts.list(&PostQuery { mode: ListingMode::Filtered(filters), today, page }).await?;
    assert_eq!(titles(&filtered), ["Long"]);
    assert_eq!(filtered[0].remaining_days, Some(30));

    let second_page = posts
        .list(&PostQuery { mode: ListingMode::Unfiltered, today, page: Page { limit: 2, offset: 3 } })
        .await?;
    assert_eq!(titles(&second_page), ["Ended recently", "Ended long ago"]);

    let inverted = post("Inverted", "Garanti", today, 5, 1);
    assert!(matches!(posts.create(inverted).await, Err(DomainError::Validation(_))));
    Ok(())
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_engagement_and_cascades() -> anyhow::Result<()> {
    let (_node, pool) = database().await?;
    let accounts = PgAccountRepo::new(pool.clone());
    let posts = PgPostRepo::new(pool.clone());
    let comments = PgCommentRepo::new(pool.clone());
    let likes = PgLikeRepo::new(pool.clone());
    let complaints = PgComplaintRepo::new(pool);

    let ayse = accounts.create_with_handle(new_account("ayse")).await?;
    let can = accounts.create_with_handle(new_account("can")).await?;
    let today = Utc::now().date_naive();
    let promo = posts.create(post("Cashback", "Garanti", today, 0, 10)).await?;

    let view = comments
        .create(Comment {
            id: Uuid::now_v7(),
            post_id: promo.id,
            author_id: ayse.id,
            content: "Nice".into(),
            created_at: Utc::now(),
        })
        .await?;
    assert_eq!(view.username.as_deref(), Some("ayse"));
    assert_eq!(view.like_count, 0);
    let comment_id = view.comment.id;

    let like = |subject, account_id| Like { id: Uuid::now_v7(), subject, account_id, created_at: Utc::now() };
    assert!(likes.insert_if_absent(like(LikeSubject::Post(promo.id), can.id)).await?.is_some());
    assert!(likes.insert_if_absent(like(LikeSubject::Post(promo.id), can.id)).await?.is_none());
    assert!(likes.insert_if_absent(like(LikeSubject::Comment(comment_id), can.id)).await?.is_some());
    assert_eq!(likes.count(LikeSubject::Post(promo.id)).await?, 1);

    let err = likes
        .insert_if_absent(like(LikeSubject::Post(Uuid::now_v7()), can.id))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotFound("Post not found".into()));

    let listed = comments.list_for_post(promo.id, Some(can.id)).await?;
    assert_eq!(listed[0].like_count, 1);
    assert!(listed[0].liked);
    assert!(!comments.list_for_post(promo.id, None).await?[0].liked);

    assert!(comments.update_owned(comment_id, can.id, "Hijack".into()).await?.is_none());
    assert!(!comments.delete_owned(comment_id, can.id).await?);

    complaints
        .create(Complaint {
            id: Uuid::now_v7(),
            comment_id,
            reporter_id: can.id,
            reason: "spam".into(),
            created_at: Utc::now(),
        })
        .await?;
    assert_eq!(complaints.list().await?.len(), 1);

    assert!(posts.delete(promo.id).await?);
    assert!(comments.list_for_post(promo.id, None).await?.is_empty());
    assert!(complaints.list().await?.is_empty());
    assert_eq!(likes.count(LikeSubject::Post(promo.id)).await?, 0);
    assert_eq!(likes.count(LikeSubject::Comment(comment_id)).await?, 0);
    Ok(())
}
