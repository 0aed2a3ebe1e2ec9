use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use domains::{ListingMode, Post, PostChanges, PostListing, PostQuery, PostRepo, Result};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::map_db_error;

const POST_COLUMNS: &str = "id, title, content, image_url, bank_name, category, start_date, end_date, created_at";

#[derive(FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    content: String,
    image_url: Option<String>,
    bank_name: Option<String>,
    category: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            bank_name: row.bank_name,
            category: row.category,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ListingRow {
    #[sqlx(flatten)]
    post: PostRow,
    remaining_days: Option<i32>,
}

/// Escapes `\`, `%` and `_` so the term only ever matches literally under ILIKE.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Builds the listing statement. `today` is bound rather than read from `CURRENT_DATE`
/// so every predicate agrees with the date the service captured.
fn listing_query(query: &PostQuery) -> QueryBuilder<'static, Postgres> {
    let today = query.today;
    let mut qb = QueryBuilder::new(format!("SELECT {POST_COLUMNS}, "));

    match &query.mode {
        ListingMode::Filtered(filters) => {
            qb.push("(end_date - ")
                .push_bind(today)
                .push(") AS remaining_days FROM posts WHERE end_date >= ")
                .push_bind(today);

            if !filters.banks.is_empty() {
                qb.push(" AND bank_name = ANY(").push_bind(filters.banks.clone()).push(")");
            }
            if !filters.categories.is_empty() {
                qb.push(" AND category = ANY(").push_bind(filters.categories.clone()).push(")");
            }
            if let Some(term) = &filters.search {
                let pattern = format!("%{}%", escape_like(term));
                qb.push(" AND (title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR content ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }

            qb.push(" ORDER BY remaining_days ASC, id ASC");
        }
        ListingMode::Unfiltered => {
            qb.push("CASE WHEN end_date >= ")
                .push_bind(today)
                .push(" THEN end_date - ")
                .push_bind(today)
                .push(" END AS remaining_days FROM posts ORDER BY (end_date < ")
                .push_bind(today)
                .push(") ASC, remaining_days ASC NULLS LAST, end_date DESC, id ASC");
        }
    }

    qb.push(" LIMIT ")
        .push_bind(query.page.limit)
        .push(" OFFSET ")
        .push_bind(query.page.offset);
    qb
}

#[derive(Clone)]
pub struct PgPostRepo {
    pool: PgPool,
}

impl PgPostRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn list(&self, query: &PostQuery) -> Result<Vec<PostListing>> {
        let mut qb = listing_query(query);
        let rows = qb
            .build_query_as::<ListingRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| PostListing { post: row.post.into(), remaining_days: row.remaining_days })
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Into::into))
    }

    async fn create(&self, post: Post) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "INSERT INTO posts ({POST_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {POST_COLUMNS}"
        ))
        .bind(post.id)
        .bind(post.title)
        .bind(post.content)
        .bind(post.image_url)
        .bind(post.bank_name)
        .bind(post.category)
        .bind(post.start_date)
        .bind(post.end_date)
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "UPDATE posts SET title = $2, content = $3, image_url = $4, bank_name = $5, category = $6 \
             WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.content)
        .bind(changes.image_url)
        .bind(changes.bank_name)
        .bind(changes.category)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{Page, PostFilters};

    fn query(mode: ListingMode) -> PostQuery {
        PostQuery {
            mode,
            today: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            page: Page::default(),
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_unfiltered_sql() {
        let qb = listing_query(&query(ListingMode::Unfiltered));
        let sql = qb.sql();
        assert!(sql.contains("CASE WHEN end_date >= $1 THEN end_date - $2 END AS remaining_days FROM posts"));
        assert!(sql.ends_with(
            "ORDER BY (end_date < $3) ASC, remaining_days ASC NULLS LAST, end_date DESC, id ASC LIMIT $4 OFFSET $5"
        ));
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_filtered_sql_only_includes_present_filters() {
        let filters = PostFilters {
            banks: vec!["Garanti".into()],
            categories: vec![],
            search: Some("fuel".into()),
        };
        let qb = listing_query(&query(ListingMode::Filtered(filters)));
        let sql = qb.sql();

        assert!(sql.contains("WHERE end_date >= $2"));
        assert!(sql.contains("AND bank_name = ANY($3)"));
        assert!(!sql.contains("category = ANY"));
        assert!(sql.contains("AND (title ILIKE $4 OR content ILIKE $5)"));
        assert!(sql.ends_with("ORDER BY remaining_days ASC, id ASC LIMIT $6 OFFSET $7"));
    }
}
