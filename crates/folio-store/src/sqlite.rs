//! SQLite implementation of [`PageStore`].

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_pages::{
    ChangeFrequency, DeletedFilter, Direction, ListQuery, Order, OrderBy, Page, PageId,
    PageInput, PageSummary, Paginated, Publication, PublishedFilter, ROOT_PARENT, Robots,
    RouteNode, SearchField, Seo, Sitemap, Visibility,
};
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::schema::{EDITABLE_COLUMNS, SCHEMA, SUMMARY_SELECT, TABLE_EXISTS};
use crate::{ChangedFields, PageStore, StoreError};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Page store backed by a SQLite connection pool.
pub struct SqlitePageStore {
    pool: SqlitePool,
}

impl SqlitePageStore {
    /// Connect to a SQLite database, creating the file if missing.
    ///
    /// # Arguments
    ///
    /// * `url` - Database URL (e.g., `sqlite:folio.db`)
    /// * `max_connections` - Pool size
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        tracing::debug!(url, max_connections, "Connected to page database");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// The pool keeps a single connection alive for its whole lifetime, since
    /// every connection to `sqlite::memory:` sees its own empty database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl PageStore for SqlitePageStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Page schema is up to date");
        Ok(())
    }

    async fn is_migrated(&self) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(TABLE_EXISTS)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn route_nodes(&self) -> Result<Vec<RouteNode>, StoreError> {
        let rows =
            sqlx::query("SELECT id, parent_id, alias FROM pages WHERE deleted_at IS NULL ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(|row| -> Result<RouteNode, StoreError> {
                Ok(RouteNode::new(
                    row.try_get("id")?,
                    row.try_get("parent_id")?,
                    row.try_get::<String, _>("alias")?,
                ))
            })
            .collect()
    }

    async fn parent_links(&self) -> Result<HashMap<PageId, PageId>, StoreError> {
        let links: Vec<(PageId, PageId)> = sqlx::query_as("SELECT id, parent_id FROM pages")
            .fetch_all(&self.pool)
            .await?;
        Ok(links.into_iter().collect())
    }

    async fn visibility(&self, id: PageId) -> Result<Visibility, StoreError> {
        let deleted_at: Option<Option<DateTime<Utc>>> =
            sqlx::query_scalar("SELECT deleted_at FROM pages WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(match deleted_at {
            None => Visibility::Purged,
            Some(None) => Visibility::Active,
            Some(Some(_)) => Visibility::SoftDeleted,
        })
    }

    async fn get(&self, id: PageId, deleted: DeletedFilter) -> Result<Option<Page>, StoreError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM pages WHERE pages.id = ");
        qb.push_bind(id);
        push_deleted_filter(&mut qb, deleted);

        let row = qb.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(page_from_row).transpose()
    }

    async fn get_many(
        &self,
        ids: &[PageId],
        deleted: DeletedFilter,
    ) -> Result<Vec<PageSummary>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(SUMMARY_SELECT);
        qb.push(" WHERE pages.id IN ");
        push_id_list(&mut qb, ids);
        push_deleted_filter(&mut qb, deleted);
        qb.push(" ORDER BY pages.id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(summary_from_row).collect()
    }

    async fn list(
        &self,
        query: &ListQuery,
        per_page: u32,
        now: DateTime<Utc>,
    ) -> Result<Paginated<PageSummary>, StoreError> {
        let per_page = per_page.max(1);

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM pages");
        push_list_filters(&mut count, query, now);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let offset = Paginated::<PageSummary>::offset(query.page, per_page);
        let mut select = QueryBuilder::<Sqlite>::new(SUMMARY_SELECT);
        push_list_filters(&mut select, query, now);
        select.push(order_clause(query.order));
        select.push(" LIMIT ");
        select.push_bind(i64::from(per_page));
        select.push(" OFFSET ");
        select.push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

        let rows = select.build().fetch_all(&self.pool).await?;
        let data = rows
            .iter()
            .map(summary_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut result = Paginated::new(
            data,
            query.page,
            per_page,
            u64::try_from(total).unwrap_or_default(),
        );

        if let Some(parent_id) = query.parent_id.filter(|&id| id != ROOT_PARENT)
            && let Some(parent) = self.get(parent_id, DeletedFilter::WithDeleted).await?
        {
            result.parent = Some(parent.parent_id);
            result.description = Some(parent.name);
        }

        Ok(result)
    }

    async fn create(&self, input: &PageInput) -> Result<Page, StoreError> {
        let now = Utc::now();
        let data = serde_json::to_string(&input.custom_data())?;
        let sql = format!(
            "INSERT INTO pages ({}, created_at, updated_at) VALUES ({}, ?, ?)",
            EDITABLE_COLUMNS.join(", "),
            vec!["?"; EDITABLE_COLUMNS.len()].join(", ")
        );

        let result = bind_input(sqlx::query(&sql), input, data)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
        let id = result.last_insert_rowid();

        tracing::info!(page_id = id, alias = %input.alias, parent_id = input.parent_id, "Page created");
        self.get(id, DeletedFilter::WithDeleted)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(
        &self,
        id: PageId,
        input: &PageInput,
    ) -> Result<(Page, ChangedFields), StoreError> {
        let existing = self
            .get(id, DeletedFilter::WithDeleted)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        let mut data = existing.data.clone();
        data.extend(input.custom_data());
        let data = serde_json::to_string(&data)?;

        let assignments: Vec<String> = EDITABLE_COLUMNS
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect();
        let sql = format!(
            "UPDATE pages SET {}, updated_at = ? WHERE id = ?",
            assignments.join(", ")
        );

        bind_input(sqlx::query(&sql), input, data)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        let changed = ChangedFields {
            alias: existing.alias != input.alias,
            parent_id: existing.parent_id != input.parent_id,
        };
        tracing::info!(
            page_id = id,
            alias_changed = changed.alias,
            parent_changed = changed.parent_id,
            "Page updated"
        );

        let page = self
            .get(id, DeletedFilter::WithDeleted)
            .await?
            .ok_or(StoreError::NotFound(id))?;
        Ok((page, changed))
    }

    async fn soft_delete(&self, ids: &[PageId]) -> Result<Vec<PageId>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE pages SET deleted_at = ");
        qb.push_bind(now);
        qb.push(", updated_at = ");
        qb.push_bind(now);
        qb.push(" WHERE deleted_at IS NULL AND id IN ");
        push_id_list(&mut qb, ids);
        qb.push(" RETURNING id");

        let mut deleted: Vec<PageId> = qb.build_query_scalar().fetch_all(&self.pool).await?;
        deleted.sort_unstable();

        tracing::info!(requested = ids.len(), deleted = deleted.len(), "Pages soft-deleted");
        Ok(deleted)
    }

    async fn restore(&self, ids: &[PageId]) -> Result<Vec<PageId>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE pages SET deleted_at = NULL, updated_at = ");
        qb.push_bind(Utc::now());
        qb.push(" WHERE deleted_at IS NOT NULL AND id IN ");
        push_id_list(&mut qb, ids);
        qb.push(" RETURNING id");

        let mut restored: Vec<PageId> = qb.build_query_scalar().fetch_all(&self.pool).await?;
        restored.sort_unstable();

        tracing::info!(requested = ids.len(), restored = restored.len(), "Pages restored");
        Ok(restored)
    }

    async fn set_published(
        &self,
        ids: &[PageId],
        published: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<PageId>, StoreError> {
        let pages = self.get_many(ids, DeletedFilter::ExcludeDeleted).await?;

        let mut tx = self.pool.begin().await?;
        let mut changed = Vec::new();
        for PageSummary { page, .. } in pages {
            if page.publication.is_published_at(now) == published {
                continue;
            }

            let mut publication = page.publication;
            if published {
                publication.publish(now);
            } else {
                publication.unpublish();
            }

            sqlx::query(
                "UPDATE pages SET published = ?, publish_start = ?, publish_end = ?, updated_at = ? \
                 WHERE id = ?",
            )
            .bind(publication.published)
            .bind(publication.publish_start)
            .bind(publication.publish_end)
            .bind(now)
            .bind(page.id)
            .execute(&mut *tx)
            .await?;
            changed.push(page.id);
        }
        tx.commit().await?;

        tracing::info!(published, changed = changed.len(), "Page publication updated");
        Ok(changed)
    }
}

/// Bind the [`EDITABLE_COLUMNS`] values of `input`, in order.
fn bind_input<'q>(query: SqliteQuery<'q>, input: &'q PageInput, data: String) -> SqliteQuery<'q> {
    query
        .bind(input.parent_id)
        .bind(input.alias.as_str())
        .bind(input.name.as_str())
        .bind(input.content.as_str())
        .bind(input.image.as_deref())
        .bind(input.images.as_deref())
        .bind(data)
        .bind(input.template.as_str())
        .bind(input.child_template.as_deref())
        .bind(input.layout.as_str())
        .bind(input.child_layout.as_deref())
        .bind(input.publication.published)
        .bind(input.publication.publish_start)
        .bind(input.publication.publish_end)
        .bind(input.seo.meta_title.as_deref())
        .bind(input.seo.meta_keywords.as_deref())
        .bind(input.seo.meta_description.as_deref())
        .bind(input.robots.no_index)
        .bind(input.robots.no_follow)
        .bind(input.robots.canonical.as_deref())
        .bind(input.sitemap.enabled)
        .bind(input.sitemap.update_frequency.as_str())
        .bind(input.sitemap.priority)
        .bind(input.sitemap.last_mod_enabled)
}

/// Append `(id, id, ...)`. `ids` must not be empty.
fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[PageId]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for &id in ids {
        separated.push_bind(id);
    }
    qb.push(")");
}

fn push_deleted_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: DeletedFilter) {
    match filter {
        DeletedFilter::ExcludeDeleted => {
            qb.push(" AND pages.deleted_at IS NULL");
        }
        DeletedFilter::OnlyDeleted => {
            qb.push(" AND pages.deleted_at IS NOT NULL");
        }
        DeletedFilter::WithDeleted => {}
    }
}

/// Append the condition of [`Publication::is_published_at`].
fn push_published_predicate(qb: &mut QueryBuilder<'_, Sqlite>, now: DateTime<Utc>) {
    qb.push("(pages.published = 1 AND (pages.publish_start IS NULL OR pages.publish_start <= ");
    qb.push_bind(now);
    qb.push(") AND (pages.publish_end IS NULL OR pages.publish_end >= ");
    qb.push_bind(now);
    qb.push("))");
}

fn push_list_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &ListQuery, now: DateTime<Utc>) {
    qb.push(" WHERE 1 = 1");

    if let Some(parent_id) = query.parent_id {
        qb.push(" AND pages.parent_id = ");
        qb.push_bind(parent_id);
    }

    match query.published {
        PublishedFilter::Any => {}
        PublishedFilter::Published => {
            qb.push(" AND ");
            push_published_predicate(qb, now);
        }
        PublishedFilter::Unpublished => {
            qb.push(" AND NOT ");
            push_published_predicate(qb, now);
        }
    }

    push_deleted_filter(qb, query.deleted);

    if let Some(search) = &query.search {
        let pattern = search.like_pattern();
        qb.push(" AND (");
        for (i, field) in search.fields.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(match field {
                SearchField::Id => "CAST(pages.id AS TEXT)",
                SearchField::Name => "pages.name",
                SearchField::Alias => "pages.alias",
            });
            qb.push(" LIKE ");
            qb.push_bind(pattern.clone());
        }
        qb.push(")");
    }
}

/// `ORDER BY` clause. Dates sort missing values last; ties break by id.
fn order_clause(order: Order) -> String {
    let column = match order.by {
        OrderBy::Id => "pages.id",
        OrderBy::Name => "pages.name",
        OrderBy::Alias => "pages.alias",
        OrderBy::Published => "pages.published",
        OrderBy::CreationDate => "pages.created_at",
        OrderBy::UpdateDate => "pages.updated_at",
        OrderBy::DeleteDate => "pages.deleted_at",
        OrderBy::PublishStart => "pages.publish_start",
        OrderBy::PublishEnd => "pages.publish_end",
    };
    let direction = match order.direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    };

    match order.by {
        OrderBy::Id => format!(" ORDER BY {column} {direction}"),
        by if by.is_date() => {
            format!(" ORDER BY {column} IS NULL, {column} {direction}, pages.id ASC")
        }
        _ => format!(" ORDER BY {column} {direction}, pages.id ASC"),
    }
}

fn page_from_row(row: &SqliteRow) -> Result<Page, StoreError> {
    let frequency: String = row.try_get("site_map_update_frequency")?;
    let update_frequency =
        frequency
            .parse::<ChangeFrequency>()
            .map_err(|e| StoreError::Decode {
                column: "site_map_update_frequency",
                message: e.to_string(),
            })?;
    let data: String = row.try_get("data")?;

    Ok(Page {
        id: row.try_get("id")?,
        parent_id: row.try_get("parent_id")?,
        alias: row.try_get("alias")?,
        name: row.try_get("name")?,
        content: row.try_get("content")?,
        image: row.try_get("image")?,
        images: row.try_get("images")?,
        template: row.try_get("template")?,
        child_template: row.try_get("child_template")?,
        layout: row.try_get("layout")?,
        child_layout: row.try_get("child_layout")?,
        publication: Publication {
            published: row.try_get("published")?,
            publish_start: row.try_get("publish_start")?,
            publish_end: row.try_get("publish_end")?,
        },
        seo: Seo {
            meta_title: row.try_get("meta_title")?,
            meta_keywords: row.try_get("meta_keywords")?,
            meta_description: row.try_get("meta_description")?,
        },
        robots: Robots {
            no_index: row.try_get("no_index")?,
            no_follow: row.try_get("no_follow")?,
            canonical: row.try_get("canonical")?,
        },
        sitemap: Sitemap {
            enabled: row.try_get("site_map_enable")?,
            update_frequency,
            priority: row.try_get("site_map_priority")?,
            last_mod_enabled: row.try_get("site_map_last_mod_enable")?,
        },
        data: serde_json::from_str(&data)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}

fn summary_from_row(row: &SqliteRow) -> Result<PageSummary, StoreError> {
    Ok(PageSummary {
        page: page_from_row(row)?,
        children_count: row.try_get("children_count")?,
    })
}
