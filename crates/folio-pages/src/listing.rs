//! Admin list query and record formatting.
//!
//! [`ListRequest`] is the JSON body posted by the admin list view. It is
//! turned into a typed [`ListQuery`] that stores execute, and each matching
//! page is formatted into a [`ListRecord`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::page::{Page, PageId, ROOT_PARENT};

/// Caption key preceding the publication start in record props.
pub const PUBLISH_START_CAPTION: &str = "manage.publish_start";
/// Caption key preceding the publication end in record props.
pub const PUBLISH_END_CAPTION: &str = "manage.publish_end";

/// A page together with the number of its non-deleted children.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageSummary {
    /// The page.
    #[serde(flatten)]
    pub page: Page,
    /// Number of non-deleted direct children.
    pub children_count: i64,
}

/// Formatted list row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListRecord {
    pub id: PageId,
    pub title: String,
    pub subtitle: String,
    /// Alternating caption keys and `datetime:<rfc3339>` values.
    pub props: Vec<String>,
    /// Published at formatting time.
    pub enabled: bool,
    pub deleted: bool,
    pub children_count: i64,
}

impl ListRecord {
    /// Format a page summary as seen at `now`.
    #[must_use]
    pub fn format(summary: &PageSummary, now: DateTime<Utc>) -> Self {
        let page = &summary.page;
        let mut props = Vec::new();
        if let Some(start) = page.publication.publish_start {
            props.push(format!("{PUBLISH_START_CAPTION}: "));
            props.push(datetime_prop(start));
        }
        if let Some(end) = page.publication.publish_end {
            props.push(format!("{PUBLISH_END_CAPTION}: "));
            props.push(datetime_prop(end));
        }

        Self {
            id: page.id,
            title: page.name.clone(),
            subtitle: page.alias.clone(),
            props,
            enabled: page.publication.is_published_at(now),
            deleted: page.deleted_at.is_some(),
            children_count: summary.children_count,
        }
    }
}

fn datetime_prop(value: DateTime<Utc>) -> String {
    format!("datetime:{}", value.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Column a list is ordered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    Name,
    Alias,
    Published,
    CreationDate,
    UpdateDate,
    DeleteDate,
    PublishStart,
    PublishEnd,
    #[default]
    #[serde(other)]
    Id,
}

impl OrderBy {
    /// Whether the column holds an optional date.
    #[must_use]
    pub fn is_date(self) -> bool {
        matches!(
            self,
            Self::CreationDate
                | Self::UpdateDate
                | Self::DeleteDate
                | Self::PublishStart
                | Self::PublishEnd
        )
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Desc,
    #[default]
    #[serde(other)]
    Asc,
}

/// Ordering of a list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub by: OrderBy,
    pub direction: Direction,
}

/// Publication filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PublishedFilter {
    #[default]
    Any,
    /// Published at query time.
    Published,
    /// Not published at query time.
    Unpublished,
}

/// Soft-deletion filter, applied uniformly by every store query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeletedFilter {
    #[default]
    ExcludeDeleted,
    WithDeleted,
    OnlyDeleted,
}

/// Field matched by a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Id,
    Name,
    Alias,
}

impl SearchField {
    fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "alias" => Some(Self::Alias),
            _ => None,
        }
    }
}

/// Text search over selected fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Search {
    /// Search text; `*` matches any run of characters.
    pub subject: String,
    pub fields: Vec<SearchField>,
}

impl Search {
    /// SQL `LIKE` pattern for the subject.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        self.subject.replace('*', "%")
    }
}

/// Typed list query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListQuery {
    /// Restrict to direct children of this parent; `None` lists every page.
    pub parent_id: Option<PageId>,
    pub order: Order,
    pub published: PublishedFilter,
    pub deleted: DeletedFilter,
    pub search: Option<Search>,
    /// One-based page number.
    pub page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            parent_id: Some(ROOT_PARENT),
            order: Order::default(),
            published: PublishedFilter::Any,
            deleted: DeletedFilter::ExcludeDeleted,
            search: None,
            page: 1,
        }
    }
}

/// Filter switches of the list view.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListFilters {
    /// List every page instead of one level.
    pub show_all: bool,
    /// `"published"` or `"unpublished"`.
    pub published: Option<String>,
    /// `"show_deleted"` or `"only_deleted"`.
    pub show_deleted: Option<String>,
}

/// Search box of the list view.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListSearch {
    pub subject: String,
    /// Comma-separated field names.
    pub fields: String,
}

/// JSON body of a list request.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListRequest {
    pub parent_id: Option<PageId>,
    pub order: Order,
    pub filters: ListFilters,
    pub search: Option<ListSearch>,
    pub page: Option<u32>,
}

impl ListRequest {
    /// Convert to a typed query. Unknown filter values are ignored.
    #[must_use]
    pub fn into_query(self) -> ListQuery {
        let parent_id = if self.filters.show_all {
            None
        } else {
            Some(self.parent_id.unwrap_or(ROOT_PARENT))
        };

        let published = match self.filters.published.as_deref() {
            Some("published") => PublishedFilter::Published,
            Some("unpublished") => PublishedFilter::Unpublished,
            _ => PublishedFilter::Any,
        };

        let deleted = match self.filters.show_deleted.as_deref() {
            Some("show_deleted") => DeletedFilter::WithDeleted,
            Some("only_deleted") => DeletedFilter::OnlyDeleted,
            _ => DeletedFilter::ExcludeDeleted,
        };

        let search = self.search.and_then(|search| {
            let fields: Vec<SearchField> =
                search.fields.split(',').filter_map(SearchField::parse).collect();
            (!search.subject.is_empty() && !fields.is_empty()).then_some(Search {
                subject: search.subject,
                fields,
            })
        });

        ListQuery {
            parent_id,
            order: self.order,
            published,
            deleted,
            search,
            page: self.page.unwrap_or(1).max(1),
        }
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
    /// Parent id of the listed level's parent, for "up" navigation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<PageId>,
    /// Name of the listed level's parent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl<T> Paginated<T> {
    /// Wrap one page of results. `last_page` is at least 1.
    #[must_use]
    pub fn new(data: Vec<T>, current_page: u32, per_page: u32, total: u64) -> Self {
        let last_page = if per_page == 0 {
            1
        } else {
            u32::try_from(total.div_ceil(u64::from(per_page)))
                .unwrap_or(u32::MAX)
                .max(1)
        };
        Self {
            data,
            current_page,
            per_page,
            total,
            last_page,
            parent: None,
            description: None,
        }
    }

    /// Map the items, keeping pagination metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
            parent: self.parent,
            description: self.description,
        }
    }

    /// Row offset of the current page.
    #[must_use]
    pub fn offset(current_page: u32, per_page: u32) -> u64 {
        u64::from(current_page.saturating_sub(1)) * u64::from(per_page)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::page::tests::sample_page;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn request(value: serde_json::Value) -> ListRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_format_record_without_window() {
        let summary = PageSummary {
            page: sample_page(3, 1, "team"),
            children_count: 2,
        };

        let record = ListRecord::format(&summary, now());

        assert_eq!(
            record,
            ListRecord {
                id: 3,
                title: "TEAM".to_owned(),
                subtitle: "team".to_owned(),
                props: Vec::new(),
                enabled: true,
                deleted: false,
                children_count: 2,
            }
        );
    }

    #[test]
    fn test_format_record_with_window_props() {
        let mut page = sample_page(3, 1, "team");
        page.publication.publish_start = Some(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap());
        page.publication.publish_end = Some(Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap());
        page.deleted_at = Some(now());
        let summary = PageSummary {
            page,
            children_count: 0,
        };

        let record = ListRecord::format(&summary, now());

        assert_eq!(
            record.props,
            vec![
                "manage.publish_start: ",
                "datetime:2025-07-01T00:00:00+00:00",
                "manage.publish_end: ",
                "datetime:2025-08-01T00:00:00+00:00",
            ]
        );
        // Window has not started yet
        assert!(!record.enabled);
        assert!(record.deleted);
    }

    #[test]
    fn test_empty_request_lists_top_level() {
        let query = request(serde_json::json!({})).into_query();
        assert_eq!(query, ListQuery::default());
    }

    #[test]
    fn test_request_with_parent_and_order() {
        let query = request(serde_json::json!({
            "parent_id": 4,
            "order": {"by": "publish_end", "direction": "desc"},
            "page": 3
        }))
        .into_query();

        assert_eq!(query.parent_id, Some(4));
        assert_eq!(query.order.by, OrderBy::PublishEnd);
        assert_eq!(query.order.direction, Direction::Desc);
        assert_eq!(query.page, 3);
    }

    #[test]
    fn test_request_unknown_order_defaults_to_id_asc() {
        let query = request(serde_json::json!({
            "order": {"by": "color", "direction": "sideways"}
        }))
        .into_query();

        assert_eq!(query.order, Order::default());
        assert_eq!(query.order.by, OrderBy::Id);
    }

    #[test]
    fn test_request_show_all_ignores_parent() {
        let query = request(serde_json::json!({
            "parent_id": 4,
            "filters": {"show_all": true}
        }))
        .into_query();

        assert_eq!(query.parent_id, None);
    }

    #[test]
    fn test_request_filters() {
        let query = request(serde_json::json!({
            "filters": {"published": "unpublished", "show_deleted": "only_deleted"}
        }))
        .into_query();

        assert_eq!(query.published, PublishedFilter::Unpublished);
        assert_eq!(query.deleted, DeletedFilter::OnlyDeleted);

        let query = request(serde_json::json!({
            "filters": {"published": "published", "show_deleted": "show_deleted"}
        }))
        .into_query();

        assert_eq!(query.published, PublishedFilter::Published);
        assert_eq!(query.deleted, DeletedFilter::WithDeleted);
    }

    #[test]
    fn test_request_search() {
        let query = request(serde_json::json!({
            "search": {"subject": "ab*", "fields": "name, alias,unknown"}
        }))
        .into_query();

        let search = query.search.unwrap();
        assert_eq!(search.fields, vec![SearchField::Name, SearchField::Alias]);
        assert_eq!(search.like_pattern(), "ab%");
    }

    #[test]
    fn test_request_search_without_fields_is_ignored() {
        let query = request(serde_json::json!({
            "search": {"subject": "ab", "fields": ""}
        }))
        .into_query();

        assert_eq!(query.search, None);
    }

    #[test]
    fn test_request_page_zero_is_first_page() {
        let query = request(serde_json::json!({"page": 0})).into_query();
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_paginated_last_page() {
        assert_eq!(Paginated::<u8>::new(Vec::new(), 1, 50, 0).last_page, 1);
        assert_eq!(Paginated::<u8>::new(Vec::new(), 1, 50, 50).last_page, 1);
        assert_eq!(Paginated::<u8>::new(Vec::new(), 1, 50, 51).last_page, 2);
        assert_eq!(Paginated::<u8>::offset(3, 50), 100);
    }

    #[test]
    fn test_paginated_serialization() {
        let mut page = Paginated::new(vec![1, 2], 1, 2, 3).map(|n| n * 10);
        page.parent = Some(0);
        page.description = Some("About".to_owned());

        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "data": [10, 20],
                "current_page": 1,
                "per_page": 2,
                "total": 3,
                "last_page": 2,
                "parent": 0,
                "description": "About"
            })
        );
    }

    #[test]
    fn test_paginated_omits_absent_parent() {
        let json = serde_json::to_value(Paginated::new(vec![1], 1, 50, 1)).unwrap();
        assert!(json.get("parent").is_none());
        assert!(json.get("description").is_none());
    }
}
