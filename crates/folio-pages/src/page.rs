//! Page data model.
//!
//! A [`Page`] is a node in a forest of content pages. Top-level pages carry
//! [`ROOT_PARENT`] as their parent id; every other page references the id of
//! its parent. Deletion is soft: `deleted_at` marks the row as hidden while
//! keeping it for restore.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page identifier.
pub type PageId = i64;

/// Parent id shared by all top-level pages.
pub const ROOT_PARENT: PageId = 0;

/// Content page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Unique page id.
    pub id: PageId,
    /// Parent page id, [`ROOT_PARENT`] for top-level pages.
    pub parent_id: PageId,
    /// URL path segment, unique among siblings.
    pub alias: String,
    /// Display title.
    pub name: String,
    /// HTML body.
    pub content: String,
    /// Primary image asset path.
    pub image: Option<String>,
    /// Gallery asset path (at most one asset in this configuration).
    pub images: Option<String>,
    /// Template used to edit and render this page.
    pub template: String,
    /// Template assigned to children created under this page.
    pub child_template: Option<String>,
    /// Layout used to render this page.
    pub layout: String,
    /// Layout assigned to children created under this page.
    pub child_layout: Option<String>,
    /// Publication flag and window.
    #[serde(flatten)]
    pub publication: Publication,
    /// SEO metadata.
    #[serde(flatten)]
    pub seo: Seo,
    /// Robots directives.
    #[serde(flatten)]
    pub robots: Robots,
    /// Sitemap settings.
    #[serde(flatten)]
    pub sitemap: Sitemap,
    /// Custom attributes (keys prefixed with `_`).
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Soft-deletion time.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Page {
    /// Visibility derived from the soft-deletion marker.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        if self.deleted_at.is_some() {
            Visibility::SoftDeleted
        } else {
            Visibility::Active
        }
    }

    /// Whether the page is publicly visible at `now`.
    #[must_use]
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.visibility() == Visibility::Active && self.publication.is_published_at(now)
    }
}

/// Storage visibility of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Row present and not deleted.
    Active,
    /// Row present with a deletion timestamp; can be restored.
    SoftDeleted,
    /// Row removed from storage.
    Purged,
}

/// Publication flag plus optional visibility window.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Publication {
    /// Manual publication flag.
    pub published: bool,
    /// Page is hidden before this time.
    pub publish_start: Option<DateTime<Utc>>,
    /// Page is hidden after this time.
    pub publish_end: Option<DateTime<Utc>>,
}

impl Publication {
    /// Whether the page is published at `now`: flag set and `now` inside the window.
    #[must_use]
    pub fn is_published_at(&self, now: DateTime<Utc>) -> bool {
        self.published
            && self.publish_start.is_none_or(|start| start <= now)
            && self.publish_end.is_none_or(|end| now <= end)
    }

    /// Publish now, clearing window bounds that would keep the page hidden.
    pub fn publish(&mut self, now: DateTime<Utc>) {
        self.published = true;
        if self.publish_start.is_some_and(|start| start > now) {
            self.publish_start = None;
        }
        if self.publish_end.is_some_and(|end| end < now) {
            self.publish_end = None;
        }
    }

    /// Clear the publication flag. The window is kept.
    pub fn unpublish(&mut self) {
        self.published = false;
    }
}

/// SEO metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seo {
    /// `<title>` override.
    pub meta_title: Option<String>,
    /// Meta keywords.
    pub meta_keywords: Option<String>,
    /// Meta description.
    pub meta_description: Option<String>,
}

/// Robots directives.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Robots {
    /// Emit `noindex`.
    pub no_index: bool,
    /// Emit `nofollow`.
    pub no_follow: bool,
    /// Canonical URL override.
    pub canonical: Option<String>,
}

impl Robots {
    /// Robots meta directive, `None` when the page is indexable and followable.
    #[must_use]
    pub fn directive(&self) -> Option<String> {
        match (self.no_index, self.no_follow) {
            (false, false) => None,
            (true, false) => Some("noindex".to_owned()),
            (false, true) => Some("nofollow".to_owned()),
            (true, true) => Some("noindex, nofollow".to_owned()),
        }
    }
}

/// Sitemap settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sitemap {
    /// Include the page in the sitemap.
    #[serde(rename = "site_map_enable")]
    pub enabled: bool,
    /// Expected change frequency.
    #[serde(rename = "site_map_update_frequency")]
    pub update_frequency: ChangeFrequency,
    /// Priority relative to other pages (0.0 to 1.0).
    #[serde(rename = "site_map_priority")]
    pub priority: f32,
    /// Emit the last modification date.
    #[serde(rename = "site_map_last_mod_enable")]
    pub last_mod_enabled: bool,
}

impl Default for Sitemap {
    fn default() -> Self {
        Self {
            enabled: true,
            update_frequency: ChangeFrequency::default(),
            priority: 0.5,
            last_mod_enabled: true,
        }
    }
}

/// Sitemap `changefreq` value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
    Never,
}

impl ChangeFrequency {
    /// Lowercase name as stored and serialized.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`ChangeFrequency`].
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sitemap update frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for ChangeFrequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            other => Err(ParseFrequencyError(other.to_owned())),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    pub(crate) fn sample_page(id: PageId, parent_id: PageId, alias: &str) -> Page {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Page {
            id,
            parent_id,
            alias: alias.to_owned(),
            name: alias.to_uppercase(),
            content: format!("<p>{alias}</p>"),
            image: None,
            images: None,
            template: "page".to_owned(),
            child_template: None,
            layout: "page.html".to_owned(),
            child_layout: None,
            publication: Publication {
                published: true,
                publish_start: None,
                publish_end: None,
            },
            seo: Seo::default(),
            robots: Robots::default(),
            sitemap: Sitemap::default(),
            data: serde_json::Map::new(),
            created_at: created,
            updated_at: created,
            deleted_at: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_visibility_active() {
        let page = sample_page(1, ROOT_PARENT, "about");
        assert_eq!(page.visibility(), Visibility::Active);
    }

    #[test]
    fn test_visibility_soft_deleted() {
        let mut page = sample_page(1, ROOT_PARENT, "about");
        page.deleted_at = Some(now());
        assert_eq!(page.visibility(), Visibility::SoftDeleted);
        assert!(!page.is_visible_at(now()));
    }

    #[test]
    fn test_published_without_window() {
        let publication = Publication {
            published: true,
            ..Publication::default()
        };
        assert!(publication.is_published_at(now()));
    }

    #[test]
    fn test_unpublished_flag_hides_page() {
        let publication = Publication::default();
        assert!(!publication.is_published_at(now()));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let publication = Publication {
            published: true,
            publish_start: Some(now()),
            publish_end: Some(now()),
        };
        assert!(publication.is_published_at(now()));
    }

    #[test]
    fn test_window_excludes_before_start_and_after_end() {
        let publication = Publication {
            published: true,
            publish_start: Some(now() + Duration::days(1)),
            publish_end: None,
        };
        assert!(!publication.is_published_at(now()));

        let publication = Publication {
            published: true,
            publish_start: None,
            publish_end: Some(now() - Duration::days(1)),
        };
        assert!(!publication.is_published_at(now()));
    }

    #[test]
    fn test_publish_clears_blocking_bounds() {
        let mut publication = Publication {
            published: false,
            publish_start: Some(now() + Duration::days(1)),
            publish_end: Some(now() - Duration::days(1)),
        };

        publication.publish(now());

        assert!(publication.published);
        assert!(publication.publish_start.is_none());
        assert!(publication.publish_end.is_none());
        assert!(publication.is_published_at(now()));
    }

    #[test]
    fn test_publish_keeps_open_window() {
        let start = now() - Duration::days(3);
        let end = now() + Duration::days(3);
        let mut publication = Publication {
            published: false,
            publish_start: Some(start),
            publish_end: Some(end),
        };

        publication.publish(now());

        assert_eq!(publication.publish_start, Some(start));
        assert_eq!(publication.publish_end, Some(end));
    }

    #[test]
    fn test_unpublish_keeps_window() {
        let end = now() + Duration::days(3);
        let mut publication = Publication {
            published: true,
            publish_start: None,
            publish_end: Some(end),
        };

        publication.unpublish();

        assert!(!publication.published);
        assert_eq!(publication.publish_end, Some(end));
    }

    #[test]
    fn test_robots_directive() {
        let mut robots = Robots::default();
        assert_eq!(robots.directive(), None);
        robots.no_index = true;
        assert_eq!(robots.directive().as_deref(), Some("noindex"));
        robots.no_follow = true;
        assert_eq!(robots.directive().as_deref(), Some("noindex, nofollow"));
    }

    #[test]
    fn test_change_frequency_parse() {
        assert_eq!("weekly".parse(), Ok(ChangeFrequency::Weekly));
        assert_eq!(ChangeFrequency::Never.to_string(), "never");
        assert!("fortnightly".parse::<ChangeFrequency>().is_err());
    }

    #[test]
    fn test_page_serialization_flattens_sections() {
        let page = sample_page(3, 1, "team");
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["alias"], "team");
        assert_eq!(json["published"], true);
        assert_eq!(json["site_map_enable"], true);
        assert_eq!(json["site_map_update_frequency"], "monthly");
        assert_eq!(json["no_index"], false);
    }
}
