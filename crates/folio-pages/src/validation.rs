//! Editable page input and its validation rules.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::page::{Page, PageId, Publication, ROOT_PARENT, Robots, Seo, Sitemap};

/// Maximum alias length in characters.
pub const MAX_ALIAS_LEN: usize = 100;

static ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("invalid alias regex"));

/// Check that `alias` is a single non-empty path segment of letters, digits, dashes and underscores.
#[must_use]
pub fn is_valid_alias(alias: &str) -> bool {
    ALIAS_RE.is_match(alias)
}

/// Editable page fields as submitted by the admin form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageInput {
    pub parent_id: PageId,
    pub alias: String,
    pub name: String,
    pub content: String,
    pub image: Option<String>,
    pub images: Option<String>,
    pub template: String,
    pub child_template: Option<String>,
    pub layout: String,
    pub child_layout: Option<String>,
    #[serde(flatten)]
    pub publication: Publication,
    #[serde(flatten)]
    pub seo: Seo,
    #[serde(flatten)]
    pub robots: Robots,
    #[serde(flatten)]
    pub sitemap: Sitemap,
    /// Remaining submitted keys; only `_`-prefixed custom attributes are kept.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PageInput {
    /// Form values of an existing page.
    #[must_use]
    pub fn from_page(page: &Page) -> Self {
        Self {
            parent_id: page.parent_id,
            alias: page.alias.clone(),
            name: page.name.clone(),
            content: page.content.clone(),
            image: page.image.clone(),
            images: page.images.clone(),
            template: page.template.clone(),
            child_template: page.child_template.clone(),
            layout: page.layout.clone(),
            child_layout: page.child_layout.clone(),
            publication: page.publication.clone(),
            seo: page.seo.clone(),
            robots: page.robots.clone(),
            sitemap: page.sitemap.clone(),
            extra: page.data.clone(),
        }
    }

    /// Trim text fields and turn empty optional strings into `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        fn blank_to_none(value: &mut Option<String>) {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }

        self.alias = self.alias.trim().to_owned();
        self.name = self.name.trim().to_owned();
        for value in [
            &mut self.image,
            &mut self.images,
            &mut self.child_template,
            &mut self.child_layout,
            &mut self.seo.meta_title,
            &mut self.seo.meta_keywords,
            &mut self.seo.meta_description,
            &mut self.robots.canonical,
        ] {
            blank_to_none(value);
        }
        self
    }

    /// Custom attributes: keys with a single leading underscore.
    ///
    /// Double-underscore keys are form control flags and are dropped.
    #[must_use]
    pub fn custom_data(&self) -> serde_json::Map<String, serde_json::Value> {
        self.extra
            .iter()
            .filter(|(key, _)| key.starts_with('_') && !key.starts_with("__"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Validate the input.
    ///
    /// # Arguments
    ///
    /// * `rules` - Selectable templates and layouts
    /// * `own_id` - Id of the page being edited, `None` when creating
    pub fn validate(
        &self,
        rules: &ValidationRules,
        own_id: Option<PageId>,
    ) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();

        if self.name.trim().is_empty() {
            errors.add("name", "The name field is required.");
        }

        if self.alias.is_empty() {
            errors.add("alias", "The alias field is required.");
        } else {
            if !is_valid_alias(&self.alias) {
                errors.add(
                    "alias",
                    "The alias may only contain letters, numbers, dashes and underscores.",
                );
            }
            if self.alias.chars().count() > MAX_ALIAS_LEN {
                errors.add(
                    "alias",
                    format!("The alias may not be greater than {MAX_ALIAS_LEN} characters."),
                );
            }
        }

        if self.parent_id < ROOT_PARENT {
            errors.add("parent_id", "The parent is invalid.");
        }
        if own_id.is_some_and(|id| id == self.parent_id) {
            errors.add("parent_id", "A page cannot be its own parent.");
        }

        if !rules.templates.contains(&self.template) {
            errors.add("template", "The selected template is invalid.");
        }
        if let Some(child) = &self.child_template
            && !rules.templates.contains(child)
        {
            errors.add("child_template", "The selected template is invalid.");
        }
        if !rules.layouts.contains(&self.layout) {
            errors.add("layout", "The selected layout is invalid.");
        }
        if let Some(child) = &self.child_layout
            && !rules.layouts.contains(child)
        {
            errors.add("child_layout", "The selected layout is invalid.");
        }

        if let (Some(start), Some(end)) = (
            self.publication.publish_start,
            self.publication.publish_end,
        ) && start > end
        {
            errors.add(
                "publish_end",
                "The publication end must be after the publication start.",
            );
        }

        if !(0.0..=1.0).contains(&self.sitemap.priority) {
            errors.add(
                "site_map_priority",
                "The sitemap priority must be between 0 and 1.",
            );
        }

        errors.into_result()
    }
}

/// Template and layout names accepted by validation.
#[derive(Clone, Debug, Default)]
pub struct ValidationRules {
    /// Selectable template names.
    pub templates: Vec<String>,
    /// Selectable layout names.
    pub layouts: Vec<String>,
}

/// Validation failures keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Messages per field.
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// Record a message for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// True if no message was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        write!(f, "Validation failed: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationError {}

/// Check whether re-parenting `page_id` under `new_parent` would detach it into a cycle.
///
/// `parents` maps every stored page id (deleted ones included) to its parent id.
/// Returns true when `new_parent` is `page_id` itself or one of its descendants.
#[must_use]
pub fn creates_cycle(parents: &HashMap<PageId, PageId>, page_id: PageId, new_parent: PageId) -> bool {
    let mut seen = HashSet::new();
    let mut current = new_parent;
    while current != ROOT_PARENT && seen.insert(current) {
        if current == page_id {
            return true;
        }
        match parents.get(&current) {
            Some(&parent) => current = parent,
            None => return false,
        }
    }
    false
}
