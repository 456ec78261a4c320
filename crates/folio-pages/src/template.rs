//! Template and layout resolution for the add and edit forms.
//!
//! A page is edited with a template and rendered with a layout. New pages
//! inherit the `child_template`/`child_layout` of their parent; the form can
//! also be reloaded after the user picked another template or parent, which
//! the client reports through a [`FormInitiator`].

use serde::{Deserialize, Serialize};

use crate::page::{Page, PageId, ROOT_PARENT};
use crate::validation::ValidationRules;

/// Extension appended to a template name to find its matching layout.
const LAYOUT_EXTENSION: &str = ".html";

/// Form field whose change triggered a form reload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormInitiator {
    /// The template selector changed.
    Template,
    /// The parent selector changed.
    ParentId,
    /// Initial load, or a field that does not affect template selection.
    #[default]
    #[serde(other)]
    None,
}

/// Templates and layouts available to pages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TemplateCatalog {
    /// Template used when nothing else applies.
    pub default_template: String,
    /// Layout used when nothing else applies.
    pub default_layout: String,
    /// Selectable templates.
    pub templates: Vec<String>,
    /// Selectable layouts.
    pub layouts: Vec<String>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self {
            default_template: "page".to_owned(),
            default_layout: "page.html".to_owned(),
            templates: vec!["page".to_owned()],
            layouts: vec!["page.html".to_owned()],
        }
    }
}

impl TemplateCatalog {
    /// Validation rules accepting the catalog's templates and layouts.
    #[must_use]
    pub fn rules(&self) -> ValidationRules {
        ValidationRules {
            templates: self.templates.clone(),
            layouts: self.layouts.clone(),
        }
    }

    /// Layout named after `template`, if the catalog has one.
    fn layout_for(&self, template: &str) -> Option<String> {
        let candidate = format!("{template}{LAYOUT_EXTENSION}");
        self.layouts.contains(&candidate).then_some(candidate)
    }

    /// Fill empty values with the catalog defaults.
    fn finish(&self, template: Option<String>, layout: Option<String>) -> TemplateChoice {
        TemplateChoice {
            template: template
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| self.default_template.clone()),
            layout: layout
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| self.default_layout.clone()),
        }
    }

    /// Choice for a template picked directly in the form.
    fn requested(&self, requested: Option<&str>, fallback_layout: Option<String>) -> TemplateChoice {
        let template = requested
            .filter(|t| !t.is_empty())
            .map_or_else(|| self.default_template.clone(), str::to_owned);
        let layout = self.layout_for(&template).or(fallback_layout);
        self.finish(Some(template), layout)
    }

    /// Choice inherited from a parent's child settings.
    fn inherited(&self, parent: Option<&Page>) -> TemplateChoice {
        self.finish(
            parent.and_then(|p| p.child_template.clone()),
            parent.and_then(|p| p.child_layout.clone()),
        )
    }

    /// Resolve template and layout for the add form.
    ///
    /// # Arguments
    ///
    /// * `initiator` - Field that triggered the reload
    /// * `parent_id` - Parent selected in the form
    /// * `requested` - Template selected in the form
    /// * `parent` - The page identified by `parent_id`, if it exists
    #[must_use]
    pub fn resolve_for_add(
        &self,
        initiator: FormInitiator,
        parent_id: PageId,
        requested: Option<&str>,
        parent: Option<&Page>,
    ) -> TemplateChoice {
        if initiator == FormInitiator::Template {
            self.requested(requested, None)
        } else if parent_id != ROOT_PARENT || initiator == FormInitiator::ParentId {
            self.inherited(parent)
        } else {
            self.finish(None, None)
        }
    }

    /// Resolve template and layout for the edit form of `page`.
    ///
    /// Arguments match [`resolve_for_add`](Self::resolve_for_add).
    #[must_use]
    pub fn resolve_for_edit(
        &self,
        page: &Page,
        initiator: FormInitiator,
        parent_id: PageId,
        requested: Option<&str>,
        parent: Option<&Page>,
    ) -> TemplateChoice {
        match initiator {
            FormInitiator::ParentId if parent_id != ROOT_PARENT => self.inherited(parent),
            FormInitiator::Template => self.requested(requested, Some(page.layout.clone())),
            _ => self.finish(Some(page.template.clone()), Some(page.layout.clone())),
        }
    }
}

/// Resolved template and layout for a form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TemplateChoice {
    /// Template name.
    pub template: String,
    /// Layout name.
    pub layout: String,
}
