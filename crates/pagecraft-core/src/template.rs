//! Page templates: prepared element sets and backgrounds for freeform pages.

use crate::elements::Element;
use crate::page::Background;
use serde::{Deserialize, Serialize};

/// A reusable page design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Template {
    /// Copies of the template's elements with fresh ids.
    pub fn instantiate(&self) -> Vec<Element> {
        self.elements
            .iter()
            .cloned()
            .map(|mut element| {
                element.regenerate_id();
                element
            })
            .collect()
    }
}

/// Source of templates.
pub trait TemplateCatalog {
    fn get(&self, id: &str) -> Option<&Template>;

    fn list(&self) -> Vec<&Template>;
}

/// Template catalog backed by an in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplateCatalog {
    templates: Vec<Template>,
}

impl StaticTemplateCatalog {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// Load a catalog from a JSON array of templates.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn insert(&mut self, template: Template) {
        self.templates.retain(|t| t.id != template.id);
        self.templates.push(template);
    }
}

impl TemplateCatalog for StaticTemplateCatalog {
    fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    fn list(&self) -> Vec<&Template> {
        self.templates.iter().collect()
    }
}
