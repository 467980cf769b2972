//! Concrete robot description documents.
//!
//! A description is the SDF text handed to the spawn service, tagged with
//! how it was produced. Read-side queries parse on demand; patches in the
//! sibling modules rewrite the text without touching untouched content.

use crate::error::{SpawnError, SpawnResult};
use roxmltree::Document;

/// How a description was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionKind {
    /// Compiled from a template (`model.xacro`); instance parameters were
    /// supplied at compile time.
    Template,
    /// Read directly from a static `model.sdf`; instance parameters are
    /// patched in afterward.
    Static,
}

/// A concrete, spawnable robot description.
#[derive(Debug, Clone)]
pub struct Description {
    kind: DescriptionKind,
    xml: String,
}

impl Description {
    /// Wrap raw document text, verifying it parses as XML.
    pub fn from_xml(kind: DescriptionKind, xml: String) -> SpawnResult<Self> {
        Document::parse(&xml).map_err(|e| SpawnError::MalformedDescription(e.to_string()))?;
        Ok(Self { kind, xml })
    }

    pub fn kind(&self) -> DescriptionKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.xml
    }

    /// Consume the description, returning the document text.
    pub fn into_xml(self) -> String {
        self.xml
    }

    /// Replace the document text, keeping the kind. Used by patches.
    pub(crate) fn with_xml(self, xml: String) -> Self {
        Self {
            kind: self.kind,
            xml,
        }
    }

    /// Name attribute of the model element, if present.
    pub fn model_name(&self) -> Option<String> {
        let doc = Document::parse(&self.xml).ok()?;
        doc.descendants()
            .find(|n| n.tag_name().name() == "model")?
            .attribute("name")
            .map(str::to_string)
    }

    /// Text of a named parameter inside a named plugin element.
    pub fn plugin_param(&self, plugin: &str, param: &str) -> Option<String> {
        let doc = Document::parse(&self.xml).ok()?;
        let plugin_node = doc
            .descendants()
            .find(|n| n.tag_name().name() == "plugin" && n.attribute("name") == Some(plugin))?;
        plugin_node
            .children()
            .find(|n| n.tag_name().name() == param)?
            .text()
            .map(str::to_string)
    }

    /// Names of all link elements in document order.
    pub fn link_names(&self) -> Vec<String> {
        let Ok(doc) = Document::parse(&self.xml) else {
            return Vec::new();
        };
        doc.descendants()
            .filter(|n| n.tag_name().name() == "link")
            .filter_map(|n| n.attribute("name").map(str::to_string))
            .collect()
    }
}
