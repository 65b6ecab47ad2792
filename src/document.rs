//! Saving and loading a page as JSON.
//!
//! The document is the top-level element list as a JSON array of `{ id, type, props }`
//! objects, with children nested under `props.children`. Loading checks the result with
//! [`ElementTree::integrity_issues`] before handing it out.

use std::path::Path;

use crate::tree::ElementTree;

#[derive(Debug)]
pub enum DocumentError {
    Json(serde_json::Error),
    Io(std::io::Error),

    /// The document parsed but does not form a valid tree (e.g. duplicate ids).
    Integrity(Vec<String>),
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "document json error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Integrity(issues) => {
                write!(f, "document is not a valid element tree: {}", issues.join("; "))
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Integrity(_) => None,
        }
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl ElementTree {
    /// Pretty-printed JSON document.
    ///
    /// # Errors
    /// Only if JSON serialization itself fails.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// # Errors
    /// [`DocumentError::Json`] if `text` is not a document, [`DocumentError::Integrity`] if it
    /// is one but breaks a tree invariant.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let tree: Self = serde_json::from_str(text)?;
        let issues = tree.integrity_issues();
        if !issues.is_empty() {
            log::warn!("rejecting document with {} integrity issue(s)", issues.len());
            return Err(DocumentError::Integrity(issues));
        }
        Ok(tree)
    }

    /// # Errors
    /// Serialization or I/O failure.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// # Errors
    /// See [`Self::from_json`]; additionally [`DocumentError::Io`] if the file cannot be read.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builder::PageBuilder;
    use crate::element::{ElementId, ElementType, Props};

    fn page() -> ElementTree {
        let mut page = PageBuilder::new();
        let title = page.element(
            ElementType::Heading,
            Props::new().with("text", "Hello").with("level", 1),
        );
        let image = page.element(ElementType::Image, Props::new().with("src", "a.png"));
        let columns = page.container(ElementType::Columns, vec![image]);
        let section = page.container(ElementType::Section, vec![title, columns]);
        let (tree, _) = page.build(vec![section]);
        tree
    }

    #[test]
    fn document_shape_nests_children_in_props() {
        let value: serde_json::Value = serde_json::from_str(&page().to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!([{
                "id": "section-4",
                "type": "section",
                "props": {
                    "children": [
                        {
                            "id": "heading-1",
                            "type": "heading",
                            "props": { "text": "Hello", "level": 1 }
                        },
                        {
                            "id": "columns-3",
                            "type": "columns",
                            "props": {
                                "children": [{
                                    "id": "image-2",
                                    "type": "image",
                                    "props": { "src": "a.png" }
                                }]
                            }
                        }
                    ]
                }
            }])
        );
    }

    #[test]
    fn json_round_trip_keeps_prop_order() {
        let text = r#"[
  {
    "id": "button-1",
    "type": "button",
    "props": {
      "label": "Go",
      "href": "/next",
      "align": "left"
    }
  }
]"#;
        let tree = ElementTree::from_json(text).unwrap();
        assert_eq!(tree.to_json().unwrap(), text);
        assert_eq!(ElementTree::from_json(&page().to_json().unwrap()).unwrap(), page());
    }

    #[test]
    fn missing_props_default_to_empty() {
        let tree = ElementTree::from_json(r#"[{"id": "divider-1", "type": "divider"}]"#).unwrap();
        let divider = tree.find_element_by_id(&ElementId::from("divider-1")).unwrap();
        assert!(divider.props.values().is_empty());
    }

    #[test]
    fn rejects_invalid_documents() {
        assert!(matches!(
            ElementTree::from_json("{}"),
            Err(DocumentError::Json(_))
        ));
        assert!(matches!(
            ElementTree::from_json(r#"[{"id": "x-1", "type": "marquee"}]"#),
            Err(DocumentError::Json(_))
        ));

        let duplicated = r#"[
            {"id": "text-1", "type": "text"},
            {"id": "section-2", "type": "section", "props": {"children": [
                {"id": "text-1", "type": "text"}
            ]}}
        ]"#;
        let Err(DocumentError::Integrity(issues)) = ElementTree::from_json(duplicated) else {
            panic!("duplicate ids must be rejected");
        };
        assert!(issues.iter().any(|issue| issue.contains("text-1")), "{issues:?}");

        let leaf_with_children = r#"[{"id": "text-1", "type": "text", "props": {"children": [
            {"id": "text-2", "type": "text"}
        ]}}]"#;
        assert!(matches!(
            ElementTree::from_json(leaf_with_children),
            Err(DocumentError::Integrity(_))
        ));
    }

    #[test]
    fn save_and_load_file() {
        let path = std::env::temp_dir().join(format!(
            "page_builder_document_{}.json",
            std::process::id()
        ));
        page().save_to_path(&path).unwrap();
        let loaded = ElementTree::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, page());

        assert!(matches!(
            ElementTree::load_from_path(&path),
            Err(DocumentError::Io(_))
        ));
    }
}
