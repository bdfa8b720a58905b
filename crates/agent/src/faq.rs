//! Browsable FAQ: a static tree of categories ending in canned answers.
//!
//! The tree is loaded once and shared. Each session keeps its own
//! [`FaqSelection`], a path of option indices with at most one selected
//! branch per level.
//!
//! ```toml
//! [[node]]
//! label = "Orders"
//!
//! [[node.children]]
//! label = "How long does shipping take?"
//! answer = "Orders ship within 3 business days."
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::FaqError;

/// A category (with children) or a question (with an answer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqNode {
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FaqNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl FaqNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqTree {
    #[serde(rename = "node", default)]
    roots: Vec<FaqNode>,
}

impl FaqTree {
    pub fn new(roots: Vec<FaqNode>) -> Result<Self, FaqError> {
        let tree = Self { roots };
        tree.validate()?;
        Ok(tree)
    }

    pub fn load(path: &Path) -> Result<Self, FaqError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, FaqError> {
        let tree: FaqTree = toml::from_str(text)?;
        tree.validate()?;
        Ok(tree)
    }

    pub fn roots(&self) -> &[FaqNode] {
        &self.roots
    }

    fn validate(&self) -> Result<(), FaqError> {
        fn check(node: &FaqNode) -> Result<(), FaqError> {
            let invalid = |reason: &str| FaqError::Invalid {
                label: node.label.clone(),
                reason: reason.into(),
            };
            match (node.children.is_empty(), node.answer.is_some()) {
                (true, false) => Err(invalid("needs either children or an answer")),
                (false, true) => Err(invalid("cannot have both children and an answer")),
                _ => node.children.iter().try_for_each(check),
            }
        }
        self.roots.iter().try_for_each(check)
    }
}

/// A session's path through the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaqSelection {
    path: Vec<usize>,
}

impl FaqSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Select option `index` at `level`, clearing any deeper selection.
    ///
    /// `level` may be at most the current depth: selecting at the current
    /// depth descends, selecting higher up switches branch.
    pub fn select<'t>(
        &mut self,
        tree: &'t FaqTree,
        level: usize,
        index: usize,
    ) -> Result<&'t FaqNode, FaqError> {
        if level > self.path.len() {
            return Err(FaqError::OutOfRange { level, index });
        }
        let options = Self::options_at(tree, &self.path[..level]);
        let node = options
            .get(index)
            .ok_or(FaqError::OutOfRange { level, index })?;
        self.path.truncate(level);
        self.path.push(index);
        Ok(node)
    }

    /// Select among the options currently shown.
    pub fn descend<'t>(&mut self, tree: &'t FaqTree, index: usize) -> Result<&'t FaqNode, FaqError> {
        let level = match self.current(tree) {
            Some(node) if node.is_leaf() => self.path.len() - 1,
            _ => self.path.len(),
        };
        self.select(tree, level, index)
    }

    /// Options to show next: children of the selected node, or siblings when
    /// a question is selected.
    pub fn options<'t>(&self, tree: &'t FaqTree) -> &'t [FaqNode] {
        match self.current(tree) {
            Some(node) if !node.is_leaf() => &node.children,
            Some(_) => Self::options_at(tree, &self.path[..self.path.len() - 1]),
            None => tree.roots(),
        }
    }

    /// The deepest selected node.
    pub fn current<'t>(&self, tree: &'t FaqTree) -> Option<&'t FaqNode> {
        let mut options = tree.roots();
        let mut node = None;
        for &i in &self.path {
            let next = options.get(i)?;
            options = &next.children;
            node = Some(next);
        }
        node
    }

    /// Answer of the selected question, if a question is selected.
    pub fn answer<'t>(&self, tree: &'t FaqTree) -> Option<&'t str> {
        self.current(tree).and_then(|n| n.answer.as_deref())
    }

    /// Labels along the selected path.
    pub fn breadcrumb(&self, tree: &FaqTree) -> Vec<String> {
        let mut options = tree.roots();
        let mut labels = Vec::new();
        for &i in &self.path {
            let Some(node) = options.get(i) else { break };
            labels.push(node.label.clone());
            options = &node.children;
        }
        labels
    }

    /// Go up one level.
    pub fn back(&mut self) {
        self.path.pop();
    }

    pub fn clear(&mut self) {
        self.path.clear();
    }

    fn options_at<'t>(tree: &'t FaqTree, prefix: &[usize]) -> &'t [FaqNode] {
        let mut options = tree.roots();
        for &i in prefix {
            match options.get(i) {
                Some(node) => options = &node.children,
                None => return &[],
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[node]]
label = "Orders"

[[node.children]]
label = "Shipping"

[[node.children.children]]
label = "How long does shipping take?"
answer = "Orders ship within 3 business days."

[[node.children.children]]
label = "Do you ship abroad?"
answer = "We ship to 20 countries."

[[node.children]]
label = "Can I cancel an order?"
answer = "Yes, before it ships."

[[node]]
label = "Account"

[[node.children]]
label = "How do I reset my password?"
answer = "Use the link on the login page."
"#;

    fn tree() -> FaqTree {
        FaqTree::parse(SAMPLE).unwrap()
    }

    #[test]
    fn parses_nested_tree() {
        let tree = tree();
        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.roots()[0].children.len(), 2);
        assert_eq!(tree.roots()[0].children[0].children.len(), 2);
    }

    #[test]
    fn rejects_node_without_answer_or_children() {
        let err = FaqTree::parse("[[node]]\nlabel = \"Empty\"\n").unwrap_err();
        assert!(matches!(err, FaqError::Invalid { .. }));
    }

    #[test]
    fn rejects_node_with_both() {
        let node = FaqNode {
            label: "Both".into(),
            children: vec![FaqNode {
                label: "child".into(),
                children: vec![],
                answer: Some("a".into()),
            }],
            answer: Some("b".into()),
        };
        assert!(FaqTree::new(vec![node]).is_err());
    }

    #[test]
    fn walk_down_to_an_answer() {
        let tree = tree();
        let mut sel = FaqSelection::new();
        assert_eq!(sel.options(&tree).len(), 2);

        sel.descend(&tree, 0).unwrap();
        sel.descend(&tree, 0).unwrap();
        let node = sel.descend(&tree, 1).unwrap();
        assert_eq!(node.label, "Do you ship abroad?");
        assert_eq!(sel.answer(&tree), Some("We ship to 20 countries."));
        assert_eq!(sel.path(), &[0, 0, 1]);
        assert_eq!(
            sel.breadcrumb(&tree),
            vec!["Orders", "Shipping", "Do you ship abroad?"]
        );
    }

    #[test]
    fn selecting_higher_level_clears_deeper() {
        let tree = tree();
        let mut sel = FaqSelection::new();
        sel.select(&tree, 0, 0).unwrap();
        sel.select(&tree, 1, 0).unwrap();
        sel.select(&tree, 2, 0).unwrap();

        sel.select(&tree, 0, 1).unwrap();
        assert_eq!(sel.path(), &[1]);
        assert_eq!(sel.answer(&tree), None);
        assert_eq!(sel.options(&tree)[0].label, "How do I reset my password?");
    }

    #[test]
    fn sibling_question_replaces_selected_question() {
        let tree = tree();
        let mut sel = FaqSelection::new();
        sel.descend(&tree, 1).unwrap();
        sel.descend(&tree, 0).unwrap();
        assert!(sel.answer(&tree).is_some());
        assert_eq!(sel.options(&tree).len(), 1);

        // At a leaf, descend picks among siblings.
        sel.descend(&tree, 0).unwrap();
        assert_eq!(sel.path(), &[1, 0]);
    }

    #[test]
    fn out_of_range_leaves_selection_unchanged() {
        let tree = tree();
        let mut sel = FaqSelection::new();
        sel.select(&tree, 0, 0).unwrap();
        assert!(matches!(
            sel.select(&tree, 1, 9),
            Err(FaqError::OutOfRange { level: 1, index: 9 })
        ));
        assert!(sel.select(&tree, 3, 0).is_err());
        assert_eq!(sel.path(), &[0]);
    }

    #[test]
    fn back_and_clear() {
        let tree = tree();
        let mut sel = FaqSelection::new();
        sel.descend(&tree, 0).unwrap();
        sel.descend(&tree, 1).unwrap();
        sel.back();
        assert_eq!(sel.path(), &[0]);
        sel.clear();
        assert!(sel.current(&tree).is_none());
    }
}
