//! File tree of the ingested corpus.
//!
//! The backend returns a recursive [`FileTreeNode`] list. The store keeps it
//! as a flat arena keyed by path ([`FileTree`]) so that view state, which is
//! also keyed by path ([`TreeViewState`]), survives tree replacement.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Kind of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

/// Recursive node as returned by the `file-tree` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTreeNode {
    pub name: String,
    /// Path relative to the corpus root; the node's identity.
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileTreeNode>,
}

impl FileTreeNode {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File,
            children: Vec::new(),
        }
    }

    pub fn folder(
        name: impl Into<String>,
        path: impl Into<String>,
        children: Vec<FileTreeNode>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Folder,
            children,
        }
    }
}

/// A single arena entry. Children are stored as path keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub parent: Option<String>,
    pub children: Vec<String>,
}

/// A visible row produced by [`FileTree::visible_rows`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow<'a> {
    pub depth: usize,
    pub entry: &'a TreeEntry,
    pub expanded: bool,
    pub selected: bool,
}

/// Flat, path-keyed representation of the corpus tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    roots: Vec<String>,
    nodes: HashMap<String, TreeEntry>,
}

impl FileTree {
    /// Builds the arena from the wire representation.
    ///
    /// Sibling order is preserved. A path that was already inserted is
    /// skipped together with its subtree.
    pub fn from_nodes(nodes: Vec<FileTreeNode>) -> Self {
        let mut tree = Self::default();
        for node in nodes {
            if let Some(path) = tree.insert(node, None) {
                tree.roots.push(path);
            }
        }
        tree
    }

    fn insert(&mut self, node: FileTreeNode, parent: Option<&str>) -> Option<String> {
        if self.nodes.contains_key(&node.path) {
            tracing::warn!("[FileTree] Duplicate path skipped: {}", node.path);
            return None;
        }

        let path = node.path.clone();
        self.nodes.insert(
            path.clone(),
            TreeEntry {
                name: node.name,
                path: path.clone(),
                kind: node.kind,
                parent: parent.map(str::to_string),
                children: Vec::new(),
            },
        );

        let mut child_paths = Vec::with_capacity(node.children.len());
        for child in node.children {
            if let Some(child_path) = self.insert(child, Some(&path)) {
                child_paths.push(child_path);
            }
        }
        if let Some(entry) = self.nodes.get_mut(&path) {
            entry.children = child_paths;
        }

        Some(path)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of nodes (files and folders).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn file_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|entry| entry.kind == NodeKind::File)
            .count()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&TreeEntry> {
        self.nodes.get(path)
    }

    pub fn roots(&self) -> impl Iterator<Item = &TreeEntry> {
        self.roots.iter().filter_map(|path| self.nodes.get(path))
    }

    pub fn children(&self, path: &str) -> impl Iterator<Item = &TreeEntry> {
        self.nodes
            .get(path)
            .map(|entry| entry.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.nodes.get(child))
    }

    /// Depth-first traversal of every node, in display order.
    pub fn walk(&self) -> Vec<(usize, &TreeEntry)> {
        self.collect_rows(|_| true)
    }

    /// Rows visible under the given view state: children of a folder are
    /// listed only when the folder is expanded.
    pub fn visible_rows<'a>(&'a self, view: &TreeViewState) -> Vec<TreeRow<'a>> {
        self.collect_rows(|entry| view.is_expanded(&entry.path))
            .into_iter()
            .map(|(depth, entry)| TreeRow {
                depth,
                entry,
                expanded: view.is_expanded(&entry.path),
                selected: view.selected() == Some(entry.path.as_str()),
            })
            .collect()
    }

    /// Finds a file by its path, falling back to the first file whose name matches.
    pub fn find_file(&self, identifier: &str) -> Option<&TreeEntry> {
        let trimmed = identifier.trim_start_matches('/');
        if let Some(entry) = self.nodes.get(trimmed)
            && entry.kind == NodeKind::File
        {
            return Some(entry);
        }
        self.walk()
            .into_iter()
            .map(|(_, entry)| entry)
            .find(|entry| entry.kind == NodeKind::File && entry.name == trimmed)
    }

    fn collect_rows<F>(&self, descend: F) -> Vec<(usize, &TreeEntry)>
    where
        F: Fn(&TreeEntry) -> bool,
    {
        let mut rows = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, &str)> = self
            .roots
            .iter()
            .rev()
            .map(|path| (0, path.as_str()))
            .collect();

        while let Some((depth, path)) = stack.pop() {
            let Some(entry) = self.nodes.get(path) else {
                continue;
            };
            rows.push((depth, entry));
            if entry.kind == NodeKind::Folder && descend(entry) {
                stack.extend(
                    entry
                        .children
                        .iter()
                        .rev()
                        .map(|child| (depth + 1, child.as_str())),
                );
            }
        }

        rows
    }
}

/// Presentation-local view state of the file browser.
///
/// Keyed by path so it survives tree replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeViewState {
    expanded: BTreeSet<String>,
    selected: Option<String>,
}

impl TreeViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn expand(&mut self, path: impl Into<String>) {
        self.expanded.insert(path.into());
    }

    pub fn collapse(&mut self, path: &str) {
        self.expanded.remove(path);
    }

    /// Toggles a folder and returns its new expanded state.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.to_string());
            true
        }
    }

    pub fn expand_all(&mut self, tree: &FileTree) {
        for (_, entry) in tree.walk() {
            if entry.kind == NodeKind::Folder {
                self.expanded.insert(entry.path.clone());
            }
        }
    }

    pub fn select(&mut self, path: impl Into<String>) {
        self.selected = Some(path.into());
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Drops state for paths that no longer exist in `tree`.
    pub fn retain_known(&mut self, tree: &FileTree) {
        self.expanded.retain(|path| tree.contains(path));
        if self
            .selected
            .as_deref()
            .is_some_and(|path| !tree.contains(path))
        {
            self.selected = None;
        }
    }
}
