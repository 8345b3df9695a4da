//! Concrete syntax trees parsed using Tree-sitter.
//!
//! The rest of the crate never talks to Tree-sitter directly, except to walk
//! the [`Node`]s handed out by a [`Cst`]. The helpers in this module hide the
//! two Tree-sitter details that matter for Go: comments are named extras
//! that can show up among the children of any node, and error recovery means
//! a tree is always produced even for malformed input.

use tree_sitter::{LanguageError, Node, Parser, Tree};

use crate::{source_file::SourceFile, span::Position};

/// The kind of Tree-sitter's comment extras in the Go grammar.
const COMMENT_KIND: &str = "comment";

/// Build constraints that exclude a file from every build.
const IGNORE_CONSTRAINTS: [&str; 2] = ["//go:build ignore", "// +build ignore"];

/// Constructs a new [`Parser`] for Go. Prefer using only one parser per
/// load, since it can be reused for every file in a package.
pub fn create_go_parser() -> Result<Parser, LanguageError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
    Ok(parser)
}

/// A parsed Go file together with its source.
#[derive(Debug, Clone)]
pub struct Cst {
    tree: Tree,
    file: SourceFile,
}

impl Cst {
    /// Parses `file`, returning `None` only if Tree-sitter gave up (which
    /// only happens when a timeout or cancellation flag is configured).
    pub fn parse(parser: &mut Parser, file: SourceFile) -> Option<Self> {
        let tree = parser.parse(file.contents(), None)?;
        Some(Self { tree, file })
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn file(&self) -> &SourceFile {
        &self.file
    }

    /// Returns the source text covered by `node`.
    pub fn text(&self, node: Node<'_>) -> &str {
        self.file.slice(node.byte_range())
    }

    /// Returns the position of the first error or missing node in the tree,
    /// if there is one.
    pub fn first_error(&self) -> Option<Position> {
        fn search(node: Node<'_>) -> Option<Position> {
            if node.is_error() || node.is_missing() {
                return Some(node.start_position().into());
            }

            let mut cursor = node.walk();
            let children = node.children(&mut cursor).collect::<Vec<_>>();
            children
                .into_iter()
                .filter(|child| child.has_error() || child.is_missing())
                .find_map(search)
        }

        let root = self.root();
        match root.has_error() {
            true => search(root).or(Some(root.start_position().into())),
            false => None,
        }
    }

    /// Returns the name in the `package` clause of this file.
    pub fn package_name(&self) -> Option<&str> {
        let clause = named_children(self.root())
            .into_iter()
            .find(|node| node.kind() == "package_clause")?;

        named_children(clause)
            .into_iter()
            .find(|node| node.kind() == "package_identifier")
            .map(|node| self.text(node))
    }

    /// Returns `true` if a comment before the package clause excludes this
    /// file from every build.
    pub fn is_ignored_by_constraint(&self) -> bool {
        let mut cursor = self.root().walk();
        let leading = self
            .root()
            .named_children(&mut cursor)
            .take_while(|node| node.kind() == COMMENT_KIND)
            .map(|node| self.text(node).trim())
            .collect::<Vec<_>>();

        leading
            .into_iter()
            .any(|comment| IGNORE_CONSTRAINTS.contains(&comment))
    }

    /// Returns the top-level declarations of this file, in source order.
    pub fn top_level(&self) -> Vec<Node<'_>> {
        named_children(self.root())
    }
}

/// Returns the named children of `node`, skipping comments.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != COMMENT_KIND)
        .collect()
}

/// Returns every named child of `node` stored under `field`. The grammar
/// also files the commas of a list like `A, B` under the field, so
/// anonymous children are skipped.
pub fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor)
        .filter(|child| child.is_named() && child.kind() != COMMENT_KIND)
        .collect()
}

/// Collects every descendant of `node` (including `node` itself) whose kind
/// is in `kinds`, in source order. Descent stops at matching nodes.
pub fn descendants_of_kind<'t>(
    node: Node<'t>,
    kinds: &[&str],
) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    let mut stack = vec![node];

    while let Some(next) = stack.pop() {
        if kinds.contains(&next.kind()) {
            found.push(next);
            continue;
        }

        let mut children = named_children(next);
        children.reverse();
        stack.extend(children);
    }

    found
}
