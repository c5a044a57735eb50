//! Dialogue path — the append-only record of statements — and the
//! tree view derived from it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{Statement, StatementId};

/// Error when an append would break the path invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path already has a root claim")]
    RootExists,

    #[error("path has no root claim yet")]
    MissingRoot,

    #[error("root claim {0} cannot have a parent")]
    RootHasParent(StatementId),

    #[error("statement {0} has no parent")]
    Orphan(StatementId),

    #[error("parent {parent} of statement {id} is not on the path")]
    UnknownParent {
        id: StatementId,
        parent: StatementId,
    },

    #[error("statement {0} is already on the path")]
    Duplicate(StatementId),
}

/// Ordered statements; index 0 is the root claim.
///
/// Every non-root statement's parent is already present when it is appended,
/// and nothing is ever removed or replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialoguePath {
    statements: Vec<Statement>,
}

impl DialoguePath {
    /// Start a path from its root claim.
    pub fn with_root(root: Statement) -> Result<Self, PathError> {
        let mut path = Self::default();
        path.push_root(root)?;
        Ok(path)
    }

    fn push_root(&mut self, root: Statement) -> Result<(), PathError> {
        if !self.statements.is_empty() {
            return Err(PathError::RootExists);
        }
        if root.parent_id.is_some() {
            return Err(PathError::RootHasParent(root.id));
        }
        self.statements.push(root);
        Ok(())
    }

    /// Check that `batch` could be appended in order without breaking
    /// any invariant. Nothing is modified.
    pub fn check_append(&self, batch: &[Statement]) -> Result<(), PathError> {
        if self.statements.is_empty() {
            return Err(PathError::MissingRoot);
        }
        let mut pending: HashSet<StatementId> = HashSet::new();
        for stmt in batch {
            let parent = stmt.parent_id.ok_or(PathError::Orphan(stmt.id))?;
            if !self.contains(parent) && !pending.contains(&parent) {
                return Err(PathError::UnknownParent {
                    id: stmt.id,
                    parent,
                });
            }
            if self.contains(stmt.id) || !pending.insert(stmt.id) {
                return Err(PathError::Duplicate(stmt.id));
            }
        }
        Ok(())
    }

    /// Append a batch of statements atomically: either all go in or none do.
    pub fn extend(&mut self, batch: Vec<Statement>) -> Result<(), PathError> {
        self.check_append(&batch)?;
        self.statements.extend(batch);
        Ok(())
    }

    /// Append a single statement.
    pub fn push(&mut self, stmt: Statement) -> Result<(), PathError> {
        self.extend(vec![stmt])
    }

    pub fn root(&self) -> Option<&Statement> {
        self.statements.first()
    }

    pub fn get(&self, id: StatementId) -> Option<&Statement> {
        self.statements.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: StatementId) -> bool {
        self.statements.iter().any(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Build the read-only tree view.
    pub fn tree(&self) -> TreeIndex<'_> {
        TreeIndex::build(self)
    }
}

/// Parent → children view over a [`DialoguePath`], built on demand.
pub struct TreeIndex<'a> {
    path: &'a DialoguePath,
    children: HashMap<StatementId, Vec<usize>>,
}

impl<'a> TreeIndex<'a> {
    pub fn build(path: &'a DialoguePath) -> Self {
        let mut children: HashMap<StatementId, Vec<usize>> = HashMap::new();
        for (idx, stmt) in path.statements.iter().enumerate() {
            if let Some(parent) = stmt.parent_id {
                children.entry(parent).or_default().push(idx);
            }
        }
        Self { path, children }
    }

    /// Direct children of `id`, in path order.
    pub fn children(&self, id: StatementId) -> Vec<&'a Statement> {
        self.children
            .get(&id)
            .map(|idxs| idxs.iter().map(|&i| &self.path.statements[i]).collect())
            .unwrap_or_default()
    }

    /// Rebuttals attached directly to `id`.
    pub fn rebuttals_to(&self, id: StatementId) -> Vec<&'a Statement> {
        self.children(id)
            .into_iter()
            .filter(|s| s.is_rebuttal)
            .collect()
    }

    /// Distance from the root; `None` if `id` is not on the path.
    pub fn depth(&self, id: StatementId) -> Option<usize> {
        let mut current = self.path.get(id)?;
        let mut depth = 0;
        while let Some(parent) = current.parent_id {
            current = self.path.get(parent)?;
            depth += 1;
        }
        Some(depth)
    }

    /// Depth-first pre-order walk from the root, yielding `(depth, statement)`.
    pub fn walk(&self) -> Vec<(usize, &'a Statement)> {
        let mut out = Vec::with_capacity(self.path.len());
        let Some(root) = self.path.root() else {
            return out;
        };
        let mut stack = vec![(0usize, root)];
        while let Some((depth, stmt)) = stack.pop() {
            out.push((depth, stmt));
            for child in self.children(stmt.id).into_iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Actor, StatementKind};

    fn stmt(id: i64, parent: Option<i64>) -> Statement {
        Statement {
            id: StatementId(id),
            text: format!("s{}", id),
            parent_id: parent.map(StatementId),
            stance: Actor::Proponent,
            kind: StatementKind::Claim,
            is_rebuttal: false,
            source: None,
        }
    }

    #[test]
    fn test_root_is_first() {
        let path = DialoguePath::with_root(stmt(1, None)).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.root().unwrap().id, StatementId(1));
    }

    #[test]
    fn test_root_must_have_no_parent() {
        assert_eq!(
            DialoguePath::with_root(stmt(1, Some(0))).unwrap_err(),
            PathError::RootHasParent(StatementId(1))
        );
    }

    #[test]
    fn test_orphan_rejected() {
        let mut path = DialoguePath::with_root(stmt(1, None)).unwrap();
        let err = path.push(stmt(2, Some(99))).unwrap_err();
        assert!(matches!(err, PathError::UnknownParent { .. }));
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_batch_is_atomic() {
        let mut path = DialoguePath::with_root(stmt(1, None)).unwrap();
        let err = path
            .extend(vec![stmt(2, Some(1)), stmt(3, Some(42))])
            .unwrap_err();
        assert!(matches!(err, PathError::UnknownParent { .. }));
        assert_eq!(path.len(), 1);
        assert!(!path.contains(StatementId(2)));
    }

    #[test]
    fn test_batch_may_reference_earlier_member() {
        let mut path = DialoguePath::with_root(stmt(1, None)).unwrap();
        path.extend(vec![stmt(2, Some(1)), stmt(3, Some(2))]).unwrap();
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut path = DialoguePath::with_root(stmt(1, None)).unwrap();
        path.push(stmt(2, Some(1))).unwrap();
        assert_eq!(
            path.push(stmt(2, Some(1))).unwrap_err(),
            PathError::Duplicate(StatementId(2))
        );
        assert_eq!(
            path.extend(vec![stmt(5, Some(1)), stmt(5, Some(1))])
                .unwrap_err(),
            PathError::Duplicate(StatementId(5))
        );
    }

    #[test]
    fn test_tree_walk_and_depth() {
        let mut path = DialoguePath::with_root(stmt(1, None)).unwrap();
        path.push(stmt(2, Some(1))).unwrap();
        path.push(stmt(3, Some(1))).unwrap();
        path.push(stmt(4, Some(2))).unwrap();

        let mut rebuttal = stmt(5, Some(3));
        rebuttal.is_rebuttal = true;
        path.push(rebuttal).unwrap();

        let tree = path.tree();
        let order: Vec<(usize, i64)> = tree.walk().iter().map(|(d, s)| (*d, s.id.0)).collect();
        assert_eq!(order, vec![(0, 1), (1, 2), (2, 4), (1, 3), (2, 5)]);
        assert_eq!(tree.depth(StatementId(4)), Some(2));
        assert_eq!(tree.depth(StatementId(99)), None);
        assert_eq!(tree.rebuttals_to(StatementId(3)).len(), 1);
        assert!(tree.rebuttals_to(StatementId(2)).is_empty());
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut path = DialoguePath::with_root(stmt(1, None)).unwrap();
        path.push(stmt(2, Some(1))).unwrap();

        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);

        let restored: DialoguePath = serde_json::from_value(json).unwrap();
        assert!(restored.contains(StatementId(2)));
    }
}
