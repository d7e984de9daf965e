//! The committed type lattice.
//!
//! A lattice is built once from merged type declarations and is immutable
//! afterwards. Type codes are assigned in depth-first preorder, which
//! makes every subtree a contiguous code range: `is_subtype` is two
//! comparisons and enumerating a type with all its subtypes is a range
//! scan. This numbering is what the composite index views iterate over.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::CoreError;
use crate::types::TypeCode;

/// One type declaration: a name and its parent (`None` for the root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub parent: Option<String>,
}

impl TypeDecl {
    /// Declare the root type.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Declare a subtype of `parent`.
    pub fn new(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
        }
    }
}

/// The committed, immutable type system.
///
/// Building the lattice is the expensive "type system materialization"
/// step; holders share it via `Arc`.
#[derive(Debug)]
pub struct TypeLattice {
    /// Type names, indexed by code.
    names: Vec<String>,
    /// Parent code per type; the root has none.
    parents: Vec<Option<TypeCode>>,
    /// One past the last code of each type's subtree. With preorder
    /// numbering, type `t`'s subtree is exactly `t.0 .. subtree_end[t.0]`.
    subtree_end: Vec<u32>,
    /// Name -> code lookup.
    by_name: HashMap<String, TypeCode>,
}

impl TypeLattice {
    /// Build a lattice from declarations.
    ///
    /// Identical re-declarations collapse; a name declared twice with
    /// different parents, a missing or duplicate root, an unknown parent,
    /// or a declaration unreachable from the root are errors.
    pub fn build(decls: &[TypeDecl]) -> Result<Self, CoreError> {
        let mut parent_of: HashMap<&str, Option<&str>> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for decl in decls {
            let parent = decl.parent.as_deref();
            match parent_of.get(decl.name.as_str()) {
                None => {
                    parent_of.insert(&decl.name, parent);
                    order.push(&decl.name);
                }
                Some(existing) if *existing == parent => {}
                Some(existing) => {
                    return Err(CoreError::ConflictingParents {
                        name: decl.name.clone(),
                        first: existing.map(String::from),
                        second: parent.map(String::from),
                    });
                }
            }
        }

        let mut root: Option<&str> = None;
        for &name in &order {
            if parent_of[name].is_none() {
                match root {
                    None => root = Some(name),
                    Some(first) => {
                        return Err(CoreError::MultipleRoots {
                            first: first.to_string(),
                            second: name.to_string(),
                        });
                    }
                }
            }
        }
        let root = root.ok_or(CoreError::NoRoot)?;

        // Children in declaration order, so code assignment is stable
        // across rebuilds from the same metadata.
        let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
        for &name in &order {
            if let Some(parent) = parent_of[name] {
                if !parent_of.contains_key(parent) {
                    return Err(CoreError::UnknownParent {
                        name: name.to_string(),
                        parent: parent.to_string(),
                    });
                }
                children.entry(parent).or_default().push(name);
            }
        }

        let mut lattice = TypeLattice {
            names: Vec::with_capacity(order.len()),
            parents: Vec::with_capacity(order.len()),
            subtree_end: vec![0; order.len()],
            by_name: HashMap::with_capacity(order.len()),
        };
        lattice.assign(root, None, &children);

        if lattice.names.len() < order.len() {
            let missing = order
                .iter()
                .find(|n| !lattice.by_name.contains_key(**n))
                .expect("some declaration was not assigned a code");
            return Err(CoreError::UnreachableType(missing.to_string()));
        }
        Ok(lattice)
    }

    /// Preorder code assignment; fills `subtree_end` on the way back up.
    fn assign(&mut self, name: &str, parent: Option<TypeCode>, children: &HashMap<&str, Vec<&str>>) {
        let code = TypeCode(self.names.len() as u32);
        self.names.push(name.to_string());
        self.parents.push(parent);
        self.by_name.insert(name.to_string(), code);
        if let Some(kids) = children.get(name) {
            for &kid in kids {
                self.assign(kid, Some(code), children);
            }
        }
        self.subtree_end[code.as_index()] = self.names.len() as u32;
    }

    /// Look up a type code by name.
    pub fn code_of(&self, name: &str) -> Option<TypeCode> {
        self.by_name.get(name).copied()
    }

    /// Look up a type code by name, erroring on absence.
    pub fn require(&self, name: &str) -> Result<TypeCode, CoreError> {
        self.code_of(name)
            .ok_or_else(|| CoreError::UnknownType(name.to_string()))
    }

    /// The name of a type code.
    pub fn name_of(&self, code: TypeCode) -> Option<&str> {
        self.names.get(code.as_index()).map(String::as_str)
    }

    /// The parent of a type, `None` for the root.
    pub fn parent_of(&self, code: TypeCode) -> Option<TypeCode> {
        self.parents.get(code.as_index()).copied().flatten()
    }

    /// Number of types in the lattice.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the lattice is empty (it never is once built).
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether `sub` is `ancestor` itself or one of its descendants.
    pub fn is_subtype(&self, sub: TypeCode, ancestor: TypeCode) -> bool {
        let a = ancestor.as_raw();
        match self.subtree_end.get(ancestor.as_index()) {
            Some(&end) => sub.as_raw() >= a && sub.as_raw() < end,
            None => false,
        }
    }

    /// `t` followed by all its descendants, in code order.
    pub fn subtree(&self, t: TypeCode) -> impl Iterator<Item = TypeCode> + '_ {
        let end = self
            .subtree_end
            .get(t.as_index())
            .copied()
            .unwrap_or(t.as_raw());
        (t.as_raw()..end).map(TypeCode)
    }
}
