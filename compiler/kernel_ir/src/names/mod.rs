//! Canonical names and references.
//!
//! A [`CanonicalName`] is a node in a tree of name segments rooted at
//! [`CanonicalNames::root`]; the path from the root identifies a
//! declaration across components. A [`Reference`] is the indirection that
//! tree nodes hold instead of pointing at each other directly. At most one
//! reference is bound to a name and vice versa.
//!
//! Both live in per-component tables owned by [`CanonicalNames`], so there
//! is no global registry and two components never share identity state.

use std::fmt;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::NamedNodeId;

/// Index of a name in [`CanonicalNames`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct CanonicalName(u32);

impl CanonicalName {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalName({})", self.0)
    }
}

/// Index of a reference in [`CanonicalNames`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Reference(u32);

impl Reference {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", self.0)
    }
}

/// Violation of the one-to-one binding between names and references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("canonical name `{name}` is already bound to another reference")]
    NameAlreadyBound { name: String },
    #[error("reference is already bound to `{bound}`, cannot bind it to `{name}`")]
    ReferenceAlreadyBound { name: String, bound: String },
    #[error("the root canonical name cannot be bound")]
    RootNotBindable,
    #[error("{what} has no canonical name; name the enclosing declaration first")]
    UnnamedOwner { what: &'static str },
}

#[derive(Clone)]
struct NameEntry {
    parent: Option<CanonicalName>,
    text: String,
    children: FxHashMap<String, CanonicalName>,
    reference: Option<Reference>,
}

#[derive(Clone, Default)]
struct ReferenceEntry {
    name: Option<CanonicalName>,
    node: Option<NamedNodeId>,
}

/// Name tree and reference table of one component.
#[derive(Clone)]
pub struct CanonicalNames {
    names: Vec<NameEntry>,
    references: Vec<ReferenceEntry>,
}

impl CanonicalNames {
    pub fn new() -> Self {
        CanonicalNames {
            names: vec![NameEntry {
                parent: None,
                text: String::new(),
                children: FxHashMap::default(),
                reference: None,
            }],
            references: Vec::new(),
        }
    }

    #[inline]
    pub const fn root(&self) -> CanonicalName {
        CanonicalName(0)
    }

    #[inline]
    pub fn is_root(&self, name: CanonicalName) -> bool {
        name.0 == 0
    }

    /// Child of `parent` with segment `text`, created if it does not exist.
    ///
    /// # Panics
    /// Panics if the table would hold more than `u32::MAX` names.
    pub fn get_child(&mut self, parent: CanonicalName, text: &str) -> CanonicalName {
        if let Some(&child) = self.names[parent.index()].children.get(text) {
            return child;
        }
        let child = CanonicalName(to_u32(self.names.len(), "canonical names"));
        self.names.push(NameEntry {
            parent: Some(parent),
            text: text.to_owned(),
            children: FxHashMap::default(),
            reference: None,
        });
        self.names[parent.index()]
            .children
            .insert(text.to_owned(), child);
        child
    }

    /// Descend through `path`, creating missing segments.
    pub fn get_path<'s>(
        &mut self,
        parent: CanonicalName,
        path: impl IntoIterator<Item = &'s str>,
    ) -> CanonicalName {
        path.into_iter()
            .fold(parent, |name, segment| self.get_child(name, segment))
    }

    /// Child lookup without creation.
    pub fn child(&self, parent: CanonicalName, text: &str) -> Option<CanonicalName> {
        self.names[parent.index()].children.get(text).copied()
    }

    /// Detach `text` from `parent`. The detached subtree keeps its bindings
    /// but can no longer be reached by path.
    pub fn remove_child(&mut self, parent: CanonicalName, text: &str) -> Option<CanonicalName> {
        let removed = self.names[parent.index()].children.remove(text)?;
        self.names[removed.index()].parent = None;
        Some(removed)
    }

    pub fn children(&self, name: CanonicalName) -> impl Iterator<Item = CanonicalName> + '_ {
        self.names[name.index()].children.values().copied()
    }

    #[inline]
    pub fn parent(&self, name: CanonicalName) -> Option<CanonicalName> {
        self.names[name.index()].parent
    }

    #[inline]
    pub fn text(&self, name: CanonicalName) -> &str {
        &self.names[name.index()].text
    }

    /// Number of names, including the root.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.len() <= 1
    }

    /// A fresh, unbound reference.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` references would exist.
    pub fn new_reference(&mut self) -> Reference {
        let reference = Reference(to_u32(self.references.len(), "references"));
        self.references.push(ReferenceEntry::default());
        reference
    }

    /// Reference bound to `name`, created and bound on first use.
    ///
    /// # Panics
    /// Panics under the same capacity limit as [`Self::new_reference`].
    pub fn reference_for(&mut self, name: CanonicalName) -> Reference {
        if let Some(reference) = self.names[name.index()].reference {
            return reference;
        }
        let reference = self.new_reference();
        self.names[name.index()].reference = Some(reference);
        self.references[reference.index()].name = Some(name);
        reference
    }

    #[inline]
    pub fn reference_of(&self, name: CanonicalName) -> Option<Reference> {
        self.names[name.index()].reference
    }

    /// Bind `name` and `reference` to each other.
    ///
    /// Binding an already-bound pair again is a no-op; binding either side
    /// to something else fails and leaves both untouched.
    pub fn bind_to(&mut self, name: CanonicalName, reference: Reference) -> Result<(), IdentityError> {
        if self.is_root(name) {
            return Err(IdentityError::RootNotBindable);
        }
        let current = self.names[name.index()].reference;
        let bound = self.references[reference.index()].name;
        match (current, bound) {
            (Some(r), Some(n)) if r == reference && n == name => Ok(()),
            (Some(_), _) => Err(IdentityError::NameAlreadyBound {
                name: self.display(name).to_string(),
            }),
            (None, Some(other)) => Err(IdentityError::ReferenceAlreadyBound {
                name: self.display(name).to_string(),
                bound: self.display(other).to_string(),
            }),
            (None, None) => {
                self.names[name.index()].reference = Some(reference);
                self.references[reference.index()].name = Some(name);
                Ok(())
            }
        }
    }

    /// Clear the binding of `name`, if any, on both sides.
    pub fn unbind(&mut self, name: CanonicalName) {
        if let Some(reference) = self.names[name.index()].reference.take() {
            self.references[reference.index()].name = None;
        }
    }

    #[inline]
    pub fn canonical_name(&self, reference: Reference) -> Option<CanonicalName> {
        self.references[reference.index()].name
    }

    /// Declaration a reference resolves to.
    #[inline]
    pub fn node(&self, reference: Reference) -> Option<NamedNodeId> {
        self.references[reference.index()].node
    }

    pub fn set_node(&mut self, reference: Reference, node: NamedNodeId) {
        self.references[reference.index()].node = Some(node);
    }

    /// Path of `name` from the root, one segment per item.
    pub fn path(&self, name: CanonicalName) -> Vec<&str> {
        let mut segments = Vec::new();
        let mut current = Some(name);
        while let Some(n) = current {
            if self.is_root(n) {
                break;
            }
            segments.push(self.text(n));
            current = self.parent(n);
        }
        segments.reverse();
        segments
    }

    pub fn display(&self, name: CanonicalName) -> DisplayName<'_> {
        DisplayName { names: self, name }
    }
}

impl Default for CanonicalNames {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CanonicalNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalNames")
            .field("names", &self.names.len())
            .field("references", &self.references.len())
            .finish()
    }
}

/// Dotted-path rendering of a canonical name; the root prints as `<root>`.
pub struct DisplayName<'n> {
    names: &'n CanonicalNames,
    name: CanonicalName,
}

impl fmt::Display for DisplayName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.names.is_root(self.name) {
            return f.write_str("<root>");
        }
        for (i, segment) in self.names.path(self.name).into_iter().enumerate() {
            if i > 0 {
                f.write_str("::")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u32::MAX"))
}

#[cfg(test)]
mod tests;
