//! The component: root of a compilation unit.
//!
//! A component owns its [`Tree`], its [`CanonicalNames`], the source table,
//! and the ordered list of libraries. The `add_*` builders allocate a
//! declaration, derive its canonical name from its owner, and bind the two.

use rustc_hash::FxHashMap;

use crate::{
    CanonicalName, CanonicalNames, Class, ClassId, CompiledMode, Constructor, ConstructorId,
    DartType, Field, FieldId, FunctionId, IdentityError, KernelVersion, Library, LibraryId,
    MemberOwner, Name, NamedNodeId, Procedure, ProcedureId, ProcedureKind, Reference, Source,
    Tree, TreeError, TreeNodeId, Uri,
};

#[derive(Clone, Debug)]
pub struct Component {
    pub tree: Tree,
    pub names: CanonicalNames,
    libraries: Vec<LibraryId>,
    /// Source table keyed by file URI.
    pub sources: FxHashMap<Uri, Source>,
    pub main_method: Option<Reference>,
    pub version: KernelVersion,
    pub compiled_mode: CompiledMode,
}

impl Component {
    pub fn new() -> Self {
        Self::with_version(KernelVersion::LATEST)
    }

    pub fn with_version(version: KernelVersion) -> Self {
        Component {
            tree: Tree::new(),
            names: CanonicalNames::new(),
            libraries: Vec::new(),
            sources: FxHashMap::default(),
            main_method: None,
            version,
            compiled_mode: CompiledMode::default(),
        }
    }

    #[inline]
    pub fn libraries(&self) -> &[LibraryId] {
        &self.libraries
    }

    /// Append an already allocated library.
    pub fn push_library(&mut self, library: LibraryId) {
        self.tree
            .set_parent(TreeNodeId::Library(library), Some(TreeNodeId::Component));
        self.libraries.push(library);
    }

    /// Declare a library named by its import URI.
    pub fn add_library(&mut self, import_uri: &Uri) -> Result<LibraryId, IdentityError> {
        let root = self.names.root();
        let name = self.names.get_child(root, import_uri.as_str());
        let reference = self.claim(name)?;
        let library = self
            .tree
            .alloc(Library::new(reference, self.version.language));
        self.names.set_node(reference, library.into());
        self.push_library(library);
        Ok(library)
    }

    pub fn add_class(&mut self, library: LibraryId, name: &str) -> Result<ClassId, IdentityError> {
        let library_name = self.owner_name(library.into(), "library")?;
        let class_name = self.names.get_child(library_name, name);
        let reference = self.claim(class_name)?;
        let class = self.tree.alloc(Class::new(reference, name));
        self.names.set_node(reference, class.into());
        self.tree.edit(library, |node| node.classes.push(class));
        Ok(class)
    }

    pub fn add_field(
        &mut self,
        owner: MemberOwner,
        mut name: Name,
        ty: DartType,
    ) -> Result<FieldId, IdentityError> {
        let canonical = self.member_name(owner, "@fields", &mut name)?;
        let reference = self.claim(canonical)?;
        let field = self.tree.alloc(Field::new(reference, name, ty));
        self.names.set_node(reference, field.into());
        match owner {
            MemberOwner::Library(id) => self.tree.edit(id, |node| node.fields.push(field)),
            MemberOwner::Class(id) => self.tree.edit(id, |node| node.fields.push(field)),
        }
        Ok(field)
    }

    pub fn add_procedure(
        &mut self,
        owner: MemberOwner,
        kind: ProcedureKind,
        mut name: Name,
        function: Option<FunctionId>,
    ) -> Result<ProcedureId, IdentityError> {
        let canonical = self.member_name(owner, kind.name_segment(), &mut name)?;
        let reference = self.claim(canonical)?;
        let procedure = self
            .tree
            .alloc(Procedure::new(reference, kind, name, function));
        self.names.set_node(reference, procedure.into());
        match owner {
            MemberOwner::Library(id) => self.tree.edit(id, |node| node.procedures.push(procedure)),
            MemberOwner::Class(id) => self.tree.edit(id, |node| node.procedures.push(procedure)),
        }
        Ok(procedure)
    }

    pub fn add_constructor(
        &mut self,
        class: ClassId,
        mut name: Name,
        function: FunctionId,
    ) -> Result<ConstructorId, IdentityError> {
        let canonical = self.member_name(class.into(), "@constructors", &mut name)?;
        let reference = self.claim(canonical)?;
        let constructor = self
            .tree
            .alloc(Constructor::new(reference, name, function));
        self.names.set_node(reference, constructor.into());
        self.tree
            .edit(class, |node| node.constructors.push(constructor));
        Ok(constructor)
    }

    /// Reference to a declaration that may live in another component, by
    /// canonical path. Binds a fresh reference on first use.
    pub fn reference_to(&mut self, path: &[&str]) -> Reference {
        let root = self.names.root();
        let name = self.names.get_path(root, path.iter().copied());
        self.names.reference_for(name)
    }

    /// Move `node` to canonical name `name`, or strip its name with `None`.
    ///
    /// Fails without changing anything if `name` is bound to another
    /// reference.
    pub fn rename(
        &mut self,
        node: NamedNodeId,
        name: Option<CanonicalName>,
    ) -> Result<(), IdentityError> {
        let reference = self.reference_of(node);
        if let Some(new) = name {
            if self.names.is_root(new) {
                return Err(IdentityError::RootNotBindable);
            }
            if self
                .names
                .reference_of(new)
                .is_some_and(|bound| bound != reference)
            {
                return Err(IdentityError::NameAlreadyBound {
                    name: self.names.display(new).to_string(),
                });
            }
        }
        if let Some(old) = self.names.canonical_name(reference) {
            self.names.unbind(old);
        }
        if let Some(new) = name {
            self.names.bind_to(new, reference)?;
        }
        Ok(())
    }

    pub fn reference_of(&self, node: NamedNodeId) -> Reference {
        match node {
            NamedNodeId::Library(id) => self.tree.get(id).reference,
            NamedNodeId::Class(id) => self.tree.get(id).reference,
            NamedNodeId::Field(id) => self.tree.get(id).reference,
            NamedNodeId::Procedure(id) => self.tree.get(id).reference,
            NamedNodeId::Constructor(id) => self.tree.get(id).reference,
        }
    }

    #[inline]
    pub fn canonical_name_of(&self, node: NamedNodeId) -> Option<CanonicalName> {
        self.names.canonical_name(self.reference_of(node))
    }

    /// Declaration a reference points to, if it is part of this component.
    #[inline]
    pub fn resolve(&self, reference: Reference) -> Option<NamedNodeId> {
        self.names.node(reference)
    }

    /// Import URI of a library, taken from its canonical name.
    pub fn library_uri(&self, library: LibraryId) -> Option<&str> {
        self.canonical_name_of(library.into())
            .map(|name| self.names.text(name))
    }

    pub fn set_main_method(&mut self, procedure: ProcedureId) {
        self.main_method = Some(self.tree.get(procedure).reference);
    }

    pub fn main_procedure(&self) -> Option<ProcedureId> {
        match self.main_method.and_then(|r| self.resolve(r)) {
            Some(NamedNodeId::Procedure(id)) => Some(id),
            _ => None,
        }
    }

    pub fn add_source(&mut self, file_uri: Uri, source: Source) {
        self.sources.insert(file_uri, source);
    }

    /// Verify parent pointers from the libraries down.
    pub fn check_parents(&self) -> Result<(), TreeError> {
        for &library in &self.libraries {
            let parent = self.tree.parent(library);
            if parent != Some(TreeNodeId::Component) {
                return Err(TreeError::StaleParent {
                    child: library.into(),
                    owner: TreeNodeId::Component,
                    parent,
                });
            }
        }
        let roots: Vec<TreeNodeId> = self.libraries.iter().map(|&l| l.into()).collect();
        self.tree.check_parents(&roots)
    }

    /// Reference for a new declaration at `name`. A forward reference made
    /// through [`Component::reference_to`] is adopted; a name that already
    /// resolves to a declaration is rejected.
    fn claim(&mut self, name: CanonicalName) -> Result<Reference, IdentityError> {
        match self.names.reference_of(name) {
            Some(reference) if self.names.node(reference).is_none() => Ok(reference),
            Some(_) => Err(IdentityError::NameAlreadyBound {
                name: self.names.display(name).to_string(),
            }),
            None => {
                let reference = self.names.new_reference();
                self.names.bind_to(name, reference)?;
                Ok(reference)
            }
        }
    }

    fn owner_name(
        &self,
        owner: NamedNodeId,
        what: &'static str,
    ) -> Result<CanonicalName, IdentityError> {
        self.canonical_name_of(owner)
            .ok_or(IdentityError::UnnamedOwner { what })
    }

    fn enclosing_library(&self, owner: MemberOwner) -> Result<LibraryId, IdentityError> {
        match owner {
            MemberOwner::Library(id) => Ok(id),
            MemberOwner::Class(id) => match self.tree.parent(id) {
                Some(TreeNodeId::Library(library)) => Ok(library),
                _ => Err(IdentityError::UnnamedOwner {
                    what: "class outside a library",
                }),
            },
        }
    }

    /// `owner/segment/name`, with the library URI inserted before the text
    /// of private names. A private name without a library gets the
    /// enclosing one.
    fn member_name(
        &mut self,
        owner: MemberOwner,
        segment: &str,
        name: &mut Name,
    ) -> Result<CanonicalName, IdentityError> {
        let owner_name = match owner {
            MemberOwner::Library(id) => self.owner_name(id.into(), "library")?,
            MemberOwner::Class(id) => self.owner_name(id.into(), "class")?,
        };
        let mut parent = self.names.get_child(owner_name, segment);
        if name.is_private() {
            let library = match name.library {
                Some(reference) => reference,
                None => {
                    let library = self.enclosing_library(owner)?;
                    let reference = self.tree.get(library).reference;
                    name.library = Some(reference);
                    reference
                }
            };
            let library_name = self
                .names
                .canonical_name(library)
                .ok_or(IdentityError::UnnamedOwner {
                    what: "library of a private name",
                })?;
            let uri = self.names.text(library_name).to_owned();
            parent = self.names.get_child(parent, &uri);
        }
        Ok(self.names.get_child(parent, &name.text))
    }
}

impl Default for Component {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
