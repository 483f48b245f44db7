//! Node arenas with parent tracking.
//!
//! Every node kind is stored in its own [`Arena`], addressed by a typed id.
//! Ownership edges are the ids a node stores in its child slots; the arena
//! keeps a parallel `parents` column so every node can answer "who owns
//! me" in O(1).
//!
//! Parents are maintained by the only two ways a slot can change:
//! [`Tree::alloc`] attaches every child of the new node, and [`Tree::edit`]
//! diffs the children before and after a mutation, clearing the parent of
//! removed children and setting it for added ones.

use std::fmt;
use std::marker::PhantomData;

use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    Catch, Class, ClassId, Constructor, ConstructorId, ExprId, ExprKind, Expression, Field,
    FieldId, FunctionId, FunctionNode, Initializer, InitializerId, InitializerKind, Library,
    LibraryId, Procedure, ProcedureId, Statement, StmtId, StmtKind, TreeNodeId, TypeParameter,
    TypeParameterId, VariableDeclaration, VariableId,
};

/// Child ids of one node, in slot order.
pub type Children = SmallVec<[TreeNodeId; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("statement {0:?} is not a block")]
    NotABlock(StmtId),
    #[error("{child:?} is owned by {owner:?} but its parent is {parent:?}")]
    StaleParent {
        child: TreeNodeId,
        owner: TreeNodeId,
        parent: Option<TreeNodeId>,
    },
}

/// A node payload stored in a [`Tree`].
pub trait TreeNode: Sized {
    type Id: TreeIndex<Node = Self>;

    /// Push the id of every owned child, in slot order.
    fn collect_children(&self, out: &mut Children);
}

/// A typed id that addresses one of the [`Tree`] arenas.
pub trait TreeIndex: Copy + Eq + Into<TreeNodeId> {
    type Node: TreeNode;

    fn from_slot(slot: u32) -> Self;
    fn slot(self) -> usize;
    fn arena(tree: &Tree) -> &Arena<Self, Self::Node>;
    fn arena_mut(tree: &mut Tree) -> &mut Arena<Self, Self::Node>;
}

/// Storage for one node kind plus the parent of each node.
pub struct Arena<I, T> {
    nodes: Vec<T>,
    parents: Vec<Option<TreeNodeId>>,
    marker: PhantomData<fn() -> I>,
}

impl<I: TreeIndex, T> Arena<I, T> {
    fn new() -> Self {
        Arena {
            nodes: Vec::new(),
            parents: Vec::new(),
            marker: PhantomData,
        }
    }

    fn push(&mut self, node: T) -> I {
        let id = I::from_slot(to_u32(self.nodes.len(), "tree nodes"));
        self.nodes.push(node);
        self.parents.push(None);
        id
    }

    #[inline]
    fn get(&self, id: I) -> &T {
        &self.nodes[id.slot()]
    }

    #[inline]
    fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.nodes[id.slot()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (I::from_slot(i as u32), node))
    }
}

impl<I, T: Clone> Clone for Arena<I, T> {
    fn clone(&self) -> Self {
        Arena {
            nodes: self.nodes.clone(),
            parents: self.parents.clone(),
            marker: PhantomData,
        }
    }
}

/// All nodes of a component.
#[derive(Clone)]
pub struct Tree {
    libraries: Arena<LibraryId, Library>,
    classes: Arena<ClassId, Class>,
    fields: Arena<FieldId, Field>,
    procedures: Arena<ProcedureId, Procedure>,
    constructors: Arena<ConstructorId, Constructor>,
    initializers: Arena<InitializerId, Initializer>,
    functions: Arena<FunctionId, FunctionNode>,
    exprs: Arena<ExprId, Expression>,
    stmts: Arena<StmtId, Statement>,
    variables: Arena<VariableId, VariableDeclaration>,
    type_parameters: Arena<TypeParameterId, TypeParameter>,
}

impl Tree {
    pub fn new() -> Self {
        Tree {
            libraries: Arena::new(),
            classes: Arena::new(),
            fields: Arena::new(),
            procedures: Arena::new(),
            constructors: Arena::new(),
            initializers: Arena::new(),
            functions: Arena::new(),
            exprs: Arena::new(),
            stmts: Arena::new(),
            variables: Arena::new(),
            type_parameters: Arena::new(),
        }
    }

    /// Store `node` and become the parent of each of its children.
    ///
    /// A child that already has a parent is moved: its parent pointer now
    /// names the new node. Its old owner must drop it through [`Tree::edit`];
    /// [`Tree::check_parents`] reports owners that did not.
    ///
    /// # Panics
    /// Panics if the arena for this node kind would hold more than `u32::MAX`
    /// nodes.
    pub fn alloc<N: TreeNode>(&mut self, node: N) -> N::Id {
        let mut children = Children::new();
        node.collect_children(&mut children);
        let id = <N::Id as TreeIndex>::arena_mut(self).push(node);
        let owner = id.into();
        for child in children {
            self.set_parent(child, Some(owner));
        }
        id
    }

    #[inline]
    pub fn get<'a, I: TreeIndex + 'a>(&'a self, id: I) -> &'a I::Node {
        I::arena(self).get(id)
    }

    /// Mutate a node in place, keeping the parents of its children in sync.
    pub fn edit<I: TreeIndex, R>(&mut self, id: I, edit: impl FnOnce(&mut I::Node) -> R) -> R {
        let mut before = Children::new();
        I::arena(self).get(id).collect_children(&mut before);
        let result = edit(I::arena_mut(self).get_mut(id));
        let mut after = Children::new();
        I::arena(self).get(id).collect_children(&mut after);

        let owner = id.into();
        for child in &before {
            if !after.contains(child) && self.parent_of(*child) == Some(owner) {
                self.set_parent(*child, None);
            }
        }
        for child in after {
            if !before.contains(&child) {
                self.set_parent(child, Some(owner));
            }
        }
        result
    }

    #[inline]
    pub fn parent(&self, node: impl Into<TreeNodeId>) -> Option<TreeNodeId> {
        self.parent_of(node.into())
    }

    pub fn arena<I: TreeIndex>(&self) -> &Arena<I, I::Node> {
        I::arena(self)
    }

    /// Append `stmt` to the block `block`.
    pub fn push_statement(&mut self, block: StmtId, stmt: StmtId) -> Result<(), TreeError> {
        self.edit(block, |node| match &mut node.kind {
            StmtKind::Block(statements) => {
                statements.push(stmt);
                Ok(())
            }
            _ => Err(TreeError::NotABlock(block)),
        })
    }

    /// Remove `stmt` from the block `block`. Returns whether it was present.
    pub fn remove_statement(&mut self, block: StmtId, stmt: StmtId) -> Result<bool, TreeError> {
        self.edit(block, |node| match &mut node.kind {
            StmtKind::Block(statements) => {
                let before = statements.len();
                statements.retain(|s| *s != stmt);
                Ok(statements.len() != before)
            }
            _ => Err(TreeError::NotABlock(block)),
        })
    }

    /// Child ids of any node. The component's libraries are tracked by the
    /// component, so `TreeNodeId::Component` has none here.
    pub fn children(&self, node: TreeNodeId) -> Children {
        let mut out = Children::new();
        match node {
            TreeNodeId::Component => {}
            TreeNodeId::Library(id) => self.get(id).collect_children(&mut out),
            TreeNodeId::Class(id) => self.get(id).collect_children(&mut out),
            TreeNodeId::Field(id) => self.get(id).collect_children(&mut out),
            TreeNodeId::Procedure(id) => self.get(id).collect_children(&mut out),
            TreeNodeId::Constructor(id) => self.get(id).collect_children(&mut out),
            TreeNodeId::Initializer(id) => self.get(id).collect_children(&mut out),
            TreeNodeId::Function(id) => self.get(id).collect_children(&mut out),
            TreeNodeId::Expr(id) => self.get(id).collect_children(&mut out),
            TreeNodeId::Stmt(id) => self.get(id).collect_children(&mut out),
            TreeNodeId::Variable(id) => self.get(id).collect_children(&mut out),
            TreeNodeId::TypeParameter(id) => self.get(id).collect_children(&mut out),
        }
        out
    }

    /// Verify that every child below `roots` names its owner as parent.
    pub fn check_parents(&self, roots: &[TreeNodeId]) -> Result<(), TreeError> {
        let mut stack: Vec<TreeNodeId> = roots.to_vec();
        while let Some(owner) = stack.pop() {
            for child in self.children(owner) {
                let parent = self.parent_of(child);
                if parent != Some(owner) {
                    return Err(TreeError::StaleParent {
                        child,
                        owner,
                        parent,
                    });
                }
                stack.push(child);
            }
        }
        Ok(())
    }

    pub(crate) fn parent_of(&self, node: TreeNodeId) -> Option<TreeNodeId> {
        match node {
            TreeNodeId::Component => None,
            TreeNodeId::Library(id) => self.libraries.parents[id.index()],
            TreeNodeId::Class(id) => self.classes.parents[id.index()],
            TreeNodeId::Field(id) => self.fields.parents[id.index()],
            TreeNodeId::Procedure(id) => self.procedures.parents[id.index()],
            TreeNodeId::Constructor(id) => self.constructors.parents[id.index()],
            TreeNodeId::Initializer(id) => self.initializers.parents[id.index()],
            TreeNodeId::Function(id) => self.functions.parents[id.index()],
            TreeNodeId::Expr(id) => self.exprs.parents[id.index()],
            TreeNodeId::Stmt(id) => self.stmts.parents[id.index()],
            TreeNodeId::Variable(id) => self.variables.parents[id.index()],
            TreeNodeId::TypeParameter(id) => self.type_parameters.parents[id.index()],
        }
    }

    pub(crate) fn set_parent(&mut self, node: TreeNodeId, parent: Option<TreeNodeId>) {
        let slot = match node {
            TreeNodeId::Component => return,
            TreeNodeId::Library(id) => &mut self.libraries.parents[id.index()],
            TreeNodeId::Class(id) => &mut self.classes.parents[id.index()],
            TreeNodeId::Field(id) => &mut self.fields.parents[id.index()],
            TreeNodeId::Procedure(id) => &mut self.procedures.parents[id.index()],
            TreeNodeId::Constructor(id) => &mut self.constructors.parents[id.index()],
            TreeNodeId::Initializer(id) => &mut self.initializers.parents[id.index()],
            TreeNodeId::Function(id) => &mut self.functions.parents[id.index()],
            TreeNodeId::Expr(id) => &mut self.exprs.parents[id.index()],
            TreeNodeId::Stmt(id) => &mut self.stmts.parents[id.index()],
            TreeNodeId::Variable(id) => &mut self.variables.parents[id.index()],
            TreeNodeId::TypeParameter(id) => &mut self.type_parameters.parents[id.index()],
        };
        *slot = parent;
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("libraries", &self.libraries.len())
            .field("classes", &self.classes.len())
            .field("members", &(self.fields.len() + self.procedures.len() + self.constructors.len()))
            .field("exprs", &self.exprs.len())
            .field("stmts", &self.stmts.len())
            .finish_non_exhaustive()
    }
}

macro_rules! tree_index {
    ($($id:ident => $node:ident in $field:ident;)*) => {
        $(
            impl TreeIndex for $id {
                type Node = $node;

                #[inline]
                fn from_slot(slot: u32) -> Self {
                    $id::new(slot)
                }

                #[inline]
                fn slot(self) -> usize {
                    self.index()
                }

                #[inline]
                fn arena(tree: &Tree) -> &Arena<Self, $node> {
                    &tree.$field
                }

                #[inline]
                fn arena_mut(tree: &mut Tree) -> &mut Arena<Self, $node> {
                    &mut tree.$field
                }
            }
        )*
    };
}

tree_index! {
    LibraryId => Library in libraries;
    ClassId => Class in classes;
    FieldId => Field in fields;
    ProcedureId => Procedure in procedures;
    ConstructorId => Constructor in constructors;
    InitializerId => Initializer in initializers;
    FunctionId => FunctionNode in functions;
    ExprId => Expression in exprs;
    StmtId => Statement in stmts;
    VariableId => VariableDeclaration in variables;
    TypeParameterId => TypeParameter in type_parameters;
}

fn push_all<I: Copy + Into<TreeNodeId>>(out: &mut Children, ids: &[I]) {
    out.extend(ids.iter().map(|&id| id.into()));
}

fn push_opt<I: Into<TreeNodeId>>(out: &mut Children, id: Option<I>) {
    if let Some(id) = id {
        out.push(id.into());
    }
}

impl TreeNode for Library {
    type Id = LibraryId;

    fn collect_children(&self, out: &mut Children) {
        push_all(out, &self.annotations);
        push_all(out, &self.classes);
        push_all(out, &self.fields);
        push_all(out, &self.procedures);
    }
}

impl TreeNode for Class {
    type Id = ClassId;

    fn collect_children(&self, out: &mut Children) {
        push_all(out, &self.annotations);
        push_all(out, &self.type_parameters);
        push_all(out, &self.fields);
        push_all(out, &self.constructors);
        push_all(out, &self.procedures);
    }
}

impl TreeNode for Field {
    type Id = FieldId;

    fn collect_children(&self, out: &mut Children) {
        push_all(out, &self.annotations);
        push_opt(out, self.initializer);
    }
}

impl TreeNode for Procedure {
    type Id = ProcedureId;

    fn collect_children(&self, out: &mut Children) {
        push_all(out, &self.annotations);
        push_opt(out, self.function);
    }
}

impl TreeNode for Constructor {
    type Id = ConstructorId;

    fn collect_children(&self, out: &mut Children) {
        push_all(out, &self.annotations);
        out.push(self.function.into());
        push_all(out, &self.initializers);
    }
}

impl TreeNode for Initializer {
    type Id = InitializerId;

    fn collect_children(&self, out: &mut Children) {
        match &self.kind {
            InitializerKind::Field(init) => out.push(init.value.into()),
            InitializerKind::Super(init) => out.extend(init.arguments.values().map(Into::into)),
            InitializerKind::Redirecting(init) => {
                out.extend(init.arguments.values().map(Into::into));
            }
        }
    }
}

impl TreeNode for FunctionNode {
    type Id = FunctionId;

    fn collect_children(&self, out: &mut Children) {
        push_all(out, &self.type_parameters);
        push_all(out, &self.positional_parameters);
        push_all(out, &self.named_parameters);
        push_opt(out, self.body);
    }
}

impl TreeNode for TypeParameter {
    type Id = TypeParameterId;

    fn collect_children(&self, out: &mut Children) {
        push_all(out, &self.annotations);
    }
}

impl TreeNode for VariableDeclaration {
    type Id = VariableId;

    fn collect_children(&self, out: &mut Children) {
        push_all(out, &self.annotations);
        push_opt(out, self.initializer);
    }
}

impl TreeNode for Expression {
    type Id = ExprId;

    fn collect_children(&self, out: &mut Children) {
        match &self.kind {
            ExprKind::Invalid(_)
            | ExprKind::VariableGet(_)
            | ExprKind::StaticGet(_)
            | ExprKind::StringLiteral(_)
            | ExprKind::IntLiteral(_)
            | ExprKind::DoubleLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::NullLiteral
            | ExprKind::This => {}
            ExprKind::VariableSet(node) => out.push(node.value.into()),
            ExprKind::PropertyGet(node) => out.push(node.receiver.into()),
            ExprKind::PropertySet(node) => {
                out.push(node.receiver.into());
                out.push(node.value.into());
            }
            ExprKind::StaticSet(node) => out.push(node.value.into()),
            ExprKind::MethodInvocation(node) => {
                out.push(node.receiver.into());
                out.extend(node.arguments.values().map(Into::into));
            }
            ExprKind::StaticInvocation(node) => {
                out.extend(node.arguments.values().map(Into::into));
            }
            ExprKind::ConstructorInvocation(node) => {
                out.extend(node.arguments.values().map(Into::into));
            }
            ExprKind::Not(operand) | ExprKind::Throw(operand) | ExprKind::NullCheck(operand) => {
                out.push((*operand).into());
            }
            ExprKind::Logical(node) => {
                out.push(node.left.into());
                out.push(node.right.into());
            }
            ExprKind::Conditional(node) => {
                out.push(node.condition.into());
                out.push(node.then.into());
                out.push(node.otherwise.into());
            }
            ExprKind::StringConcatenation(parts) => push_all(out, parts),
            ExprKind::Is(node) => out.push(node.operand.into()),
            ExprKind::As(node) => out.push(node.operand.into()),
            ExprKind::ListLiteral(node) => push_all(out, &node.values),
            ExprKind::Block(node) => {
                push_all(out, &node.body);
                out.push(node.value.into());
            }
        }
    }
}

impl TreeNode for Statement {
    type Id = StmtId;

    fn collect_children(&self, out: &mut Children) {
        match &self.kind {
            StmtKind::Empty | StmtKind::Break(_) => {}
            StmtKind::Expression(expr) => out.push((*expr).into()),
            StmtKind::Block(statements) => push_all(out, statements),
            StmtKind::Assert(node) => {
                out.push(node.condition.into());
                push_opt(out, node.message);
            }
            StmtKind::Labeled(body) => out.push((*body).into()),
            StmtKind::While(node) => {
                out.push(node.condition.into());
                out.push(node.body.into());
            }
            StmtKind::Do(node) => {
                out.push(node.body.into());
                out.push(node.condition.into());
            }
            StmtKind::If(node) => {
                out.push(node.condition.into());
                out.push(node.then.into());
                push_opt(out, node.otherwise);
            }
            StmtKind::Return(value) => push_opt(out, *value),
            StmtKind::TryCatch(node) => {
                out.push(node.body.into());
                for Catch {
                    exception,
                    stack_trace,
                    body,
                    ..
                } in &node.catches
                {
                    push_opt(out, *exception);
                    push_opt(out, *stack_trace);
                    out.push((*body).into());
                }
            }
            StmtKind::TryFinally(node) => {
                out.push(node.body.into());
                out.push(node.finalizer.into());
            }
            StmtKind::VariableDeclaration(variable) => out.push((*variable).into()),
        }
    }
}

fn to_u32(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("too many {what}: {len} exceeds u32::MAX"))
}

#[cfg(test)]
mod tests;
