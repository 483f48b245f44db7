//! Component writer.
//!
//! One pass over the tree, depth first, in the order the reader expects.
//! The string, name, and URI tables fill up during the pass and are
//! written after the libraries; the component index comes last and points
//! back at everything before it.
//!
//! Variable references are written as scope slots. The slot of a
//! declaration is the number of variables visible at that point, so the
//! reader can resolve it by position in its own declaration stack.

mod expr;
mod stmt;
mod types;

use std::mem;

use kernel_ir::visitor::{
    accept_expression, accept_initializer, accept_member, accept_statement, accept_type,
    MemberVisitor, TreeVisitor,
};
use kernel_ir::{
    CanonicalName, Class, ClassId, Component, Constructor, ConstructorId, DartType, ExprId,
    Field, FieldId, FileOffset, FunctionId, FunctionNode, InitializerId, Library, LibraryId,
    MemberId, Name, Procedure, ProcedureId, Reference, StmtId, Tree, TreeNodeId, Uri, VariableId,
};
use rustc_hash::FxHashMap;

use crate::codec::BinarySink;
use crate::indexer::{
    LabelIndexer, NameIndexer, StringIndexer, TypeParameterIndexer, UriIndexer, VariableIndexer,
};
use crate::stack::ensure_sufficient_stack;
use crate::tags;
use crate::WriteError;

/// Scope slot assigned to each variable declaration during a write.
pub type VariableSlots = FxHashMap<VariableId, u32>;

/// Serialize one component.
pub fn write_component(component: &Component) -> Result<Vec<u8>, WriteError> {
    write_component_with_slots(component).map(|(bytes, _)| bytes)
}

/// Serialize one component and report the slot given to every variable.
#[tracing::instrument(level = "debug", skip_all, fields(
    version = component.version.format,
    libraries = component.libraries().len(),
))]
pub fn write_component_with_slots(
    component: &Component,
) -> Result<(Vec<u8>, VariableSlots), WriteError> {
    let mut writer = KernelWriter::new(component);
    writer.visit_component(component)?;
    tracing::debug!(
        bytes = writer.sink.offset(),
        strings = writer.strings.strings().len(),
        names = writer.names.names().len(),
        "component written"
    );
    Ok((writer.sink.into_bytes(), writer.slots))
}

/// Offsets of the component-level sections, relative to the component start.
#[derive(Default)]
struct SectionOffsets {
    source_table: u32,
    canonical_names: u32,
    metadata_payloads: u32,
    metadata_mappings: u32,
    string_table: u32,
    constant_table: u32,
}

pub(crate) struct KernelWriter<'a> {
    component: &'a Component,
    tree: &'a Tree,
    sink: BinarySink,
    strings: StringIndexer,
    names: NameIndexer,
    uris: UriIndexer,
    variables: VariableIndexer,
    labels: LabelIndexer,
    type_parameters: TypeParameterIndexer,
    /// Offset of each variable's declaration, written with every use.
    declaration_offsets: FxHashMap<VariableId, u32>,
    slots: VariableSlots,
    library_offsets: Vec<u32>,
}

impl<'a> KernelWriter<'a> {
    fn new(component: &'a Component) -> Self {
        KernelWriter {
            component,
            tree: &component.tree,
            sink: BinarySink::new(),
            strings: StringIndexer::new(),
            names: NameIndexer::new(),
            uris: UriIndexer::new(),
            variables: VariableIndexer::new(),
            labels: LabelIndexer::new(),
            type_parameters: TypeParameterIndexer::new(),
            declaration_offsets: FxHashMap::default(),
            slots: FxHashMap::default(),
            library_offsets: Vec::new(),
        }
    }

    // Table references

    fn write_string_ref(&mut self, value: &str) -> Result<(), WriteError> {
        let index = self.strings.put(value);
        self.sink.write_uint(index, "string index")
    }

    fn write_name_ref(&mut self, name: Option<CanonicalName>) -> Result<(), WriteError> {
        let index = match name {
            Some(name) => self.names.index(&self.component.names, name),
            None => 0,
        };
        self.sink.write_uint(index, "canonical name index")
    }

    fn name_index(&mut self, reference: Reference, what: &'static str) -> Result<u32, WriteError> {
        let name = self
            .component
            .names
            .canonical_name(reference)
            .ok_or(WriteError::UnboundReference { what })?;
        Ok(self.names.index(&self.component.names, name))
    }

    fn write_reference(&mut self, reference: Reference, what: &'static str) -> Result<(), WriteError> {
        let index = self.name_index(reference, what)?;
        self.sink.write_uint(index, "canonical name index")
    }

    fn write_optional_reference(
        &mut self,
        reference: Option<Reference>,
        what: &'static str,
    ) -> Result<(), WriteError> {
        match reference {
            Some(reference) => self.write_reference(reference, what),
            None => self.write_name_ref(None),
        }
    }

    fn write_uri_ref(&mut self, uri: Option<&Uri>) -> Result<(), WriteError> {
        let index = self.uris.put(uri);
        self.sink.write_uint(index, "uri index")
    }

    fn write_name(&mut self, name: &Name) -> Result<(), WriteError> {
        self.write_string_ref(&name.text)?;
        if name.is_private() {
            self.write_optional_reference(name.library, "library of a private name")?;
        }
        Ok(())
    }

    // Containers

    fn write_list<T>(
        &mut self,
        items: &'a [T],
        what: &'static str,
        mut write: impl FnMut(&mut Self, &'a T) -> Result<(), WriteError>,
    ) -> Result<(), WriteError> {
        self.sink.write_len(items.len(), what)?;
        for item in items {
            write(self, item)?;
        }
        Ok(())
    }

    fn write_option<T>(
        &mut self,
        value: Option<T>,
        write: impl FnOnce(&mut Self, T) -> Result<(), WriteError>,
    ) -> Result<(), WriteError> {
        match value {
            Some(value) => {
                self.sink.write_byte(tags::SOMETHING);
                write(self, value)
            }
            None => {
                self.sink.write_byte(tags::NOTHING);
                Ok(())
            }
        }
    }

    /// Count, then each node; returns the start offset of every node plus
    /// the end offset of the last.
    fn write_with_offsets<T: Copy>(
        &mut self,
        nodes: &'a [T],
        what: &'static str,
        mut write: impl FnMut(&mut Self, T) -> Result<(), WriteError>,
    ) -> Result<Vec<u32>, WriteError> {
        self.sink.write_len(nodes.len(), what)?;
        let mut offsets = Vec::with_capacity(nodes.len() + 1);
        for &node in nodes {
            offsets.push(self.sink.offset());
            write(self, node)?;
        }
        offsets.push(self.sink.offset());
        Ok(offsets)
    }

    /// Offsets as `uint32`, followed by the node count.
    fn write_offset_table(&mut self, offsets: &[u32]) {
        for &offset in offsets {
            self.sink.write_uint32(offset);
        }
        self.sink.write_uint32(offsets.len() as u32 - 1);
    }

    // Recursion points

    fn write_expr(&mut self, id: ExprId) -> Result<(), WriteError> {
        let tree = self.tree;
        ensure_sufficient_stack(|| accept_expression(self, tree, id))
    }

    fn write_exprs(&mut self, ids: &'a [ExprId]) -> Result<(), WriteError> {
        self.write_list(ids, "expression count", |w, &id| w.write_expr(id))
    }

    fn write_stmt(&mut self, id: StmtId) -> Result<(), WriteError> {
        let tree = self.tree;
        ensure_sufficient_stack(|| accept_statement(self, tree, id))
    }

    fn write_type(&mut self, ty: &'a DartType) -> Result<(), WriteError> {
        ensure_sufficient_stack(|| accept_type(self, ty))
    }

    fn write_types(&mut self, types: &'a [DartType]) -> Result<(), WriteError> {
        self.write_list(types, "type count", Self::write_type)
    }

    fn write_member(&mut self, member: MemberId) -> Result<(), WriteError> {
        let tree = self.tree;
        accept_member(self, tree, member)
    }

    fn write_initializer(&mut self, id: InitializerId) -> Result<(), WriteError> {
        let tree = self.tree;
        accept_initializer(self, tree, id)
    }

    fn write_function(&mut self, id: FunctionId) -> Result<(), WriteError> {
        let tree = self.tree;
        self.visit_function_node(id, tree.get(id))
    }

    fn write_offsets(&mut self, offsets: &[FileOffset]) -> Result<(), WriteError> {
        for &offset in offsets {
            self.sink.write_file_offset(offset)?;
        }
        Ok(())
    }

    /// Members start with no variables and no labels in scope.
    fn enter_member(&mut self) {
        self.variables = VariableIndexer::new();
        self.labels = LabelIndexer::new();
    }

    // Component tables

    fn write_source_table(&mut self) -> Result<(), WriteError> {
        let uris = self.uris.uris().to_vec();
        self.sink.write_uint32(uris.len() as u32);
        let mut offsets = Vec::with_capacity(uris.len());
        for uri in &uris {
            offsets.push(self.sink.offset());
            let source = uri.as_ref().and_then(|uri| self.component.sources.get(uri));
            self.sink
                .write_string(uri.as_ref().map_or("", Uri::as_str))?;
            match source {
                Some(source) => {
                    self.sink.write_string(&source.content)?;
                    self.sink
                        .write_len(source.line_starts.len(), "line count")?;
                    let mut previous = 0;
                    for &start in &source.line_starts {
                        self.sink
                            .write_uint(start.wrapping_sub(previous), "line start delta")?;
                        previous = start;
                    }
                    let import = source.import_uri.as_ref().map_or("", Uri::as_str);
                    self.sink.write_string(import)?;
                }
                None => {
                    self.sink.write_string("")?;
                    self.sink.write_uint(0, "line count")?;
                    self.sink.write_string("")?;
                }
            }
        }
        for offset in offsets {
            self.sink.write_uint32(offset);
        }
        Ok(())
    }

    fn write_name_table(&mut self) -> Result<(), WriteError> {
        let names = self.names.names().to_vec();
        self.sink.write_len(names.len(), "canonical name count")?;
        let component = self.component;
        let table = &component.names;
        for name in names {
            let parent = table.parent(name).filter(|&p| !table.is_root(p));
            self.write_name_ref(parent)?;
            self.write_string_ref(table.text(name))?;
        }
        Ok(())
    }

    fn write_string_table(&mut self) -> Result<(), WriteError> {
        let strings = self.strings.strings();
        let mut end = 0;
        let mut ends = Vec::with_capacity(strings.len());
        for string in strings {
            end += string.len();
            ends.push(end);
        }
        self.sink.write_len(ends.len(), "string count")?;
        for end in ends {
            self.sink.write_len(end, "string table size")?;
        }
        for string in self.strings.strings() {
            self.sink.write_bytes(string.as_bytes());
        }
        Ok(())
    }

    fn write_index(&mut self, sections: &SectionOffsets, main_method: u32) {
        let version = self.component.version;
        let fixed = if version.has_compiled_mode() { 8 } else { 7 };
        let words = fixed + self.library_offsets.len() as u32 + 2;
        let unaligned = self.sink.offset() + 4 * words;
        for _ in 0..(8 - unaligned % 8) % 8 {
            self.sink.write_byte(0);
        }

        self.sink.write_uint32(sections.source_table);
        self.sink.write_uint32(sections.canonical_names);
        self.sink.write_uint32(sections.metadata_payloads);
        self.sink.write_uint32(sections.metadata_mappings);
        self.sink.write_uint32(sections.string_table);
        self.sink.write_uint32(sections.constant_table);
        self.sink.write_uint32(main_method);
        if version.has_compiled_mode() {
            self.sink.write_uint32(self.component.compiled_mode.to_u32());
        }
        let library_offsets = mem::take(&mut self.library_offsets);
        for &offset in &library_offsets {
            self.sink.write_uint32(offset);
        }
        self.sink.write_uint32(library_offsets.len() as u32 - 1);
        let size = self.sink.offset() + 4;
        self.sink.write_uint32(size);
    }
}

impl<'a> TreeVisitor<'a, Result<(), WriteError>> for KernelWriter<'a> {
    fn default_tree_node(&mut self, _node: TreeNodeId) -> Result<(), WriteError> {
        Err(WriteError::Unsupported { what: "tree node" })
    }

    fn visit_component(&mut self, component: &'a Component) -> Result<(), WriteError> {
        self.sink.write_uint32(tags::MAGIC);
        self.sink.write_uint32(component.version.format);
        self.sink.write_uint(0, "problem count")?;

        for &library in component.libraries() {
            self.visit_library(library, component.tree.get(library))?;
        }
        self.library_offsets.push(self.sink.offset());

        // Everything the tables refer to must be indexed before they are written.
        let main_method = match component.main_method {
            Some(reference) => self.name_index(reference, "main method")?,
            None => 0,
        };
        let mut source_uris: Vec<&Uri> = component.sources.keys().collect();
        source_uris.sort();
        for uri in source_uris {
            self.uris.put(Some(uri));
        }

        let mut sections = SectionOffsets {
            source_table: self.sink.offset(),
            ..SectionOffsets::default()
        };
        self.write_source_table()?;

        sections.canonical_names = self.sink.offset();
        self.write_name_table()?;

        self.sink.pad_to(8);
        sections.metadata_payloads = self.sink.offset();
        sections.metadata_mappings = self.sink.offset();
        self.sink.write_uint32(0);

        sections.string_table = self.sink.offset();
        self.write_string_table()?;

        sections.constant_table = self.sink.offset();
        self.sink.write_uint32(0);

        self.write_index(&sections, main_method);
        Ok(())
    }

    fn visit_library(&mut self, id: LibraryId, node: &'a Library) -> Result<(), WriteError> {
        tracing::debug!(
            library = ?id,
            classes = node.classes.len(),
            fields = node.fields.len(),
            procedures = node.procedures.len(),
            "writing library"
        );
        self.enter_member();
        self.library_offsets.push(self.sink.offset());
        self.sink.write_byte(node.flags.bits());
        self.sink
            .write_uint(node.language_version.major, "language version")?;
        self.sink
            .write_uint(node.language_version.minor, "language version")?;
        self.write_reference(node.reference, "library")?;
        self.write_string_ref(node.name.as_deref().unwrap_or(""))?;
        self.write_uri_ref(node.file_uri.as_ref())?;
        self.sink.write_uint(0, "problem count")?;
        self.write_exprs(&node.annotations)?;
        self.sink.write_uint(0, "dependency count")?;
        self.sink.write_uint(0, "export count")?;
        self.sink.write_uint(0, "part count")?;
        self.sink.write_uint(0, "typedef count")?;

        let class_offsets = self.write_with_offsets(&node.classes, "class count", |w, class| {
            let tree = w.tree;
            w.visit_class(class, tree.get(class))
        })?;
        self.sink.write_uint(0, "extension count")?;
        self.write_list(&node.fields, "field count", |w, &field| {
            w.write_member(field.into())
        })?;
        let procedure_offsets =
            self.write_with_offsets(&node.procedures, "procedure count", |w, procedure| {
                w.write_member(procedure.into())
            })?;

        let source_references = self.sink.offset();
        self.write_list(&node.source_uris, "source uri count", |w, uri| {
            w.write_uri_ref(Some(uri))
        })?;
        self.sink.write_uint32(source_references);
        self.write_offset_table(&class_offsets);
        self.write_offset_table(&procedure_offsets);
        Ok(())
    }

    fn visit_class(&mut self, id: ClassId, node: &'a Class) -> Result<(), WriteError> {
        tracing::trace!(class = %node.name, ?id, "writing class");
        self.enter_member();
        self.sink.write_byte(tags::CLASS);
        self.write_reference(node.reference, "class")?;
        self.write_uri_ref(node.file_uri.as_ref())?;
        self.write_offsets(&[
            node.start_file_offset,
            node.file_offset,
            node.file_end_offset,
        ])?;
        self.sink.write_byte(node.flags.bits());
        self.write_string_ref(&node.name)?;
        self.write_exprs(&node.annotations)?;

        let height = self.type_parameters.height();
        self.write_type_parameters(&node.type_parameters)?;
        self.write_option(node.supertype.as_ref(), Self::write_type)?;
        self.write_option(node.mixed_in_type.as_ref(), Self::write_type)?;
        self.write_types(&node.implemented_types)?;

        self.write_list(&node.fields, "field count", |w, &field| {
            w.write_member(field.into())
        })?;
        self.write_list(&node.constructors, "constructor count", |w, &constructor| {
            w.write_member(constructor.into())
        })?;
        let procedure_offsets =
            self.write_with_offsets(&node.procedures, "procedure count", |w, procedure| {
                w.write_member(procedure.into())
            })?;
        self.sink.write_uint(0, "redirecting factory count")?;
        self.write_offset_table(&procedure_offsets);

        self.type_parameters.truncate(height);
        Ok(())
    }

    fn visit_function_node(
        &mut self,
        _id: FunctionId,
        node: &'a FunctionNode,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::FUNCTION_NODE);
        // Break targets are numbered from the enclosing function.
        let outer_labels = mem::take(&mut self.labels);
        let type_parameter_height = self.type_parameters.height();
        self.variables.push_scope();

        self.write_offsets(&[node.file_offset, node.file_end_offset])?;
        self.sink.write_byte(node.async_marker.to_byte());
        self.sink.write_byte(node.dart_async_marker.to_byte());
        self.write_type_parameters(&node.type_parameters)?;
        self.sink
            .write_len(node.parameter_count(), "parameter count")?;
        self.sink
            .write_uint(node.required_positional_count(), "required parameter count")?;
        self.write_list(&node.positional_parameters, "positional parameter count", |w, &p| {
            w.write_variable(p)
        })?;
        self.write_list(&node.named_parameters, "named parameter count", |w, &p| {
            w.write_variable(p)
        })?;
        self.write_type(&node.return_type)?;
        self.write_option(node.body, Self::write_stmt)?;

        self.variables.pop_scope();
        self.type_parameters.truncate(type_parameter_height);
        self.labels = outer_labels;
        Ok(())
    }
}

impl<'a> MemberVisitor<'a, Result<(), WriteError>> for KernelWriter<'a> {
    fn default_member(&mut self, _member: MemberId) -> Result<(), WriteError> {
        Err(WriteError::Unsupported { what: "member" })
    }

    fn visit_field(&mut self, _id: FieldId, node: &'a Field) -> Result<(), WriteError> {
        tracing::trace!(field = %node.name.text, "writing field");
        self.enter_member();
        self.sink.write_byte(tags::FIELD);
        self.write_reference(node.reference, "field")?;
        self.write_uri_ref(node.file_uri.as_ref())?;
        self.write_offsets(&[node.file_offset, node.file_end_offset])?;
        // Fields have more than eight flags.
        self.sink.write_uint(node.flags.bits(), "field flags")?;
        self.write_name(&node.name)?;
        self.write_exprs(&node.annotations)?;
        self.write_type(&node.ty)?;
        self.write_option(node.initializer, Self::write_expr)
    }

    fn visit_procedure(
        &mut self,
        _id: ProcedureId,
        node: &'a Procedure,
    ) -> Result<(), WriteError> {
        tracing::trace!(procedure = %node.name.text, kind = ?node.kind, "writing procedure");
        self.enter_member();
        self.sink.write_byte(tags::PROCEDURE);
        self.write_reference(node.reference, "procedure")?;
        self.write_uri_ref(node.file_uri.as_ref())?;
        self.write_offsets(&[
            node.start_file_offset,
            node.file_offset,
            node.file_end_offset,
        ])?;
        self.sink.write_byte(node.kind.to_byte());
        self.sink.write_uint(node.flags.bits(), "procedure flags")?;
        self.write_name(&node.name)?;
        self.write_exprs(&node.annotations)?;
        // Forwarding stub super and interface targets.
        self.write_name_ref(None)?;
        self.write_name_ref(None)?;
        self.write_option(node.function, Self::write_function)
    }

    fn visit_constructor(
        &mut self,
        _id: ConstructorId,
        node: &'a Constructor,
    ) -> Result<(), WriteError> {
        tracing::trace!(constructor = %node.name.text, "writing constructor");
        self.enter_member();
        self.variables.push_scope();
        self.sink.write_byte(tags::CONSTRUCTOR);
        self.write_reference(node.reference, "constructor")?;
        self.write_uri_ref(node.file_uri.as_ref())?;
        self.write_offsets(&[
            node.start_file_offset,
            node.file_offset,
            node.file_end_offset,
        ])?;
        self.sink.write_byte(node.flags.bits());
        self.write_name(&node.name)?;
        self.write_exprs(&node.annotations)?;
        self.write_function(node.function)?;

        // The initializers see the parameters of the constructor.
        let tree = self.tree;
        self.variables
            .restore_scope(tree.get(node.function).parameters());
        self.write_list(&node.initializers, "initializer count", |w, &initializer| {
            w.write_initializer(initializer)
        })?;
        self.variables.pop_scope();
        Ok(())
    }
}

#[cfg(test)]
mod tests;
