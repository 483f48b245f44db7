//! Component reader.
//!
//! The format is indexed from the tail: every component ends with a
//! [`ComponentIndex`] that locates its tables and libraries, and every
//! library and class ends with the offsets of its members. The reader
//! first collects the component indices, then for each component reads
//! the string, name, and URI tables in full before decoding any node,
//! since nodes refer to those tables by position.
//!
//! Variables, type parameters, and labels are resolved by position in the
//! stacks this reader keeps in step with the writer's scopes.

mod expr;
mod index;
mod stmt;
mod types;

use kernel_ir::{
    AsyncMarker, CanonicalName, Class, ClassFlags, ClassId, Component, Constructor,
    ConstructorFlags, ConstructorId, Field, FieldFlags, FieldId, FileOffset, FunctionId,
    FunctionNode, KernelVersion, LanguageVersion, Library, LibraryFlags, LibraryId, Name,
    Procedure, ProcedureFlags, ProcedureId, ProcedureKind, Reference, Source, StmtId,
    TypeParameterId, Uri, VariableId,
};

use self::index::ComponentIndex;
use crate::codec::ByteCursor;
use crate::tags;
use crate::ReadError;

/// Deserialize every component in `bytes`, in file order.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = bytes.len()))]
pub fn read_components(bytes: &[u8]) -> Result<Vec<Component>, ReadError> {
    let cursor = ByteCursor::new(bytes);
    // Reject foreign input before trusting anything at its tail.
    let magic = cursor.peek_uint32_at(0)?;
    if magic != tags::MAGIC {
        return Err(ReadError::InvalidMagic {
            found: magic,
            offset: 0,
        });
    }
    let format = cursor.peek_uint32_at(4)?;
    if KernelVersion::from_format(format).is_none() {
        return Err(ReadError::UnsupportedVersion {
            version: format,
            offset: 4,
        });
    }

    let indices = ComponentIndex::read_all(&cursor)?;
    tracing::debug!(components = indices.len(), "component indices read");
    indices
        .iter()
        .map(|index| KernelReader::new(cursor.clone(), index).read_component(index))
        .collect()
}

pub(crate) struct KernelReader<'a> {
    cursor: ByteCursor<'a>,
    /// Absolute offset of the component start; every stored offset is
    /// relative to it.
    base: usize,
    strings: Vec<String>,
    /// Canonical names in table order; a biased index `i` is `names[i - 1]`.
    names: Vec<CanonicalName>,
    uris: Vec<Option<Uri>>,
    variables: Vec<VariableId>,
    type_parameters: Vec<TypeParameterId>,
    labels: Vec<StmtId>,
    /// First label of the current function; break indices count from here.
    label_base: usize,
    component: Component,
}

impl<'a> KernelReader<'a> {
    fn new(cursor: ByteCursor<'a>, index: &ComponentIndex) -> Self {
        let mut component = Component::with_version(index.version);
        component.compiled_mode = index.compiled_mode;
        KernelReader {
            cursor,
            base: index.start,
            strings: Vec::new(),
            names: Vec::new(),
            uris: Vec::new(),
            variables: Vec::new(),
            type_parameters: Vec::new(),
            labels: Vec::new(),
            label_base: 0,
            component,
        }
    }

    // Errors

    fn malformed(&self, message: impl Into<String>) -> ReadError {
        ReadError::Malformed {
            message: message.into(),
            offset: self.cursor.offset(),
        }
    }

    fn out_of_range(table: &'static str, index: u32, len: usize, offset: usize) -> ReadError {
        ReadError::IndexOutOfRange {
            table,
            index,
            len,
            offset,
        }
    }

    // Positioning

    fn seek(&mut self, relative: u32) -> Result<(), ReadError> {
        self.cursor.seek(self.base + relative as usize)
    }

    /// `uint32` at `end - words * 4`, with `end` absolute.
    fn word_before(&self, end: usize, words: usize) -> Result<u32, ReadError> {
        let back = words
            .checked_mul(4)
            .filter(|&back| back <= end.saturating_sub(self.base))
            .ok_or_else(|| ReadError::Malformed {
                message: format!("member index of {words} words runs past the component start"),
                offset: end,
            })?;
        self.cursor.peek_uint32_at(end - back)
    }

    /// `count + 1` offsets ending `words_after` words before `end`.
    fn offsets_before(
        &self,
        end: usize,
        count: usize,
        words_after: usize,
    ) -> Result<Vec<u32>, ReadError> {
        let first = count + words_after + 1;
        // Fail on a bogus count before allocating for it.
        self.word_before(end, first)?;
        (0..=count)
            .map(|i| self.word_before(end, first - i))
            .collect()
    }

    // Primitives

    fn read_byte(&mut self) -> Result<u8, ReadError> {
        self.cursor.read_byte()
    }

    fn read_uint(&mut self) -> Result<u32, ReadError> {
        self.cursor.read_uint()
    }

    fn read_offset(&mut self) -> Result<FileOffset, ReadError> {
        self.cursor.read_file_offset()
    }

    fn expect_tag(&mut self, expected: u8, kind: &'static str) -> Result<(), ReadError> {
        let offset = self.cursor.offset();
        let tag = self.read_byte()?;
        if tag == expected {
            Ok(())
        } else {
            Err(ReadError::UnexpectedTag { kind, tag, offset })
        }
    }

    /// A count this reader has no decoding for unless it is zero.
    fn expect_empty(&mut self, what: &'static str) -> Result<(), ReadError> {
        let offset = self.cursor.offset();
        match self.read_uint()? {
            0 => Ok(()),
            _ => Err(ReadError::Unsupported { what, offset }),
        }
    }

    // Containers

    fn read_list<T>(
        &mut self,
        mut read: impl FnMut(&mut Self) -> Result<T, ReadError>,
    ) -> Result<Vec<T>, ReadError> {
        let len = self.read_uint()? as usize;
        // Every element takes at least one byte.
        let remaining = self.cursor.len() - self.cursor.offset();
        let mut items = Vec::with_capacity(len.min(remaining));
        for _ in 0..len {
            items.push(read(self)?);
        }
        Ok(items)
    }

    fn read_option<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, ReadError>,
    ) -> Result<Option<T>, ReadError> {
        let offset = self.cursor.offset();
        match self.read_byte()? {
            tags::NOTHING => Ok(None),
            tags::SOMETHING => read(self).map(Some),
            tag => Err(ReadError::UnexpectedTag {
                kind: "option",
                tag,
                offset,
            }),
        }
    }

    // Table references

    fn read_string_ref(&mut self) -> Result<String, ReadError> {
        let offset = self.cursor.offset();
        let index = self.read_uint()?;
        self.strings
            .get(index as usize)
            .cloned()
            .ok_or_else(|| Self::out_of_range("string", index, self.strings.len(), offset))
    }

    /// A string where the empty string stands for "none".
    fn read_optional_string(&mut self) -> Result<Option<String>, ReadError> {
        let text = self.read_string_ref()?;
        Ok((!text.is_empty()).then_some(text))
    }

    fn read_name_ref(&mut self) -> Result<Option<CanonicalName>, ReadError> {
        let offset = self.cursor.offset();
        let biased = self.read_uint()?;
        match biased {
            0 => Ok(None),
            _ => self
                .names
                .get(biased as usize - 1)
                .copied()
                .map(Some)
                .ok_or_else(|| Self::out_of_range("canonical name", biased, self.names.len(), offset)),
        }
    }

    fn read_optional_reference(&mut self) -> Result<Option<Reference>, ReadError> {
        Ok(self
            .read_name_ref()?
            .map(|name| self.component.names.reference_for(name)))
    }

    fn read_reference(&mut self, what: &'static str) -> Result<Reference, ReadError> {
        let offset = self.cursor.offset();
        self.read_optional_reference()?
            .ok_or_else(|| ReadError::Malformed {
                message: format!("missing {what} reference"),
                offset,
            })
    }

    fn read_uri_ref(&mut self) -> Result<Option<Uri>, ReadError> {
        let offset = self.cursor.offset();
        let index = self.read_uint()?;
        self.uris
            .get(index as usize)
            .cloned()
            .ok_or_else(|| Self::out_of_range("source uri", index, self.uris.len(), offset))
    }

    fn read_name(&mut self) -> Result<Name, ReadError> {
        let text = self.read_string_ref()?;
        let library = if text.starts_with('_') {
            self.read_optional_reference()?
        } else {
            None
        };
        Ok(Name { text, library })
    }

    /// Members start with no variables and no labels in scope.
    fn enter_member(&mut self) {
        self.variables.clear();
        self.labels.clear();
        self.label_base = 0;
    }

    // Component

    #[tracing::instrument(level = "debug", skip_all, fields(
        start = index.start,
        version = index.version.format,
        libraries = index.library_offsets.len().saturating_sub(1),
    ))]
    fn read_component(mut self, index: &ComponentIndex) -> Result<Component, ReadError> {
        self.cursor.seek(self.base + 8)?;
        let _problems = self.read_list(|r| r.cursor.read_string())?;

        self.seek(index.string_table)?;
        self.read_string_table()?;
        self.seek(index.canonical_names)?;
        self.read_name_table()?;
        self.seek(index.source_table)?;
        self.read_source_table()?;
        tracing::debug!(
            strings = self.strings.len(),
            names = self.names.len(),
            uris = self.uris.len(),
            "component tables read"
        );

        if index.main_method != 0 {
            let name = self
                .names
                .get(index.main_method as usize - 1)
                .copied()
                .ok_or_else(|| {
                    Self::out_of_range("canonical name", index.main_method, self.names.len(), index.start)
                })?;
            self.component.main_method = Some(self.component.names.reference_for(name));
        }

        for window in index.library_offsets.windows(2) {
            let (start, end) = (window[0], window[1]);
            if end < start {
                return Err(ReadError::Malformed {
                    message: format!("library ends at {end} before it starts at {start}"),
                    offset: self.base + start as usize,
                });
            }
            self.seek(start)?;
            let library = self.read_library(self.base + end as usize)?;
            self.component.push_library(library);
        }
        Ok(self.component)
    }

    fn read_string_table(&mut self) -> Result<(), ReadError> {
        let ends = self.read_list(Self::read_uint)?;
        let total = ends.last().copied().unwrap_or(0) as usize;
        let offset = self.cursor.offset();
        let bytes = self.cursor.read_bytes(total)?;
        let mut start = 0;
        self.strings = Vec::with_capacity(ends.len());
        for end in ends {
            let end = end as usize;
            let slice = bytes.get(start..end).ok_or_else(|| ReadError::Malformed {
                message: format!("string table entry {start}..{end} is out of order"),
                offset,
            })?;
            let text = std::str::from_utf8(slice).map_err(|_| ReadError::InvalidUtf8 {
                offset: offset + start,
            })?;
            self.strings.push(text.to_owned());
            start = end;
        }
        Ok(())
    }

    /// Parents come before their children, so each entry can be attached
    /// as soon as it is read.
    fn read_name_table(&mut self) -> Result<(), ReadError> {
        let len = self.read_uint()?;
        let root = self.component.names.root();
        self.names = Vec::with_capacity(len as usize);
        for _ in 0..len {
            let parent = self.read_name_ref()?.unwrap_or(root);
            let text = self.read_string_ref()?;
            let name = self.component.names.get_child(parent, &text);
            self.names.push(name);
        }
        Ok(())
    }

    fn read_source_table(&mut self) -> Result<(), ReadError> {
        let len = self.cursor.read_uint32()?;
        for _ in 0..len {
            let uri = self.cursor.read_string()?;
            let content = self.cursor.read_string()?;
            let mut line_start = 0u32;
            let line_starts = self.read_list(|r| {
                line_start = line_start.wrapping_add(r.read_uint()?);
                Ok(line_start)
            })?;
            let import_uri = self.cursor.read_string()?;

            let uri = (!uri.is_empty()).then(|| Uri::new(uri));
            let source = Source {
                content,
                line_starts,
                import_uri: (!import_uri.is_empty()).then(|| Uri::new(import_uri)),
            };
            if let Some(uri) = &uri {
                if !source.is_empty() {
                    self.component.sources.insert(uri.clone(), source);
                }
            }
            self.uris.push(uri);
        }
        Ok(())
    }

    // Declarations

    fn read_library(&mut self, end: usize) -> Result<LibraryId, ReadError> {
        self.enter_member();
        let procedure_count = self.word_before(end, 1)?;
        let procedures = procedure_count as usize;
        let procedure_offsets = self.offsets_before(end, procedures, 1)?;
        let class_count = self.word_before(end, procedures + 3)?;
        let classes = class_count as usize;
        let class_offsets = self.offsets_before(end, classes, procedures + 3)?;
        let source_references = self.word_before(end, procedures + classes + 5)?;

        let flags = LibraryFlags::from_bits_retain(self.read_byte()?);
        let major = self.read_uint()?;
        let minor = self.read_uint()?;
        let reference = self.read_reference("library")?;
        let mut library = Library::new(reference, LanguageVersion::new(major, minor));
        library.flags = flags;
        library.name = self.read_optional_string()?;
        library.file_uri = self.read_uri_ref()?;
        tracing::debug!(
            library = library.file_uri.as_ref().map_or("", Uri::as_str),
            classes = class_count,
            procedures = procedure_count,
            "reading library"
        );

        let _problems = self.read_list(|r| r.cursor.read_string())?;
        library.annotations = self.read_exprs()?;
        self.expect_empty("library dependency")?;
        // Additional exports carry no node of their own.
        let _exports = self.read_list(Self::read_name_ref)?;
        self.expect_empty("library part")?;
        self.expect_empty("typedef")?;

        self.expect_count(class_count, "class")?;
        for window in class_offsets.windows(2) {
            self.seek(window[0])?;
            library.classes.push(self.read_class(self.base + window[1] as usize)?);
        }
        self.seek(class_offsets[class_offsets.len() - 1])?;
        self.expect_empty("extension")?;
        library.fields = self.read_list(Self::read_field)?;

        self.expect_count(procedure_count, "procedure")?;
        for window in procedure_offsets.windows(2) {
            self.seek(window[0])?;
            library.procedures.push(self.read_procedure()?);
        }

        self.seek(source_references)?;
        library.source_uris = self.read_list(|r| {
            r.read_uri_ref()?
                .ok_or_else(|| r.malformed("library source uri is empty"))
        })?;

        let id = self.component.tree.alloc(library);
        self.component.names.set_node(reference, id.into());
        Ok(id)
    }

    /// A count in the body that must agree with the trailing index.
    fn expect_count(&mut self, indexed: u32, what: &str) -> Result<(), ReadError> {
        let count = self.read_uint()?;
        if count == indexed {
            Ok(())
        } else {
            Err(self.malformed(format!(
                "{count} {what} entries in the body but {indexed} in the index"
            )))
        }
    }

    fn read_class(&mut self, end: usize) -> Result<ClassId, ReadError> {
        self.enter_member();
        self.expect_tag(tags::CLASS, "class")?;
        let procedure_count = self.word_before(end, 1)?;
        let procedure_offsets = self.offsets_before(end, procedure_count as usize, 1)?;

        let reference = self.read_reference("class")?;
        let file_uri = self.read_uri_ref()?;
        let start_file_offset = self.read_offset()?;
        let file_offset = self.read_offset()?;
        let file_end_offset = self.read_offset()?;
        let flags = ClassFlags::from_bits_retain(self.read_byte()?);
        let name = self.read_string_ref()?;
        tracing::trace!(class = %name, "reading class");

        let mut class = Class::new(reference, name);
        class.file_uri = file_uri;
        class.start_file_offset = start_file_offset;
        class.file_offset = file_offset;
        class.file_end_offset = file_end_offset;
        class.flags = flags;
        class.annotations = self.read_exprs()?;

        let height = self.type_parameters.len();
        class.type_parameters = self.read_type_parameters()?;
        class.supertype = self.read_option(Self::read_type)?;
        class.mixed_in_type = self.read_option(Self::read_type)?;
        class.implemented_types = self.read_types()?;
        class.fields = self.read_list(Self::read_field)?;
        class.constructors = self.read_list(Self::read_constructor)?;

        self.expect_count(procedure_count, "procedure")?;
        for window in procedure_offsets.windows(2) {
            self.seek(window[0])?;
            class.procedures.push(self.read_procedure()?);
        }
        self.seek(procedure_offsets[procedure_offsets.len() - 1])?;
        self.expect_empty("redirecting factory")?;
        self.type_parameters.truncate(height);

        let id = self.component.tree.alloc(class);
        self.component.names.set_node(reference, id.into());
        Ok(id)
    }

    fn read_field(&mut self) -> Result<FieldId, ReadError> {
        self.enter_member();
        self.expect_tag(tags::FIELD, "field")?;
        let reference = self.read_reference("field")?;
        let file_uri = self.read_uri_ref()?;
        let file_offset = self.read_offset()?;
        let file_end_offset = self.read_offset()?;
        let flags = FieldFlags::from_bits_retain(self.read_uint()?);
        let name = self.read_name()?;
        tracing::trace!(field = %name.text, "reading field");
        let annotations = self.read_exprs()?;
        let ty = self.read_type()?;

        let mut field = Field::new(reference, name, ty);
        field.initializer = self.read_option(Self::read_expr)?;
        field.file_uri = file_uri;
        field.file_offset = file_offset;
        field.file_end_offset = file_end_offset;
        field.flags = flags;
        field.annotations = annotations;

        let id = self.component.tree.alloc(field);
        self.component.names.set_node(reference, id.into());
        Ok(id)
    }

    fn read_procedure(&mut self) -> Result<ProcedureId, ReadError> {
        self.enter_member();
        self.expect_tag(tags::PROCEDURE, "procedure")?;
        let reference = self.read_reference("procedure")?;
        let file_uri = self.read_uri_ref()?;
        let start_file_offset = self.read_offset()?;
        let file_offset = self.read_offset()?;
        let file_end_offset = self.read_offset()?;
        let kind_byte = self.read_byte()?;
        let kind = ProcedureKind::from_byte(kind_byte)
            .ok_or_else(|| self.malformed(format!("unknown procedure kind {kind_byte}")))?;
        let flags = ProcedureFlags::from_bits_retain(self.read_uint()?);
        let name = self.read_name()?;
        tracing::trace!(procedure = %name.text, ?kind, "reading procedure");
        let annotations = self.read_exprs()?;
        // Forwarding stub super and interface targets.
        self.read_name_ref()?;
        self.read_name_ref()?;
        let function = self.read_option(Self::read_function_node)?;

        let mut procedure = Procedure::new(reference, kind, name, function);
        procedure.flags = flags;
        procedure.file_uri = file_uri;
        procedure.start_file_offset = start_file_offset;
        procedure.file_offset = file_offset;
        procedure.file_end_offset = file_end_offset;
        procedure.annotations = annotations;

        let id = self.component.tree.alloc(procedure);
        self.component.names.set_node(reference, id.into());
        Ok(id)
    }

    fn read_constructor(&mut self) -> Result<ConstructorId, ReadError> {
        self.enter_member();
        self.expect_tag(tags::CONSTRUCTOR, "constructor")?;
        let reference = self.read_reference("constructor")?;
        let file_uri = self.read_uri_ref()?;
        let start_file_offset = self.read_offset()?;
        let file_offset = self.read_offset()?;
        let file_end_offset = self.read_offset()?;
        let flags = ConstructorFlags::from_bits_retain(self.read_byte()?);
        let name = self.read_name()?;
        tracing::trace!(constructor = %name.text, "reading constructor");
        let annotations = self.read_exprs()?;
        let function = self.read_function_node()?;

        // The initializers see the parameters of the constructor.
        let height = self.variables.len();
        let tree = &self.component.tree;
        self.variables.extend(tree.get(function).parameters());
        let initializers = self.read_list(Self::read_initializer)?;
        self.variables.truncate(height);

        let mut constructor = Constructor::new(reference, name, function);
        constructor.initializers = initializers;
        constructor.flags = flags;
        constructor.file_uri = file_uri;
        constructor.start_file_offset = start_file_offset;
        constructor.file_offset = file_offset;
        constructor.file_end_offset = file_end_offset;
        constructor.annotations = annotations;

        let id = self.component.tree.alloc(constructor);
        self.component.names.set_node(reference, id.into());
        Ok(id)
    }

    fn read_async_marker(&mut self) -> Result<AsyncMarker, ReadError> {
        let byte = self.read_byte()?;
        AsyncMarker::from_byte(byte).ok_or_else(|| self.malformed(format!("unknown async marker {byte}")))
    }

    fn read_function_node(&mut self) -> Result<FunctionId, ReadError> {
        self.expect_tag(tags::FUNCTION_NODE, "function node")?;
        let variable_height = self.variables.len();
        let type_parameter_height = self.type_parameters.len();
        // Break targets are numbered from the enclosing function.
        let outer_label_base = self.label_base;
        self.label_base = self.labels.len();

        let file_offset = self.read_offset()?;
        let file_end_offset = self.read_offset()?;
        let async_marker = self.read_async_marker()?;
        let dart_async_marker = self.read_async_marker()?;
        let type_parameters = self.read_type_parameters()?;
        let count_offset = self.cursor.offset();
        let parameter_count = self.read_uint()?;
        let required = self.read_uint()?;
        let positional_parameters = self.read_list(Self::read_variable)?;
        let named_parameters = self.read_list(Self::read_variable)?;
        if parameter_count as usize != positional_parameters.len() + named_parameters.len() {
            return Err(ReadError::Malformed {
                message: format!(
                    "parameter count {parameter_count} does not match {} positional and {} named",
                    positional_parameters.len(),
                    named_parameters.len()
                ),
                offset: count_offset,
            });
        }
        let return_type = self.read_type()?;
        let body = self.read_option(Self::read_stmt)?;

        self.variables.truncate(variable_height);
        self.type_parameters.truncate(type_parameter_height);
        self.labels.truncate(self.label_base);
        self.label_base = outer_label_base;

        let mut function = FunctionNode::new(body);
        function.required_parameter_count =
            (required as usize != positional_parameters.len()).then_some(required);
        function.type_parameters = type_parameters;
        function.positional_parameters = positional_parameters;
        function.named_parameters = named_parameters;
        function.return_type = return_type;
        function.async_marker = async_marker;
        function.dart_async_marker = dart_async_marker;
        function.file_offset = file_offset;
        function.file_end_offset = file_end_offset;
        Ok(self.component.tree.alloc(function))
    }
}

#[cfg(test)]
mod tests;
