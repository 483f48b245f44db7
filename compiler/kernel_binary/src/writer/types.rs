use kernel_ir::visitor::DartTypeVisitor;
use kernel_ir::{DartType, InterfaceType, Nullability, TypeParameterId, TypeParameterType};

use super::KernelWriter;
use crate::tags;
use crate::WriteError;

impl<'a> KernelWriter<'a> {
    /// Write a list of type parameter declarations and bring them into
    /// scope. All of them are in scope before the first bound is written,
    /// so bounds may refer to later parameters of the same list.
    pub(super) fn write_type_parameters(
        &mut self,
        parameters: &'a [TypeParameterId],
    ) -> Result<(), WriteError> {
        self.sink
            .write_len(parameters.len(), "type parameter count")?;
        self.type_parameters.extend(parameters);
        let tree = self.tree;
        for &id in parameters {
            let node = tree.get(id);
            self.sink.write_byte(node.flags.bits());
            self.write_exprs(&node.annotations)?;
            self.sink.write_byte(node.variance.to_byte());
            self.write_string_ref(node.name.as_deref().unwrap_or(""))?;
            self.write_type(&node.bound)?;
            self.write_option(node.default_type.as_ref(), Self::write_type)?;
        }
        Ok(())
    }
}

impl<'a> DartTypeVisitor<'a, Result<(), WriteError>> for KernelWriter<'a> {
    fn default_dart_type(&mut self, _ty: &'a DartType) -> Result<(), WriteError> {
        Err(WriteError::Unsupported { what: "type" })
    }

    fn visit_invalid_type(&mut self, _ty: &'a DartType) -> Result<(), WriteError> {
        self.sink.write_byte(tags::INVALID_TYPE);
        Ok(())
    }

    fn visit_dynamic_type(&mut self, _ty: &'a DartType) -> Result<(), WriteError> {
        self.sink.write_byte(tags::DYNAMIC_TYPE);
        Ok(())
    }

    fn visit_void_type(&mut self, _ty: &'a DartType) -> Result<(), WriteError> {
        self.sink.write_byte(tags::VOID_TYPE);
        Ok(())
    }

    fn visit_bottom_type(&mut self, _ty: &'a DartType) -> Result<(), WriteError> {
        self.sink.write_byte(tags::BOTTOM_TYPE);
        Ok(())
    }

    fn visit_never_type(
        &mut self,
        _ty: &'a DartType,
        nullability: Nullability,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::NEVER_TYPE);
        self.sink.write_byte(nullability.to_byte());
        Ok(())
    }

    fn visit_interface_type(
        &mut self,
        _ty: &'a DartType,
        node: &'a InterfaceType,
    ) -> Result<(), WriteError> {
        if node.type_arguments.is_empty() {
            self.sink.write_byte(tags::SIMPLE_INTERFACE_TYPE);
            self.sink.write_byte(node.nullability.to_byte());
            self.write_reference(node.class, "class of an interface type")
        } else {
            self.sink.write_byte(tags::INTERFACE_TYPE);
            self.sink.write_byte(node.nullability.to_byte());
            self.write_reference(node.class, "class of an interface type")?;
            self.write_types(&node.type_arguments)
        }
    }

    fn visit_type_parameter_type(
        &mut self,
        _ty: &'a DartType,
        node: &'a TypeParameterType,
    ) -> Result<(), WriteError> {
        let index = self.type_parameters.index(node.parameter).ok_or(
            WriteError::TypeParameterNotInScope {
                parameter: node.parameter,
            },
        )?;
        self.sink.write_byte(tags::TYPE_PARAMETER_TYPE);
        self.sink.write_byte(node.nullability.to_byte());
        self.sink.write_uint(index, "type parameter index")?;
        self.write_option(node.bound.as_deref(), Self::write_type)
    }
}
