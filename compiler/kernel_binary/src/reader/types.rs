use kernel_ir::{
    DartType, InterfaceType, Nullability, TypeParameter, TypeParameterFlags, TypeParameterId,
    TypeParameterType, Variance,
};

use super::KernelReader;
use crate::stack::ensure_sufficient_stack;
use crate::tags;
use crate::ReadError;

impl KernelReader<'_> {
    pub(super) fn read_type(&mut self) -> Result<DartType, ReadError> {
        ensure_sufficient_stack(|| self.read_dart_type())
    }

    fn read_dart_type(&mut self) -> Result<DartType, ReadError> {
        let offset = self.cursor.offset();
        let tag = self.read_byte()?;
        let ty = match tag {
            tags::INVALID_TYPE => DartType::Invalid,
            tags::DYNAMIC_TYPE => DartType::Dynamic,
            tags::VOID_TYPE => DartType::Void,
            tags::BOTTOM_TYPE => DartType::Bottom,
            tags::NEVER_TYPE => DartType::Never(self.read_nullability()?),
            tags::SIMPLE_INTERFACE_TYPE => {
                let nullability = self.read_nullability()?;
                let class = self.read_reference("class of an interface type")?;
                DartType::interface(class, nullability)
            }
            tags::INTERFACE_TYPE => {
                let nullability = self.read_nullability()?;
                let class = self.read_reference("class of an interface type")?;
                DartType::Interface(InterfaceType {
                    nullability,
                    class,
                    type_arguments: self.read_types()?,
                })
            }
            tags::TYPE_PARAMETER_TYPE => {
                let nullability = self.read_nullability()?;
                let index_offset = self.cursor.offset();
                let index = self.read_uint()?;
                let parameter = *self.type_parameters.get(index as usize).ok_or_else(|| {
                    Self::out_of_range(
                        "type parameter",
                        index,
                        self.type_parameters.len(),
                        index_offset,
                    )
                })?;
                let bound = self.read_option(Self::read_type)?.map(Box::new);
                DartType::TypeParameter(TypeParameterType {
                    nullability,
                    parameter,
                    bound,
                })
            }
            _ => {
                return Err(ReadError::UnexpectedTag {
                    kind: "type",
                    tag,
                    offset,
                })
            }
        };
        Ok(ty)
    }

    pub(super) fn read_types(&mut self) -> Result<Vec<DartType>, ReadError> {
        self.read_list(Self::read_type)
    }

    fn read_nullability(&mut self) -> Result<Nullability, ReadError> {
        let byte = self.read_byte()?;
        Nullability::from_byte(byte)
            .ok_or_else(|| self.malformed(format!("unknown nullability {byte}")))
    }

    /// Declare a list of type parameters and read their bodies. All of
    /// them are in scope before the first bound is read; the caller
    /// truncates the stack when the declaring node ends.
    pub(super) fn read_type_parameters(&mut self) -> Result<Vec<TypeParameterId>, ReadError> {
        let len = self.read_uint()? as usize;
        let remaining = self.cursor.len() - self.cursor.offset();
        let mut parameters = Vec::with_capacity(len.min(remaining));
        for _ in 0..len {
            let mut placeholder = TypeParameter::new("");
            placeholder.name = None;
            parameters.push(self.component.tree.alloc(placeholder));
        }
        self.type_parameters.extend_from_slice(&parameters);

        for &id in &parameters {
            let flags = TypeParameterFlags::from_bits_retain(self.read_byte()?);
            let annotations = self.read_exprs()?;
            let variance_byte = self.read_byte()?;
            let variance = Variance::from_byte(variance_byte)
                .ok_or_else(|| self.malformed(format!("unknown variance {variance_byte}")))?;
            let name = self.read_optional_string()?;
            let bound = self.read_type()?;
            let default_type = self.read_option(Self::read_type)?;
            self.component.tree.edit(id, |node| {
                node.flags = flags;
                node.annotations = annotations;
                node.variance = variance;
                node.name = name;
                node.bound = bound;
                node.default_type = default_type;
            });
        }
        Ok(parameters)
    }
}
