//! Function signatures and bodies.

use crate::{DartType, FileOffset, StmtId, TypeParameterId, VariableId};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum AsyncMarker {
    #[default]
    Sync,
    SyncStar,
    Async,
    AsyncStar,
    SyncYielding,
}

impl AsyncMarker {
    pub const fn to_byte(self) -> u8 {
        match self {
            AsyncMarker::Sync => 0,
            AsyncMarker::SyncStar => 1,
            AsyncMarker::Async => 2,
            AsyncMarker::AsyncStar => 3,
            AsyncMarker::SyncYielding => 4,
        }
    }

    pub const fn from_byte(byte: u8) -> Option<AsyncMarker> {
        match byte {
            0 => Some(AsyncMarker::Sync),
            1 => Some(AsyncMarker::SyncStar),
            2 => Some(AsyncMarker::Async),
            3 => Some(AsyncMarker::AsyncStar),
            4 => Some(AsyncMarker::SyncYielding),
            _ => None,
        }
    }
}

/// Parameters, return type, and body shared by procedures and constructors.
///
/// A function node opens a variable scope: parameters are declared in order
/// and are visible to the body.
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionNode {
    pub type_parameters: Vec<TypeParameterId>,
    pub positional_parameters: Vec<VariableId>,
    pub named_parameters: Vec<VariableId>,
    /// How many positional parameters are required; all of them when unset.
    pub required_parameter_count: Option<u32>,
    pub return_type: DartType,
    pub body: Option<StmtId>,
    pub async_marker: AsyncMarker,
    pub dart_async_marker: AsyncMarker,
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
}

impl FunctionNode {
    pub fn new(body: Option<StmtId>) -> Self {
        FunctionNode {
            type_parameters: Vec::new(),
            positional_parameters: Vec::new(),
            named_parameters: Vec::new(),
            required_parameter_count: None,
            return_type: DartType::Dynamic,
            body,
            async_marker: AsyncMarker::Sync,
            dart_async_marker: AsyncMarker::Sync,
            file_offset: FileOffset::NONE,
            file_end_offset: FileOffset::NONE,
        }
    }

    #[must_use]
    pub fn with_positional(mut self, parameters: Vec<VariableId>) -> Self {
        self.positional_parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_return_type(mut self, return_type: DartType) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn required_positional_count(&self) -> u32 {
        self.required_parameter_count
            .unwrap_or(self.positional_parameters.len() as u32)
    }

    pub fn parameter_count(&self) -> usize {
        self.positional_parameters.len() + self.named_parameters.len()
    }

    /// Positional parameters followed by named ones, in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.positional_parameters
            .iter()
            .chain(&self.named_parameters)
            .copied()
    }
}
