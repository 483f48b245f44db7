use kernel_ir::{StmtId, TypeParameterId, VariableId};
use rustc_hash::FxHashMap;

/// Stack slots of the variables in scope.
///
/// A variable gets the next free slot when it is declared. Opening a scope
/// remembers the stack height; closing it returns to that height, so the
/// slots of the scope's variables are reused by later declarations.
#[derive(Default)]
pub(crate) struct VariableIndexer {
    slots: FxHashMap<VariableId, u32>,
    stack: Vec<VariableId>,
    scopes: Vec<usize>,
}

impl VariableIndexer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn declare(&mut self, variable: VariableId) -> u32 {
        let slot = self.stack.len() as u32;
        self.slots.insert(variable, slot);
        self.stack.push(variable);
        slot
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(self.stack.len());
    }

    pub(crate) fn pop_scope(&mut self) {
        if let Some(height) = self.scopes.pop() {
            self.stack.truncate(height);
        }
    }

    /// Re-enter a scope whose variables were declared and popped earlier,
    /// giving them back their slots. Constructor initializers see the
    /// parameters of the constructor this way.
    pub(crate) fn restore_scope(&mut self, variables: impl IntoIterator<Item = VariableId>) {
        for variable in variables {
            self.declare(variable);
        }
    }

    /// Slot of `variable` if it is currently visible. A slot reused by a
    /// later declaration no longer belongs to the earlier variable.
    pub(crate) fn slot(&self, variable: VariableId) -> Option<u32> {
        let slot = *self.slots.get(&variable)?;
        (self.stack.get(slot as usize) == Some(&variable)).then_some(slot)
    }

    #[cfg(test)]
    pub(crate) fn height(&self) -> u32 {
        self.stack.len() as u32
    }
}

/// Enclosing labeled statements of the current function, innermost last.
#[derive(Default)]
pub(crate) struct LabelIndexer {
    labels: Vec<StmtId>,
}

impl LabelIndexer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enter(&mut self, label: StmtId) -> u32 {
        self.labels.push(label);
        self.labels.len() as u32 - 1
    }

    pub(crate) fn exit(&mut self) {
        self.labels.pop();
    }

    pub(crate) fn index(&self, label: StmtId) -> Option<u32> {
        self.labels
            .iter()
            .rposition(|&l| l == label)
            .map(|index| index as u32)
    }
}

/// Type parameters in scope, outermost first.
#[derive(Default)]
pub(crate) struct TypeParameterIndexer {
    parameters: Vec<TypeParameterId>,
}

impl TypeParameterIndexer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn height(&self) -> usize {
        self.parameters.len()
    }

    pub(crate) fn extend(&mut self, parameters: &[TypeParameterId]) {
        self.parameters.extend_from_slice(parameters);
    }

    pub(crate) fn truncate(&mut self, height: usize) {
        self.parameters.truncate(height);
    }

    pub(crate) fn index(&self, parameter: TypeParameterId) -> Option<u32> {
        self.parameters
            .iter()
            .rposition(|&p| p == parameter)
            .map(|index| index as u32)
    }
}
