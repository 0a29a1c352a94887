//! Typed graph variables.
//!
//! A graph declares its variables with an initial value; every instance of
//! the graph owns a [`Variables`] store seeded from those declarations. The
//! kind of a variable is fixed by its initial value.

use core::fmt;
use std::sync::Arc;

use crate::error::GraphError;

/// Opaque reference to a host-side object, such as a spawned entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef(u64);

impl ObjectRef {
    /// Wraps a raw host id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw host id.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `Value::Bool`
    Bool,
    /// `Value::Int`
    Int,
    /// `Value::Float`
    Float,
    /// `Value::Ref`
    Ref,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Ref => "object reference",
        };
        f.write_str(name)
    }
}

/// A variable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f32),
    /// Optional host object.
    Ref(Option<ObjectRef>),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Ref(_) => ValueKind::Ref,
        }
    }

    /// Returns the flag if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the integer if this is an `Int`.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the number if this is a `Float`.
    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the reference if this is a `Ref`.
    #[must_use]
    pub fn as_object(&self) -> Option<Option<ObjectRef>> {
        match self {
            Value::Ref(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Value::Ref(Some(value))
    }
}

/// Index of a declared variable within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(u32);

impl VariableId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Returns the declaration index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var#{}", self.0)
    }
}

/// A variable declaration: name plus initial value.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    name: Arc<str>,
    initial: Value,
}

impl VariableDecl {
    pub(crate) fn new(name: Arc<str>, initial: Value) -> Self {
        Self { name, initial }
    }

    /// The variable's name.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The value every instance starts with.
    #[must_use]
    pub fn initial(&self) -> Value {
        self.initial
    }

    /// The variable's fixed kind.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.initial.kind()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Variables
// ─────────────────────────────────────────────────────────────────────────────

/// Per-instance variable storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    names: Vec<Arc<str>>,
    values: Vec<Value>,
}

impl Variables {
    /// Seeds storage from a graph's declarations.
    #[must_use]
    pub fn from_decls(decls: &[VariableDecl]) -> Self {
        Self {
            names: decls.iter().map(|decl| Arc::clone(&decl.name)).collect(),
            values: decls.iter().map(VariableDecl::initial).collect(),
        }
    }

    /// Returns the current value.
    #[must_use]
    pub fn get(&self, id: VariableId) -> Option<Value> {
        self.values.get(id.index()).copied()
    }

    /// Returns the current value of a `Bool` variable.
    #[must_use]
    pub fn get_bool(&self, id: VariableId) -> Option<bool> {
        self.get(id).and_then(|value| value.as_bool())
    }

    /// Writes a value, rejecting a change of kind.
    ///
    /// # Errors
    ///
    /// [`GraphError::VariableNotFound`] for an unknown id and
    /// [`GraphError::VariableKindMismatch`] when `value` has another kind.
    pub fn set(&mut self, id: VariableId, value: Value) -> Result<(), GraphError> {
        let Some(slot) = self.values.get_mut(id.index()) else {
            return Err(GraphError::VariableNotFound(id.to_string()));
        };
        if slot.kind() != value.kind() {
            return Err(GraphError::VariableKindMismatch {
                name: Arc::clone(&self.names[id.index()]),
                expected: slot.kind(),
                found: value.kind(),
            });
        }
        *slot = value;
        Ok(())
    }

    /// Restores every value to its declared initial value.
    pub fn reset(&mut self, decls: &[VariableDecl]) {
        *self = Self::from_decls(decls);
    }

    /// Picks up variables declared after this storage was seeded.
    pub fn sync(&mut self, decls: &[VariableDecl]) {
        for decl in decls.iter().skip(self.values.len()) {
            self.names.push(Arc::clone(&decl.name));
            self.values.push(decl.initial);
        }
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no variables are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decls() -> Vec<VariableDecl> {
        vec![
            VariableDecl::new("enraged".into(), Value::Bool(false)),
            VariableDecl::new("volleys".into(), Value::Int(3)),
        ]
    }

    #[test]
    fn set_is_type_checked() {
        let mut vars = Variables::from_decls(&decls());
        let enraged = VariableId::from_index(0);

        vars.set(enraged, Value::Bool(true)).expect("same kind");
        assert_eq!(vars.get_bool(enraged), Some(true));

        let err = vars.set(enraged, Value::Int(1)).expect_err("kind change");
        assert!(matches!(
            err,
            GraphError::VariableKindMismatch {
                expected: ValueKind::Bool,
                found: ValueKind::Int,
                ..
            }
        ));
        assert_eq!(vars.get_bool(enraged), Some(true));

        assert!(matches!(
            vars.set(VariableId::from_index(9), Value::Bool(true)),
            Err(GraphError::VariableNotFound(_))
        ));
    }

    #[test]
    fn reset_and_sync() {
        let mut all = decls();
        let mut vars = Variables::from_decls(&all[..1]);
        all.push(VariableDecl::new("target".into(), Value::Ref(None)));

        vars.sync(&all);
        assert_eq!(vars.len(), 3);
        assert_eq!(vars.get(VariableId::from_index(1)), Some(Value::Int(3)));

        vars.set(VariableId::from_index(1), Value::Int(0)).expect("int");
        vars.reset(&all);
        assert_eq!(vars.get(VariableId::from_index(1)), Some(Value::Int(3)));
    }
}
