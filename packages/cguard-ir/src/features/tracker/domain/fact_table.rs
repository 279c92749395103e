/*
 * Fact Table
 *
 * Per-function symbol table. Value facts are keyed by access path
 * (`buf`, `user.name`, `board[i].name`) so writes into one struct member
 * do not leak into its siblings.
 *
 * Branches are analyzed on clones and merged with `join`. A table whose
 * path returned is `terminated` and takes no part in the merge.
 */

use rustc_hash::FxHashMap;

use crate::features::c_ir::{DeclKind, Expr};
use crate::features::evaluator::ConstEnv;
use crate::features::facts::{Buffer, PointerState, TaintLabel, ValueFact};
use crate::shared::models::Location;

/// Lifecycle facts of one pointer variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerFact {
    pub state: PointerState,
    /// Every path reaching this point compared the pointer with NULL
    /// since it was last allocated
    pub null_checked: bool,
    pub alloc_site: Option<Location>,
    /// An unchecked use was already reported for this allocation
    pub unchecked_reported: bool,
    /// Holds NULL on every path (`free` on it is a no-op)
    pub known_null: bool,
    /// Some path freed the allocation while another kept it live
    pub maybe_freed: bool,
}

impl PointerFact {
    pub fn uninitialized() -> Self {
        Self {
            state: PointerState::Uninitialized,
            null_checked: false,
            alloc_site: None,
            unchecked_reported: false,
            known_null: false,
            maybe_freed: false,
        }
    }

    pub fn null() -> Self {
        Self {
            known_null: true,
            ..Self::uninitialized()
        }
    }

    pub fn allocated(site: Location) -> Self {
        Self {
            state: PointerState::Allocated,
            alloc_site: Some(site),
            ..Self::uninitialized()
        }
    }

    fn join(&self, other: &PointerFact) -> PointerFact {
        let state = self.state.join(other.state);
        let split_free = matches!(
            (self.state, other.state),
            (PointerState::Allocated, PointerState::Freed) | (PointerState::Freed, PointerState::Allocated)
        );
        PointerFact {
            state,
            null_checked: self.null_checked && other.null_checked,
            alloc_site: self.alloc_site.or(other.alloc_site),
            unchecked_reported: self.unchecked_reported || other.unchecked_reported,
            known_null: self.known_null && other.known_null,
            maybe_freed: state == PointerState::Allocated
                && (split_free || self.maybe_freed || other.maybe_freed),
        }
    }
}

/// Everything known about one name
#[derive(Debug, Clone, Copy)]
pub struct SymbolFacts<'a> {
    pub kind: Option<&'a DeclKind>,
    pub buffer: Option<&'a Buffer>,
    pub pointer: Option<&'a PointerFact>,
    pub value: Option<&'a ValueFact>,
}

#[derive(Debug, Clone, Default)]
pub struct FactTable {
    decls: FxHashMap<String, DeclKind>,
    buffers: FxHashMap<String, Buffer>,
    pointers: FxHashMap<String, PointerFact>,
    values: FxHashMap<String, ValueFact>,
    params: Vec<String>,
    terminated: bool,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a declaration; arrays get a fixed buffer and pointers start
    /// out uninitialized
    pub fn declare(&mut self, name: &str, kind: &DeclKind) {
        match kind {
            DeclKind::Array {
                dimension: Some(dim),
                element,
            } => {
                self.buffers
                    .insert(name.to_string(), Buffer::fixed(name, *dim, element.size_of()));
            }
            DeclKind::Array { dimension: None, .. } => {
                self.buffers.insert(name.to_string(), Buffer::unknown(name));
            }
            DeclKind::Pointer { .. } => {
                self.pointers
                    .insert(name.to_string(), PointerFact::uninitialized());
                self.buffers.remove(name);
            }
            _ => {}
        }
        self.decls.insert(name.to_string(), kind.clone());
    }

    /// Parameters carry externally controlled values
    pub fn declare_param(&mut self, name: &str, kind: &DeclKind) {
        self.declare(name, kind);
        self.params.push(name.to_string());
        self.values.insert(name.to_string(), ValueFact::external());
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolFacts<'_>> {
        let facts = SymbolFacts {
            kind: self.decls.get(name),
            buffer: self.buffers.get(name),
            pointer: self.pointers.get(name),
            value: self.values.get(name),
        };
        let known = facts.kind.is_some()
            || facts.buffer.is_some()
            || facts.pointer.is_some()
            || facts.value.is_some();
        known.then_some(facts)
    }

    pub fn kind(&self, name: &str) -> Option<&DeclKind> {
        self.decls.get(name)
    }

    pub fn buffer(&self, name: &str) -> Option<&Buffer> {
        self.buffers.get(name)
    }

    pub fn set_buffer(&mut self, buffer: Buffer) {
        self.buffers.insert(buffer.name.clone(), buffer);
    }

    pub fn remove_buffer(&mut self, name: &str) {
        self.buffers.remove(name);
    }

    pub fn pointer(&self, name: &str) -> Option<&PointerFact> {
        self.pointers.get(name)
    }

    pub fn pointer_mut(&mut self, name: &str) -> Option<&mut PointerFact> {
        self.pointers.get_mut(name)
    }

    pub fn set_pointer(&mut self, name: &str, fact: PointerFact) {
        self.pointers.insert(name.to_string(), fact);
    }

    /// Whether `name` holds a pointer the tracker follows
    pub fn is_pointer(&self, name: &str) -> bool {
        self.pointers.contains_key(name)
            || self.decls.get(name).is_some_and(|k| k.is_pointer())
    }

    /// Pointer names in stable order
    pub fn pointer_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pointers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn is_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p == name)
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: ValueFact) {
        self.values.insert(key.into(), value);
    }

    /// Value fact for an access path; paths under a parameter inherit the
    /// parameter's label
    pub fn value(&self, expr: &Expr) -> Option<ValueFact> {
        if let Some(fact) = access_key(expr).and_then(|key| self.values.get(&key)) {
            return Some(*fact);
        }
        let root = expr.root_name()?;
        if self.is_param(root) {
            return Some(ValueFact::labeled(
                self.values
                    .get(root)
                    .map(|v| v.label)
                    .unwrap_or(TaintLabel::ExternalInput),
            ));
        }
        None
    }

    /// Declared kind of an access path (`user.email`, `board[i].name`)
    pub fn kind_of(&self, expr: &Expr) -> Option<&DeclKind> {
        match expr {
            Expr::Ident(name) => self.decls.get(name),
            Expr::Field { base, field, arrow } => {
                let base_kind = self.kind_of(base)?;
                let record = if *arrow {
                    base_kind.element()?
                } else {
                    base_kind
                };
                record.field(field).map(|f| &f.kind)
            }
            Expr::Index { base, .. } | Expr::Deref(base) => self.kind_of(base)?.element(),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Merge two branch outcomes
    pub fn join(&self, other: &FactTable) -> FactTable {
        if self.terminated {
            return other.clone();
        }
        if other.terminated {
            return self.clone();
        }

        let mut merged = self.clone();

        for (name, kind) in &other.decls {
            merged.decls.entry(name.clone()).or_insert_with(|| kind.clone());
        }
        for (name, buffer) in &other.buffers {
            merged
                .buffers
                .entry(name.clone())
                .and_modify(|mine| *mine = mine.join(buffer))
                .or_insert_with(|| buffer.clone());
        }
        for (name, pointer) in &other.pointers {
            merged
                .pointers
                .entry(name.clone())
                .and_modify(|mine| *mine = mine.join(pointer))
                .or_insert_with(|| pointer.clone());
        }
        for (key, value) in &other.values {
            merged
                .values
                .entry(key.clone())
                .and_modify(|mine| *mine = mine.join(value))
                .or_insert(*value);
        }

        merged
    }
}

impl ConstEnv for FactTable {
    fn sizeof_var(&self, name: &str) -> Option<u64> {
        self.decls.get(name).and_then(DeclKind::size_of)
    }
}

/// Key under which value facts for an access path are stored
pub(crate) fn access_key(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(_) | Expr::Field { .. } | Expr::Index { .. } | Expr::Deref(_) => {
            Some(expr.render())
        }
        _ => None,
    }
}
