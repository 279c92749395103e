/*
 * Pointer Lifecycle
 *
 * Finite-state machine per pointer variable.
 *
 * ```text
 * States: {Uninitialized, Allocated, Freed, Escaped}
 * Transitions:
 *   *           --allocate-->    Allocated
 *   *           --reset-->       Uninitialized
 *   Allocated   --deallocate-->  Freed
 *   Uninit.     --deallocate-->  Freed
 *   Escaped     --deallocate-->  Freed
 *   Freed       --deallocate-->  Freed        (double free)
 *   Freed       --use-->         Freed        (use after free)
 *   Freed       --escape-->      Freed        (use after free)
 *   Allocated   --escape-->      Escaped
 *   Uninit.     --escape-->      Uninitialized
 * ```
 *
 * Illegal transitions are the only source of double-free and
 * use-after-free findings.
 */

use serde::{Deserialize, Serialize};

/// Lifecycle state of a pointer variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerState {
    /// Not pointing at an owned allocation (never assigned, NULL, or
    /// non-owning value)
    Uninitialized,
    Allocated,
    Freed,
    /// Ownership left the function (returned, stored, handed to a callee)
    Escaped,
}

/// Event applied to a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerEvent {
    Allocate,
    Deallocate,
    /// Dereference, member access, or use as a call argument
    Use,
    Escape,
    /// Assigned a non-owning value (NULL, literal, unknown call result)
    Reset,
}

/// Illegal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleViolation {
    DoubleFree,
    UseAfterFree,
}

/// Result of applying an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: PointerState,
    pub violation: Option<LifecycleViolation>,
}

impl Transition {
    fn ok(next: PointerState) -> Self {
        Self {
            next,
            violation: None,
        }
    }

    fn violated(next: PointerState, violation: LifecycleViolation) -> Self {
        Self {
            next,
            violation: Some(violation),
        }
    }
}

impl PointerState {
    /// Transition table
    pub fn apply(self, event: PointerEvent) -> Transition {
        use PointerEvent as E;
        use PointerState as S;

        match (self, event) {
            (_, E::Allocate) => Transition::ok(S::Allocated),
            (_, E::Reset) => Transition::ok(S::Uninitialized),

            (S::Freed, E::Deallocate) => {
                Transition::violated(S::Freed, LifecycleViolation::DoubleFree)
            }
            (_, E::Deallocate) => Transition::ok(S::Freed),

            (S::Freed, E::Use) | (S::Freed, E::Escape) => {
                Transition::violated(S::Freed, LifecycleViolation::UseAfterFree)
            }
            (state, E::Use) => Transition::ok(state),

            (S::Allocated, E::Escape) => Transition::ok(S::Escaped),
            (state, E::Escape) => Transition::ok(state),
        }
    }

    /// Join at a control-flow merge.
    ///
    /// `Uninitialized` is the identity; `Escaped` absorbs everything; when
    /// one path freed and the other did not, the allocation is still live.
    pub fn join(self, other: PointerState) -> PointerState {
        use PointerState as S;

        match (self, other) {
            (a, b) if a == b => a,
            (S::Uninitialized, x) | (x, S::Uninitialized) => x,
            (S::Escaped, _) | (_, S::Escaped) => S::Escaped,
            _ => S::Allocated,
        }
    }

    /// Whether the function still owns a live allocation
    pub fn owns_allocation(&self) -> bool {
        matches!(self, PointerState::Allocated)
    }
}

impl std::fmt::Display for PointerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointerState::Uninitialized => write!(f, "Uninitialized"),
            PointerState::Allocated => write!(f, "Allocated"),
            PointerState::Freed => write!(f, "Freed"),
            PointerState::Escaped => write!(f, "Escaped"),
        }
    }
}
