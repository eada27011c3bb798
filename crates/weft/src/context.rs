//! Immutable correlation context values.
//!
//! A context pairs the correlation id of one logical request with the
//! nesting depth of the current frame. Transitions never mutate in place;
//! they derive a new value, so a context handed out earlier can never be
//! aliased into a stale depth.

use uuid::Uuid;

/// Correlation id + nesting depth for one frame of a traced call chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    id: String,
    depth: u32,
}

impl TraceContext {
    /// Create the context for the outermost frame of a new flow, with a
    /// freshly generated id (first 8 hex characters of a v4 UUID).
    pub fn root() -> Self {
        let mut id = Uuid::new_v4().to_string();
        id.truncate(8);
        Self { id, depth: 0 }
    }

    /// The correlation identifier shared by every frame of this flow.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Nesting depth; 0 is the outermost frame.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether this is the outermost frame.
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// Derive the context for a nested call: same id, depth + 1.
    pub fn descend(&self) -> Self {
        Self {
            id: self.id.clone(),
            depth: self.depth + 1,
        }
    }

    /// Derive the context for returning from this frame: same id, depth - 1.
    ///
    /// Returns `None` when the outermost frame closes; the flow is finished
    /// and the context is discarded entirely.
    pub fn ascend(&self) -> Option<Self> {
        if self.depth == 0 {
            None
        } else {
            Some(Self {
                id: self.id.clone(),
                depth: self.depth - 1,
            })
        }
    }
}
