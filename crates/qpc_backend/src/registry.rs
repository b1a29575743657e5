//! Backend registry for QPC
//!
//! Gantree: L4_Backend → BackendRegistry
//!
//! Maps backend kinds to constructors and resolves the backend a program
//! needs into a [`BackendSelection`].

use crate::backend::Backend;
use crate::eqasm::EqasmBackend;
use crate::microcode::MicrocodeBackend;
use qpc_core::BackendKind;
use std::collections::HashMap;
use std::fmt;

/// Backend constructor
pub type BackendFactory = Box<dyn Fn() -> Box<dyn Backend> + Send + Sync>;

// ============================================================================
// Backend Selection
// ============================================================================

/// Outcome of resolving a backend kind
/// Gantree: BackendSelection // 백엔드 선택
pub enum BackendSelection {
    /// The kind needs no backend pass
    NotRequired,
    /// A backend is needed but none is registered for the kind
    Missing(BackendKind),
    /// Fresh backend instance
    Ready(Box<dyn Backend>),
}

impl BackendSelection {
    /// Check if a backend is available
    pub fn is_ready(&self) -> bool {
        matches!(self, BackendSelection::Ready(_))
    }
}

impl fmt::Debug for BackendSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendSelection::NotRequired => write!(f, "NotRequired"),
            BackendSelection::Missing(kind) => write!(f, "Missing({})", kind),
            BackendSelection::Ready(backend) => write!(f, "Ready({})", backend.name()),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Registry of backend constructors
/// Gantree: BackendRegistry // 백엔드 레지스트리
pub struct BackendRegistry {
    factories: HashMap<BackendKind, BackendFactory>,
}

impl BackendRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in backends
    /// Gantree: with_defaults() -> Self // 기본 백엔드
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(BackendKind::Qumis, || Box::new(MicrocodeBackend::new()));
        registry.register(BackendKind::CcLight, || Box::new(EqasmBackend::cc_light()));
        registry.register(BackendKind::Cc, || Box::new(EqasmBackend::cc()));
        registry
    }

    /// Register a constructor, replacing any previous one for the kind
    pub fn register<F>(&mut self, kind: BackendKind, factory: F)
    where
        F: Fn() -> Box<dyn Backend> + Send + Sync + 'static,
    {
        log::debug!("registering backend {}", kind);
        self.factories.insert(kind, Box::new(factory));
    }

    /// Remove the constructor for a kind
    pub fn unregister(&mut self, kind: BackendKind) -> bool {
        let removed = self.factories.remove(&kind).is_some();
        if removed {
            log::debug!("unregistered backend {}", kind);
        }
        removed
    }

    /// Check if a kind has a constructor
    pub fn contains(&self, kind: BackendKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Registered kinds
    pub fn kinds(&self) -> Vec<BackendKind> {
        let mut kinds: Vec<BackendKind> = self.factories.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }

    /// Number of registered constructors
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Resolve a backend kind
    /// Gantree: select(kind) -> BackendSelection // 백엔드 선택
    pub fn select(&self, kind: BackendKind) -> BackendSelection {
        if !kind.requires_backend() {
            return BackendSelection::NotRequired;
        }
        match self.factories.get(&kind) {
            Some(factory) => BackendSelection::Ready(factory()),
            None => BackendSelection::Missing(kind),
        }
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
