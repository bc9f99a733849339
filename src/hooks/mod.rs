pub mod editor_sync;

pub use editor_sync::{EditorSyncHook, EDITOR_TARGET_ID, EDITOR_UPDATED_EVENT};

use std::collections::HashMap;

use anyhow::{bail, Result};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::dom::Element;
use crate::session::SessionHandle;

/// A client-side binding attached to a specific element, customizing its
/// behavior beyond static markup.
pub trait Hook: Send {
    /// Called when the element enters the page. The session is already
    /// active; hooks never manage its lifecycle.
    fn mounted(&mut self, host: &Element, session: SessionHandle) -> Result<()>;

    /// Called when the element leaves the page. After this returns the hook
    /// must produce no further outbound events.
    fn destroyed(&mut self) {}
}

pub type HookFactory = Box<dyn Fn() -> Box<dyn Hook> + Send + Sync>;

/// Hooks available to element bindings, by name, plus the set of live
/// bindings. At most one binding exists per element id at any time.
pub struct HookRegistry {
    factories: HashMap<String, HookFactory>,
    mounted: DashMap<String, Mutex<Box<dyn Hook>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            mounted: DashMap::new(),
        }
    }

    /// Registry with the stock hooks registered.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(editor_sync::HOOK_NAME, || {
            Box::new(EditorSyncHook::new()) as Box<dyn Hook>
        });
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn Hook> + Send + Sync + 'static,
    ) {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Instantiate the hook declared on `host` and bind it. The host must
    /// carry a stable id and a known hook name; a second mount for the same
    /// element id is rejected.
    pub fn mount(&self, host: &Element, session: SessionHandle) -> Result<()> {
        let Some(id) = host.id() else {
            bail!("hooked element requires an id");
        };
        let Some(name) = host.hook_name() else {
            bail!("element #{id} declares no hook");
        };
        let Some(factory) = self.factories.get(name) else {
            bail!("unknown hook: {name}");
        };
        if self.mounted.contains_key(id) {
            bail!("element #{id} already has a live binding");
        }

        let mut hook = factory();
        hook.mounted(host, session)?;
        self.mounted.insert(id.to_string(), Mutex::new(hook));
        tracing::debug!(element = id, hook = name, "hook mounted");
        Ok(())
    }

    /// Tear down the binding for an element. Returns false when the element
    /// has no live binding.
    pub fn unmount(&self, element_id: &str) -> bool {
        match self.mounted.remove(element_id) {
            Some((_, hook)) => {
                hook.into_inner().destroyed();
                tracing::debug!(element = element_id, "hook unmounted");
                true
            }
            None => false,
        }
    }

    pub fn is_mounted(&self, element_id: &str) -> bool {
        self.mounted.contains_key(element_id)
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
