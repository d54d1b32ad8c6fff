//! Named resource tables and preload accounting.
//!
//! Resources are only descriptors here: the host loads the actual bytes and
//! reports completion back through
//! [`AppEvent::ResourceLoaded`](crate::events::AppEvent::ResourceLoaded).

use std::collections::HashMap;
use std::fmt;

/// Category a resource is registered under. Names are unique per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Bitmap,
    Sound,
    Font,
    Brush,
    Shape,
    Material,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Bitmap => "bitmap",
            ResourceKind::Sound => "sound",
            ResourceKind::Font => "font",
            ResourceKind::Brush => "brush",
            ResourceKind::Shape => "shape",
            ResourceKind::Material => "material",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
    /// Location handed to the host loader
    pub src: String,
    /// Must finish loading before scenes start
    pub preload: bool,
    pub loaded: bool,
    /// Load finished with an error
    pub failed: bool,
}

impl Resource {
    pub fn new(kind: ResourceKind, name: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            src: src.into(),
            preload: true,
            loaded: false,
            failed: false,
        }
    }

    /// Load lazily instead of before startup.
    pub fn lazy(mut self) -> Self {
        self.preload = false;
        self
    }

    pub fn needs_loading(&self) -> bool {
        self.preload && !self.loaded
    }
}

/// What [`Resources::mark_loaded`] found for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkLoaded {
    /// A preload resource still waiting on its first report
    Pending,
    /// A lazy resource, or one that had already reported
    Settled,
    NotFound,
}

/// Resource tables keyed by kind. Lookups are linear scans.
#[derive(Debug, Default)]
pub struct Resources {
    tables: HashMap<ResourceKind, Vec<Resource>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource. A resource of the same kind and name is replaced.
    pub fn add(&mut self, resource: Resource) {
        let table = self.tables.entry(resource.kind).or_default();
        match table.iter_mut().find(|r| r.name == resource.name) {
            Some(existing) => *existing = resource,
            None => table.push(resource),
        }
    }

    pub fn remove(&mut self, name: &str, kind: ResourceKind) -> Option<Resource> {
        let table = self.tables.get_mut(&kind)?;
        let index = table.iter().position(|r| r.name == name)?;
        Some(table.remove(index))
    }

    pub fn find(&self, name: &str, kind: ResourceKind) -> Option<&Resource> {
        self.tables.get(&kind)?.iter().find(|r| r.name == name)
    }

    pub fn find_mut(&mut self, name: &str, kind: ResourceKind) -> Option<&mut Resource> {
        self.tables.get_mut(&kind)?.iter_mut().find(|r| r.name == name)
    }

    /// Flag a resource as finished. A repeated report only updates `failed`.
    pub fn mark_loaded(&mut self, name: &str, kind: ResourceKind, failed: bool) -> MarkLoaded {
        match self.find_mut(name, kind) {
            Some(resource) => {
                let was_pending = resource.needs_loading();
                resource.loaded = true;
                resource.failed = failed;
                if was_pending {
                    MarkLoaded::Pending
                } else {
                    MarkLoaded::Settled
                }
            }
            None => MarkLoaded::NotFound,
        }
    }

    /// Preload resources that have not reported in yet.
    pub fn count_need_loading(&self) -> usize {
        self.iter().filter(|r| r.needs_loading()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.tables.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Running totals for the loading phase.
///
/// Loading is complete once the number of reported loads (successful or
/// not) reaches the expected total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadTracker {
    pub total_to_load: usize,
    pub total_loaded: usize,
    pub total_load_errors: usize,
}

impl LoadTracker {
    pub fn new(total_to_load: usize) -> Self {
        Self {
            total_to_load,
            ..Self::default()
        }
    }

    pub fn record(&mut self, success: bool) {
        self.total_loaded += 1;
        if !success {
            self.total_load_errors += 1;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_loaded >= self.total_to_load
    }

    /// Fraction reported so far, 1.0 when nothing was expected.
    pub fn progress(&self) -> f32 {
        if self.total_to_load == 0 {
            1.0
        } else {
            (self.total_loaded as f32 / self.total_to_load as f32).min(1.0)
        }
    }
}
