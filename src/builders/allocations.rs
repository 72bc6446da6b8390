//! Backend for allocation events.

use crate::cct::CctNode;
use crate::engine::{GraphBackend, ProfilingMode, ProfilingSession};
use crate::utils::error::EngineError;
use log::debug;
use std::sync::Arc;

/// One allocation record: a site path, the allocated class, byte and
/// object counts. `site` uses the collapsed form "outer;inner".
#[derive(Debug, Clone)]
pub struct AllocationEvent {
    pub site: String,
    pub class_name: String,
    pub bytes: u64,
    pub count: u64,
}

/// Aggregates allocation events into a CCT: allocation-site frames
/// with the allocated class as the innermost frame, weighted by bytes,
/// hits counting allocated objects.
#[derive(Default)]
pub struct AllocationsBackend {
    root: Option<CctNode>,
}

impl AllocationsBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphBackend for AllocationsBackend {
    type Event = AllocationEvent;

    fn on_startup(&mut self, session: &Arc<ProfilingSession>) -> Result<(), EngineError> {
        if session.mode() != ProfilingMode::Allocations {
            return Err(EngineError::Backend(format!(
                "allocations backend bound to a {} session",
                session.mode()
            )));
        }
        debug!("Allocations backend attached to session '{}'", session.name());
        Ok(())
    }

    fn prepare_batch(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn record(&mut self, event: AllocationEvent) -> bool {
        if event.class_name.is_empty() {
            return false;
        }

        let mut frames: Vec<&str> = event
            .site
            .split(';')
            .filter(|f| !f.is_empty())
            .collect();
        frames.push(&event.class_name);

        self.root
            .get_or_insert_with(|| CctNode::new("root"))
            .insert_path_counted(&frames, event.bytes, event.count.max(1));
        true
    }

    fn finalize_batch(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn discard(&mut self) -> Result<(), EngineError> {
        self.root = None;
        Ok(())
    }

    fn on_shutdown(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn root(&self) -> Option<&CctNode> {
        self.root.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(site: &str, class_name: &str, bytes: u64, count: u64) -> AllocationEvent {
        AllocationEvent {
            site: site.to_string(),
            class_name: class_name.to_string(),
            bytes,
            count,
        }
    }

    #[test]
    fn test_site_path_with_class_leaf() {
        let mut backend = AllocationsBackend::new();
        assert!(backend.record(event("main;handler", "Buffer", 4096, 2)));

        let root = backend.root().unwrap();
        let leaf = &root.children["main"].children["handler"].children["Buffer"];
        assert_eq!(leaf.self_weight, 4096);
        assert_eq!(leaf.hits, 2);
    }

    #[test]
    fn test_empty_class_name_rejected() {
        let mut backend = AllocationsBackend::new();
        assert!(!backend.record(event("main", "", 128, 1)));
        assert!(backend.root().is_none());
    }

    #[test]
    fn test_empty_site_allocates_at_top_level() {
        let mut backend = AllocationsBackend::new();
        assert!(backend.record(event("", "String", 64, 1)));

        let root = backend.root().unwrap();
        assert_eq!(root.children["String"].self_weight, 64);
    }

    #[test]
    fn test_zero_count_treated_as_one() {
        let mut backend = AllocationsBackend::new();
        backend.record(event("main", "Vec", 32, 0));
        let leaf = &backend.root().unwrap().children["main"].children["Vec"];
        assert_eq!(leaf.hits, 1);
    }
}
