//! Backend for sampled CPU stacks.

use crate::cct::CctNode;
use crate::engine::{GraphBackend, ProfilingMode, ProfilingSession};
use crate::utils::error::EngineError;
use log::debug;
use std::sync::Arc;

/// One sampled call stack, outermost frame first
#[derive(Debug, Clone)]
pub struct StackSample {
    pub frames: Vec<String>,
    pub weight: u64,
}

/// Aggregates stack samples into a CCT.
///
/// The tree root is created lazily by the first recorded sample, so
/// `root()` stays None (and batch notifications stay suppressed) until
/// the stream actually produced data.
#[derive(Default)]
pub struct SampledStacksBackend {
    root: Option<CctNode>,
}

impl SampledStacksBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphBackend for SampledStacksBackend {
    type Event = StackSample;

    fn on_startup(&mut self, session: &Arc<ProfilingSession>) -> Result<(), EngineError> {
        if session.mode() != ProfilingMode::CpuSampled {
            return Err(EngineError::Backend(format!(
                "sampled-stacks backend bound to a {} session",
                session.mode()
            )));
        }
        debug!("Sampled-stacks backend attached to session '{}'", session.name());
        Ok(())
    }

    fn prepare_batch(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn record(&mut self, event: StackSample) -> bool {
        if event.frames.is_empty() {
            return false;
        }
        self.root
            .get_or_insert_with(|| CctNode::new("root"))
            .insert_path(&event.frames, event.weight);
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

    #[test]
    fn test_root_lazy_until_first_sample() {
        let mut backend = SampledStacksBackend::new();
        assert!(backend.root().is_none());

        assert!(backend.record(StackSample {
            frames: vec!["main".into(), "work".into()],
            weight: 7,
        }));

        let root = backend.root().unwrap();
        assert_eq!(root.total_weight, 7);
        assert_eq!(root.children["main"].children["work"].self_weight, 7);
    }

    #[test]
    fn test_empty_stack_does_not_dirty() {
        let mut backend = SampledStacksBackend::new();
        assert!(!backend.record(StackSample {
            frames: vec![],
            weight: 100,
        }));
        assert!(backend.root().is_none());
    }

    #[test]
    fn test_discard_drops_tree() {
        let mut backend = SampledStacksBackend::new();
        backend.record(StackSample {
            frames: vec!["main".into()],
            weight: 1,
        });
        backend.discard().unwrap();
        assert!(backend.root().is_none());
    }
}
