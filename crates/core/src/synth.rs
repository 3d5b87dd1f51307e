#[cfg(any(test, feature = "test-support"))]
use std::cell::RefCell;
#[cfg(any(test, feature = "test-support"))]
use std::collections::VecDeque;

/// What a synthesis backend reports for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisOutcome {
    Success(Vec<u8>),
    /// The service asked us to slow down; worth retrying after a pause.
    RateLimited,
    Rejected(String),
}

impl SynthesisOutcome {
    pub fn is_retriable(&self) -> bool {
        matches!(self, SynthesisOutcome::RateLimited)
    }
}

/// Turns text into audio bytes for a given voice.
pub trait SynthesisBackend {
    fn synthesize(&self, text: &str, voice_id: &str) -> SynthesisOutcome;
}

impl<B: SynthesisBackend + ?Sized> SynthesisBackend for &B {
    fn synthesize(&self, text: &str, voice_id: &str) -> SynthesisOutcome {
        (**self).synthesize(text, voice_id)
    }
}

/// Backend that replays queued outcomes and records every request.
///
/// Once the script runs out it answers with `fallback`.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug)]
pub struct ScriptedBackend {
    script: RefCell<VecDeque<SynthesisOutcome>>,
    fallback: SynthesisOutcome,
    calls: RefCell<Vec<(String, String)>>,
}

#[cfg(any(test, feature = "test-support"))]
impl ScriptedBackend {
    pub fn new(script: impl IntoIterator<Item = SynthesisOutcome>) -> Self {
        Self {
            script: RefCell::new(script.into_iter().collect()),
            fallback: SynthesisOutcome::Success(b"audio".to_vec()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn always(outcome: SynthesisOutcome) -> Self {
        Self {
            fallback: outcome,
            ..Self::new([])
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl SynthesisBackend for ScriptedBackend {
    fn synthesize(&self, text: &str, voice_id: &str) -> SynthesisOutcome {
        self.calls
            .borrow_mut()
            .push((text.to_string(), voice_id.to_string()));
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
