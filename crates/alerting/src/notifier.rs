//! Notifier backends
//!
//! Backends are checked once at startup and kept in rank order. Delivery
//! uses the highest-ranked backend and falls through to the next one only
//! when it reports a failure.

use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::AlertError;

/// A way of getting the user's attention
pub trait Notifier: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Whether this backend can work on the current host
    fn is_available(&self) -> bool;

    /// Deliver one alert. Must not block on the cue finishing.
    fn notify(&self) -> Result<(), AlertError>;
}

/// Spoken cue through a text-to-speech executable (`say` on macOS)
#[derive(Debug, Clone)]
pub struct SpeechNotifier {
    program: String,
    phrase: String,
}

impl SpeechNotifier {
    pub fn new(program: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            phrase: phrase.into(),
        }
    }
}

impl Default for SpeechNotifier {
    fn default() -> Self {
        Self::new("say", "Stay Focused")
    }
}

impl Notifier for SpeechNotifier {
    fn name(&self) -> &'static str {
        "speech"
    }

    fn is_available(&self) -> bool {
        on_path(&self.program)
    }

    /// Spawns the speech program on the current Tokio runtime and returns
    /// without waiting for it; the runtime reaps the finished process.
    fn notify(&self) -> Result<(), AlertError> {
        let backend_err = |reason: String| AlertError::Backend {
            backend: self.name(),
            reason,
        };
        let runtime = Handle::try_current().map_err(|e| backend_err(e.to_string()))?;
        let _guard = runtime.enter();

        Command::new(&self.program)
            .arg(&self.phrase)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| backend_err(e.to_string()))?;

        debug!("Speech cue started: {}", self.program);
        Ok(())
    }
}

/// Terminal bell on stderr. Always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl Notifier for TerminalBell {
    fn name(&self) -> &'static str {
        "bell"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn notify(&self) -> Result<(), AlertError> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")
            .and_then(|_| err.flush())
            .map_err(|e| AlertError::Backend {
                backend: self.name(),
                reason: e.to_string(),
            })
    }
}

/// Swallows alerts (muted deployments, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn name(&self) -> &'static str {
        "null"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn notify(&self) -> Result<(), AlertError> {
        Ok(())
    }
}

/// Ranked list of available backends
#[derive(Clone, Default)]
pub struct NotifierChain {
    backends: Vec<Arc<dyn Notifier>>,
}

impl NotifierChain {
    /// Keep the available candidates, preserving their rank order
    pub fn detect(candidates: Vec<Arc<dyn Notifier>>) -> Self {
        let backends: Vec<_> = candidates
            .into_iter()
            .filter(|backend| {
                let available = backend.is_available();
                debug!("Notifier {} available: {}", backend.name(), available);
                available
            })
            .collect();

        match backends.first() {
            Some(first) => info!("Using {} notifier ({} available)", first.name(), backends.len()),
            None => warn!("No notifier backend available, alerts will be dropped"),
        }

        Self { backends }
    }

    /// Names of the selected backends in rank order
    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl std::fmt::Debug for NotifierChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierChain")
            .field("backends", &self.backend_names())
            .finish()
    }
}

impl Notifier for NotifierChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn is_available(&self) -> bool {
        !self.backends.is_empty()
    }

    fn notify(&self) -> Result<(), AlertError> {
        let mut last_err = AlertError::NoBackend;
        for backend in &self.backends {
            match backend.notify() {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("Notifier {} failed, trying next: {}", backend.name(), e);
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

fn on_path(program: &str) -> bool {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        available: bool,
        fail: bool,
        calls: AtomicUsize,
    }

    impl Counting {
        fn new(available: bool, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                available,
                fail,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Notifier for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn notify(&self) -> Result<(), AlertError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AlertError::Backend {
                    backend: "counting",
                    reason: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn ranked(backends: &[&Arc<Counting>]) -> Vec<Arc<dyn Notifier>> {
        backends
            .iter()
            .map(|b| Arc::clone(*b) as Arc<dyn Notifier>)
            .collect()
    }

    #[test]
    fn test_detect_drops_unavailable_backends() {
        let missing = Counting::new(false, false);
        let present = Counting::new(true, false);
        let chain = NotifierChain::detect(ranked(&[&missing, &present]));

        assert_eq!(chain.backend_names(), vec!["counting"]);
        chain.notify().unwrap();
        assert_eq!(missing.calls.load(Ordering::SeqCst), 0);
        assert_eq!(present.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_backend_wins() {
        let first = Counting::new(true, false);
        let second = Counting::new(true, false);
        let chain = NotifierChain::detect(ranked(&[&first, &second]));

        chain.notify().unwrap();
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_falls_through_on_failure() {
        let broken = Counting::new(true, true);
        let fallback = Counting::new(true, false);
        let chain = NotifierChain::detect(ranked(&[&broken, &fallback]));

        chain.notify().unwrap();
        assert_eq!(broken.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_chain_reports_no_backend() {
        let chain = NotifierChain::detect(ranked(&[&Counting::new(false, false)]));
        assert!(chain.is_empty());
        assert!(matches!(chain.notify(), Err(AlertError::NoBackend)));
    }

    #[test]
    fn test_speech_outside_runtime_reports_backend_error() {
        let speech = SpeechNotifier::new("definitely-not-a-real-tts-binary", "hi");
        assert!(matches!(
            speech.notify(),
            Err(AlertError::Backend { backend: "speech", .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_speech_program_fails_to_spawn() {
        let speech = SpeechNotifier::new("definitely-not-a-real-tts-binary", "hi");
        assert!(matches!(
            speech.notify(),
            Err(AlertError::Backend { backend: "speech", .. })
        ));
    }

    #[test]
    fn test_missing_speech_program_is_unavailable() {
        let speech = SpeechNotifier::new("definitely-not-a-real-tts-binary", "hi");
        assert!(!speech.is_available());
    }
}
