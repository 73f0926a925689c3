//! Mock capability implementations.
//!
//! Probes are shared `Arc`s so tests can assert instance liveness and
//! call counts after the session under test has released everything.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use overtime_core::config::EngineConfig;
use overtime_core::playback::{
    AdaptiveEngine, AdaptiveEngineFactory, MediaElement, PlayRejected, PlayerUiHandle,
    PlayerUiOptions, PlayerUiProvider,
};
use parking_lot::Mutex;

/// Records adaptive-engine activity across the trait-object boundary.
#[derive(Default)]
pub struct EngineProbe {
    pub created: AtomicUsize,
    pub destroyed: AtomicUsize,
    pub start_load_calls: AtomicUsize,
    pub recover_media_calls: AtomicUsize,
    pub attach_calls: AtomicUsize,
    pub loaded_sources: Mutex<Vec<String>>,
}

impl EngineProbe {
    pub fn live_engines(&self) -> usize {
        self.created.load(Ordering::SeqCst) - self.destroyed.load(Ordering::SeqCst)
    }

    pub fn engines_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

pub struct MockEngineFactory {
    supported: bool,
    probe: Arc<EngineProbe>,
}

impl MockEngineFactory {
    pub fn supported(probe: Arc<EngineProbe>) -> Arc<Self> {
        Arc::new(Self {
            supported: true,
            probe,
        })
    }

    pub fn unsupported(probe: Arc<EngineProbe>) -> Arc<Self> {
        Arc::new(Self {
            supported: false,
            probe,
        })
    }
}

impl AdaptiveEngineFactory for MockEngineFactory {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, _config: &EngineConfig) -> Box<dyn AdaptiveEngine> {
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        Box::new(MockEngine {
            probe: self.probe.clone(),
            destroyed: false,
        })
    }
}

struct MockEngine {
    probe: Arc<EngineProbe>,
    destroyed: bool,
}

impl AdaptiveEngine for MockEngine {
    fn load_source(&mut self, url: &str) {
        self.probe.loaded_sources.lock().push(url.to_string());
    }

    fn attach_media(&mut self) {
        self.probe.attach_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn start_load(&mut self) {
        self.probe.start_load_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn recover_media_error(&mut self) {
        self.probe.recover_media_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.probe.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Media element recording assigned sources and play requests.
pub struct MockMediaElement {
    pub native_hls: bool,
    pub reject_play: bool,
    pub sources: Mutex<Vec<String>>,
    pub play_requests: AtomicUsize,
}

impl MockMediaElement {
    pub fn browser() -> Arc<Self> {
        Arc::new(Self {
            native_hls: false,
            reject_play: false,
            sources: Mutex::new(Vec::new()),
            play_requests: AtomicUsize::new(0),
        })
    }

    pub fn with_native_hls() -> Arc<Self> {
        Arc::new(Self {
            native_hls: true,
            reject_play: false,
            sources: Mutex::new(Vec::new()),
            play_requests: AtomicUsize::new(0),
        })
    }

    pub fn rejecting_autoplay() -> Arc<Self> {
        Arc::new(Self {
            native_hls: false,
            reject_play: true,
            sources: Mutex::new(Vec::new()),
            play_requests: AtomicUsize::new(0),
        })
    }

    pub fn play_request_count(&self) -> usize {
        self.play_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaElement for MockMediaElement {
    fn set_source(&self, url: &str) {
        self.sources.lock().push(url.to_string());
    }

    fn can_play_hls_natively(&self) -> bool {
        self.native_hls
    }

    async fn request_play(&self) -> Result<(), PlayRejected> {
        self.play_requests.fetch_add(1, Ordering::SeqCst);
        if self.reject_play {
            return Err(PlayRejected {
                reason: "autoplay policy".to_string(),
            });
        }
        Ok(())
    }
}

/// Records player-UI instance liveness.
#[derive(Default)]
pub struct UiProbe {
    pub created: AtomicUsize,
    pub destroyed: AtomicUsize,
}

impl UiProbe {
    pub fn live_instances(&self) -> usize {
        self.created.load(Ordering::SeqCst) - self.destroyed.load(Ordering::SeqCst)
    }
}

pub struct MockPlayerUi {
    probe: Arc<UiProbe>,
}

impl MockPlayerUi {
    pub fn provider(probe: Arc<UiProbe>) -> Arc<Self> {
        Arc::new(Self { probe })
    }
}

impl PlayerUiProvider for MockPlayerUi {
    fn wrap(
        &self,
        _media: Arc<dyn MediaElement>,
        _options: PlayerUiOptions,
    ) -> Box<dyn PlayerUiHandle> {
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        Box::new(MockUiHandle {
            probe: self.probe.clone(),
            destroyed: false,
        })
    }
}

struct MockUiHandle {
    probe: Arc<UiProbe>,
    destroyed: bool,
}

impl PlayerUiHandle for MockUiHandle {
    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.probe.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }
}
