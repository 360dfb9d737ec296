use crate::chat::ChatSession;
use crate::llm::{GenerationError, GenerationProvider, GenerationSession, ImageAttachment};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ── Scripted provider ───────────────────────────────────────

/// One canned behaviour for the next `send`.
#[derive(Clone)]
pub enum Step {
    Reply(&'static str),
    /// Service-reported failure, classified like a real API error.
    ServiceError(u16, &'static str),
    Network(&'static str),
    /// Never completes.
    Hang,
    /// Waits for the gate before replying.
    Gated(Arc<Notify>, &'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub session: usize,
    pub text: String,
    pub image_mime: Option<String>,
}

/// Provider double that plays a script of steps and records each call.
/// An exhausted script answers "ok".
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<VecDeque<Step>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    opened: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        let provider = Self::default();
        provider.script.lock().unwrap().extend(steps);
        provider
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl GenerationProvider for ScriptedProvider {
    fn id(&self) -> &str {
        "scripted"
    }

    fn open_session(&self, _system_instruction: &str) -> Box<dyn GenerationSession> {
        let session = self.opened.fetch_add(1, Ordering::SeqCst);
        Box::new(ScriptedSession {
            session,
            provider: self.clone(),
        })
    }
}

struct ScriptedSession {
    session: usize,
    provider: ScriptedProvider,
}

#[async_trait]
impl GenerationSession for ScriptedSession {
    async fn send(
        &mut self,
        text: &str,
        image: Option<&ImageAttachment>,
    ) -> Result<String, GenerationError> {
        self.provider.calls.lock().unwrap().push(RecordedCall {
            session: self.session,
            text: text.to_string(),
            image_mime: image.map(|i| i.mime_type().to_string()),
        });
        let step = self.provider.script.lock().unwrap().pop_front();

        match step {
            None => Ok("ok".to_string()),
            Some(Step::Reply(text)) => Ok(text.to_string()),
            Some(Step::ServiceError(status, message)) => {
                Err(GenerationError::from_service(status, message))
            }
            Some(Step::Network(message)) => Err(GenerationError::Network(message.to_string())),
            Some(Step::Hang) => std::future::pending().await,
            Some(Step::Gated(gate, text)) => {
                gate.notified().await;
                Ok(text.to_string())
            }
        }
    }
}

// ── Session setup ───────────────────────────────────────────

pub fn session_with(steps: impl IntoIterator<Item = Step>) -> (Arc<ChatSession>, ScriptedProvider) {
    let provider = ScriptedProvider::new(steps);
    let session = Arc::new(ChatSession::new(Arc::new(provider.clone())));
    (session, provider)
}

// ── Image byte generators ───────────────────────────────────

/// PNG magic header padded to `size`.
pub fn make_png_bytes(size: usize) -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.resize(size.max(8), 0xAA);
    bytes
}

pub fn png_attachment() -> ImageAttachment {
    ImageAttachment::from_bytes(make_png_bytes(64)).unwrap()
}

// ── Barriers ────────────────────────────────────────────────

const WAIT_DEADLINE: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Poll `done` with a timer sleep between checks, so the polling task parks
/// and spawned turns get scheduled on any runtime flavour.
pub async fn wait_for(what: &str, mut done: impl FnMut() -> bool) {
    let polled = tokio::time::timeout(WAIT_DEADLINE, async {
        while !done() {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "timed out waiting until {}", what);
}

/// Wait until the provider has received `n` calls. The turn that made the
/// last call holds the sending guard and has already taken its staged image.
pub async fn wait_for_calls(provider: &ScriptedProvider, n: usize) {
    wait_for("the provider is called", || provider.calls().len() >= n).await;
}
