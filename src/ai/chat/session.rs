use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::credential::CredentialResolver;
use super::models::{Transcript, TranscriptEvent, Turn};
use super::provisioner::{ClientProvisioner, ProvisionError};
use crate::ai::replies::{self, COMPLETION_ERROR, GREETING, MISSING_CREDENTIAL};
use crate::core::{AppConfig, ConfigProvider, DEFAULT_GEMINI_HOST, DEFAULT_GEMINI_MODEL, EnvConfig};
use crate::gemini::{ClientFactory, CompletionRequest, GeminiClientFactory};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    EmptyInput,
    AlreadyBusy,
}

/// Which path a submission took. Failures are already reflected in the
/// transcript by the time this is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(RejectReason),
    Answered,
    MissingCredential,
    Failed,
}

/// Holds the busy flag for one submission and releases it when dropped,
/// whichever way the submission ends.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A single dashboard conversation with the assistant.
///
/// Each accepted submission appends the user's turn followed by exactly
/// one assistant turn: the model's answer, or a fixed notice when the
/// credential is missing or the call fails. Only one submission may be
/// in flight at a time, others are rejected rather than queued.
///
/// Only the latest user text is sent to the model, earlier turns are not
/// passed along as context.
///
/// Use `ChatSession::builder()` to construct one.
pub struct ChatSession {
    id: String,
    model: String,
    system_instruction: String,
    transcript: Transcript,
    busy: Arc<AtomicBool>,
    draft: Mutex<String>,
    provisioner: ClientProvisioner,
}

impl ChatSession {
    pub fn builder() -> ChatSessionBuilder {
        ChatSessionBuilder::default()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::builder()
            .model(&config.gemini_model)
            .system_instruction(&config.system_instruction)
            .factory(Arc::new(GeminiClientFactory::new(&config.gemini_api_hostname)))
            .build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Arc<Vec<Turn>> {
        self.transcript.snapshot()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TranscriptEvent> {
        self.transcript.subscribe()
    }

    pub fn draft(&self) -> String {
        self.draft.lock().expect("Draft lock poisoned").clone()
    }

    pub fn update_draft(&self, text: &str) {
        *self.draft.lock().expect("Draft lock poisoned") = text.to_string();
    }

    pub fn provisioner(&self) -> &ClientProvisioner {
        &self.provisioner
    }

    /// Submit a message and wait for the assistant's turn to be
    /// appended. Never fails, see `SubmitOutcome`.
    pub async fn submit(&self, raw_text: &str) -> SubmitOutcome {
        let (text, guard) = match self.accept(raw_text) {
            Ok(accepted) => accepted,
            Err(reason) => return SubmitOutcome::Rejected(reason),
        };
        let outcome = self.complete(&text).await;
        drop(guard);
        outcome
    }

    /// Submit a message in the background. The user's turn is appended
    /// before this returns.
    pub fn spawn_submit(
        self: &Arc<Self>,
        raw_text: &str,
    ) -> Result<JoinHandle<SubmitOutcome>, RejectReason> {
        let (text, guard) = self.accept(raw_text)?;
        let session = Arc::clone(self);
        Ok(tokio::spawn(async move {
            let outcome = session.complete(&text).await;
            drop(guard);
            outcome
        }))
    }

    /// Validate the input and claim the session. On success the user's
    /// turn is in the transcript and the draft is cleared.
    fn accept(&self, raw_text: &str) -> Result<(String, BusyGuard), RejectReason> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(RejectReason::EmptyInput);
        }
        let guard = BusyGuard::acquire(&self.busy).ok_or(RejectReason::AlreadyBusy)?;

        self.transcript.append(Turn::user(text));
        self.update_draft("");

        Ok((text.to_string(), guard))
    }

    async fn complete(&self, text: &str) -> SubmitOutcome {
        let client = match self.provisioner.get_client().await {
            Ok(client) => client,
            Err(ProvisionError::NoCredential) => {
                tracing::warn!("Session {}: no API credential configured", self.id);
                self.transcript.append(Turn::assistant(MISSING_CREDENTIAL));
                return SubmitOutcome::MissingCredential;
            }
            Err(e) => {
                tracing::error!("Session {}: {}", self.id, e);
                self.transcript.append(Turn::assistant(COMPLETION_ERROR));
                return SubmitOutcome::Failed;
            }
        };

        let req = CompletionRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
            system_instruction: self.system_instruction.clone(),
        };

        match client.generate_content(&req).await {
            Ok(resp) => {
                let answer = replies::answer_text(resp.text);
                self.transcript.append(Turn::assistant(&answer));
                SubmitOutcome::Answered
            }
            Err(e) => {
                tracing::error!(
                    "Session {}: completion failed: {}. Root cause: {}",
                    self.id,
                    e,
                    e.root_cause()
                );
                self.transcript.append(Turn::assistant(COMPLETION_ERROR));
                SubmitOutcome::Failed
            }
        }
    }
}

pub struct ChatSessionBuilder {
    session_id: Option<String>,
    model: String,
    system_instruction: String,
    greeting: String,
    config: Arc<dyn ConfigProvider>,
    factory: Arc<dyn ClientFactory>,
}

impl Default for ChatSessionBuilder {
    fn default() -> Self {
        Self {
            session_id: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            system_instruction: replies::DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            greeting: GREETING.to_string(),
            config: Arc::new(EnvConfig),
            factory: Arc::new(GeminiClientFactory::new(DEFAULT_GEMINI_HOST)),
        }
    }
}

impl ChatSessionBuilder {
    pub fn build(self) -> ChatSession {
        let resolver = CredentialResolver::new(self.config);
        ChatSession {
            id: self
                .session_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            model: self.model,
            system_instruction: self.system_instruction,
            transcript: Transcript::new_with_turns(vec![Turn::assistant(&self.greeting)]),
            busy: Arc::new(AtomicBool::new(false)),
            draft: Mutex::new(String::new()),
            provisioner: ClientProvisioner::new(resolver, self.factory),
        }
    }

    pub fn session_id(mut self, id: &str) -> Self {
        self.session_id = Some(id.to_string());
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn system_instruction(mut self, instruction: &str) -> Self {
        self.system_instruction = instruction.to_string();
        self
    }

    pub fn greeting(mut self, greeting: &str) -> Self {
        self.greeting = greeting.to_string();
        self
    }

    pub fn config(mut self, config: Arc<dyn ConfigProvider>) -> Self {
        self.config = config;
        self
    }

    pub fn factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
        self.factory = factory;
        self
    }
}
