use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Mutex;

use super::credential::CredentialResolver;
use crate::gemini::{ClientFactory, CompletionClient};

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("no API credential is configured")]
    NoCredential,
    #[error("failed to construct completion client: {0}")]
    Construction(anyhow::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProvisionState {
    Uninitialized,
    /// A caller is resolving the credential or building the client.
    Initializing,
    Ready,
    /// The last attempt found no credential. Retried on the next call.
    Unavailable,
}

enum Slot {
    Uninitialized,
    Unavailable,
    Ready(Arc<dyn CompletionClient>),
}

impl Slot {
    fn state(&self) -> ProvisionState {
        match self {
            Slot::Uninitialized => ProvisionState::Uninitialized,
            Slot::Unavailable => ProvisionState::Unavailable,
            Slot::Ready(_) => ProvisionState::Ready,
        }
    }
}

/// Marks a resolution in progress until dropped.
struct InitializingGuard<'a>(&'a AtomicBool);

impl<'a> InitializingGuard<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for InitializingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Lazily builds the completion client on first use and hands out the
/// same instance afterwards.
///
/// The slot lock is held across construction, so callers arriving while
/// a client is being built wait for that client instead of building a
/// second one.
pub struct ClientProvisioner {
    resolver: CredentialResolver,
    factory: Arc<dyn ClientFactory>,
    slot: Mutex<Slot>,
    // Last settled state of `slot`, readable without taking its lock
    settled: std::sync::Mutex<ProvisionState>,
    initializing: AtomicBool,
    constructions: AtomicUsize,
}

impl ClientProvisioner {
    pub fn new(resolver: CredentialResolver, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            resolver,
            factory,
            slot: Mutex::new(Slot::Uninitialized),
            settled: std::sync::Mutex::new(ProvisionState::Uninitialized),
            initializing: AtomicBool::new(false),
            constructions: AtomicUsize::new(0),
        }
    }

    pub async fn get_client(&self) -> Result<Arc<dyn CompletionClient>, ProvisionError> {
        let mut slot = self.slot.lock().await;
        if let Slot::Ready(client) = &*slot {
            return Ok(Arc::clone(client));
        }

        let _initializing = InitializingGuard::start(&self.initializing);

        let Some(api_key) = self.resolver.resolve() else {
            *slot = Slot::Unavailable;
            self.settle(&slot);
            return Err(ProvisionError::NoCredential);
        };

        self.constructions.fetch_add(1, Ordering::SeqCst);
        let client = self
            .factory
            .create(&api_key)
            .await
            .map_err(ProvisionError::Construction)?;
        tracing::debug!("Completion client ready");
        *slot = Slot::Ready(Arc::clone(&client));
        self.settle(&slot);

        Ok(client)
    }

    fn settle(&self, slot: &Slot) {
        *self.settled.lock().expect("Provision state lock poisoned") = slot.state();
    }

    /// `Initializing` only while a caller is resolving the credential
    /// or building the client. Callers merely reusing a ready client
    /// don't change the reported state.
    pub fn state(&self) -> ProvisionState {
        if self.initializing.load(Ordering::SeqCst) {
            return ProvisionState::Initializing;
        }
        *self.settled.lock().expect("Provision state lock poisoned")
    }

    /// Number of times the factory has been asked to build a client.
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}
