//! The dashboard chat session: transcript, client provisioning and
//! turn submission.
mod credential;
mod models;
mod provisioner;
mod session;

pub use credential::{CREDENTIAL_KEYS, CredentialResolver};
pub use models::{Role, Transcript, TranscriptEvent, Turn};
pub use provisioner::{ClientProvisioner, ProvisionError, ProvisionState};
pub use session::{ChatSession, ChatSessionBuilder, RejectReason, SubmitOutcome};
