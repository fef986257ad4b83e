//! Message vocabulary shared by the event loop, the submission serializer,
//! and the periodic reactors.
//!
//! Every request carries exactly one reply slot (a `oneshot` sender) that is
//! written exactly once, by whichever component determines the final
//! outcome. Completion events propagate the original reply slot so the event
//! loop can answer the caller only after state is durable.

pub mod completions;
pub mod requests;
pub mod submissions;

pub use completions::CompletionEvent;
pub use requests::{
    AppRequest, CreateValidatorRequest, CreateValidatorResponse, RegisterValidatorRequest,
};
pub use submissions::SubmissionRequest;

use crate::error::AgentError;
use shared_types::TxHandle;
use tokio::sync::oneshot;

/// Single-use reply slot resolving to a transaction handle or a typed error.
pub type TxReply = oneshot::Sender<Result<TxHandle, AgentError>>;
