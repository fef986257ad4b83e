//! Periodic reactors: timer- and stream-driven tasks that decide *when*
//! work is due and turn it into requests for the serializer.
//!
//! Reactors hold no durable state and share nothing with each other; they
//! drive the same [`crate::handle::AppHandle`] code paths as API callers.

pub(crate) mod jury;
pub(crate) mod validator;

pub(crate) use jury::JuryReactor;
pub(crate) use validator::ValidatorReactor;
