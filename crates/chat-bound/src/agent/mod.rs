//! Session runtime: the [`ChatSession`] turn loop and its supporting types.
//!
//! - [`session::ChatSession`]: caller-owned context that runs one thread.
//!   Start here.
//! - [`config::ChatConfig`]: model, system prompt, sampling, policy, and
//!   thread id.
//! - [`events`]: [`EventHandler`] trait and [`ChatEvent`] enum for
//!   observing turns.

pub mod config;
pub mod events;
pub mod session;

pub use config::{ChatConfig, DEFAULT_THREAD_ID};
pub use events::{ChatEvent, EventHandler, FnEventHandler, LoggingHandler, NoopHandler};
pub use session::ChatSession;
