//! # Events Module
//!
//! Progress reporting for front ends.
//!
//! The pipeline never prints; it emits [`Event`]s on a channel and the CLI
//! (or any other caller) decides how to show them.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Pipeline(PipelineEvent::PhaseChanged { phase }) = event {
//!             println!("{phase}...");
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use crossbeam_channel::RecvTimeoutError;
pub use types::*;
