//! # Events Module
//!
//! Event-driven progress reporting for the engine.
//!
//! ## Design
//! The engine emits events through channels, allowing any UI (CLI, GUI,
//! web) to subscribe and display progress. The engine itself never prints.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::File(FileEvent::Progress(p)) => {
//!                 println!("Processed {}/{}", p.completed, p.total)
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Run the engine with the sender
//! engine.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
