//! # Event Bus Module
//!
//! Decoupled publish/subscribe between the editing core and whatever renders it.
//!
//! ## Overview
//!
//! - The session store publishes edits, prediction outcomes and notices
//! - The UI layer subscribes by category and shows failure notices
//! - Async consumers poll a broadcast receiver
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use maskkit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = Arc::new(EventBus::new());
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Notice]),
//!     |event| {
//!         if let AppEvent::Notice(notice) = event {
//!             eprintln!("{:?}", notice);
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
