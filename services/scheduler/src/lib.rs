//! Scheduler Service
//!
//! Coordinates concurrent reservation of provider time slots across many
//! live WebSocket clients:
//! - Advisory lock table for "someone is selecting this slot" feedback
//! - Broadcast bus keeping every connected view consistent
//! - Mutex-serialized JSON file store as the single source of booking truth
//! - HTTP triggers for confirm, cancel and provider administration
//!
//! # Architecture
//!
//! ```text
//! WebSocket clients        HTTP triggers
//!        │                       │
//!   ┌────▼────┐            ┌─────▼─────┐
//!   │Handlers │            │ Handlers  │
//!   │  (ws)   │            │  (http)   │
//!   └────┬────┘            └─────┬─────┘
//!        └───────┬───────────────┘
//!           ┌────▼─────┐
//!           │ Protocol │
//!           └─┬───┬──┬─┘
//!             │   │  │
//!      ┌──────▼┐ ┌▼──┴─────┐ ┌─────────────┐
//!      │ Locks ├─► Broadcast│ │  JsonStore  │
//!      └───────┘ │   Bus    │ │  (per file) │
//!                └──────────┘ └──────▲──────┘
//!                                    └── confirm / cancel
//! ```
//!
//! The advisory layer is a UI hint only; the durable store runs the
//! authoritative conflict check inside one critical section per collection.

pub mod audit;
pub mod bus;
pub mod config;
pub mod error;
pub mod handlers;
pub mod locks;
pub mod models;
pub mod protocol;
pub mod router;
pub mod state;
pub mod storage;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
