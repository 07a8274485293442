//! # Promotimer Core Library
//!
//! This library provides the core business logic for Promotimer, a promotional
//! countdown timer service for storefronts. It decides which of a shop's
//! configured timers a visitor should see, and keeps an "evergreen" timer's
//! per-visitor deadline stable across repeated page loads.
//!
//! ## Architecture
//!
//! - **Resolution**: a pure priority resolver over plain timer values, with a
//!   temporal validity guard applied before ranking
//! - **Countdown Engine**: a wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick_at()` for progress updates
//! - **Storage**: SQLite-based timer storage (the candidate supplier) and a
//!   client-local key-value store for evergreen deadlines
//!
//! ## Key Components
//!
//! - [`select_best_timer`]: Targeting resolution over a candidate set
//! - [`CountdownEngine`]: Client-side tick/expiry/urgency state machine
//! - [`TimerStore`]: Timer persistence and impression counting
//! - [`DeadlineStore`]: Per-visitor evergreen deadline persistence

pub mod timer;
pub mod countdown;
pub mod storage;
pub mod events;
pub mod error;

pub use timer::{
    is_eligible, priority, select_best_timer, starts_in_future, StyleConfig, Targeting, Timer,
    TimerKind, TimerPayload, TimerResponse, TimerStatus, Urgency, VisitorContext, WidgetPosition,
    WidgetSize,
};
pub use countdown::{format_digits, CountdownEngine, CountdownState, EXPIRED_DIGITS};
pub use storage::{CandidateSupplier, DeadlineStore, TimerStore};
pub use events::Event;
pub use error::{CoreError, DatabaseError, ValidationError};
