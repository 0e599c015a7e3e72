//! uac - universal auto-config for arbitrary HTML pages.
//!
//! Inspects unknown markup, infers what the page contains and applies a set of
//! idempotent enhancements without any site-specific configuration.
//!
//! # Architecture
//!
//! ```text
//! Options ──► Engine::init()
//!               │
//!               ├─ detect      FeatureSnapshot from the live document
//!               ├─ phases      setup → theme → ui → optimize → scaffold
//!               │                (classify + marker on every element)
//!               ├─ watch       scoped re-enhancement of added subtrees
//!               ├─ lazy        viewport-driven deferred image loading
//!               └─ theme       light/dark decision, persisted
//! ```
//!
//! | Module     | Purpose                                          |
//! |------------|--------------------------------------------------|
//! | `config`   | `Options`, rule table, loading and validation    |
//! | `dom`      | In-memory document, selectors, parse/render      |
//! | `platform` | Viewport, preferences, clock, storage, geometry  |
//! | `detect`   | Feature detection                                |
//! | `classify` | Control intent and structural role heuristics    |
//! | `marker`   | Idempotency markers                              |
//! | `engine`   | Enhancement pipeline and public lifecycle        |
//! | `watch`    | Mutation batch planning                          |
//! | `lazy`     | Deferred image loading                           |
//! | `theme`    | Dark-mode scheduling                             |

pub mod logger;

pub mod classify;
pub mod config;
pub mod detect;
pub mod dom;
pub mod engine;
pub mod lazy;
pub mod marker;
pub mod platform;
pub mod theme;
pub mod watch;

mod embed;

pub use classify::{ControlIntent, StructuralRole, classify_control, classify_role};
pub use config::{DarkMode, Options, PartialOptions};
pub use detect::{FeatureSnapshot, detect};
pub use dom::{Document, NodeId};
pub use engine::{DispatchOutcome, Engine, EngineEvent, EventKind, auto_start, is_manual};
pub use platform::Environment;
