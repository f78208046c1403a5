//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Raw URL string
//!     → parse.rs (absolute URL, normalized host)
//!     → router.rs (ordered rule scan)
//!     → matcher.rs (domain / hostname / literal predicates)
//!     → Return: first matching rule's Target, or the default
//!
//! Rule Compilation (at load time):
//!     DispatchConfig.rules[]
//!     → Keep declaration order
//!     → Compile hostname patterns once
//!     → Freeze as immutable Router
//!     → shared.rs swaps whole routers on reload
//! ```
//!
//! # Design Decisions
//! - Rules compiled once, immutable at runtime
//! - Deterministic: same input always routes to the same target
//! - First match wins (declaration order, never re-sorted)

pub mod matcher;
pub mod parse;
pub mod router;
pub mod shared;
pub mod target;

pub use matcher::{DomainSet, HostnameSet, Literal, Matcher};
pub use parse::ParsedUrl;
pub use router::{Decision, MatchedRule, Router, RouterConfig, Rule};
pub use shared::SharedRouter;
pub use target::Target;
