//! Fake news detection: the decision policy and the service around it.
//!
//! ```text
//! request ─> validate / fetch ─> NewsModel::classify ─> DecisionPolicy ─> Verdict
//!                                                        │
//!                                  trusted domain ───────┤
//!                                  trusted keyword ──────┤
//!                                  fact-check (async) ───┘
//! ```

pub mod policy;
pub mod service;
pub mod trust;
pub mod verdict;

pub use policy::DecisionPolicy;
pub use service::{CheckMode, CheckRequest, CheckResponse, DetectorService, ErrorKind};
pub use trust::{TrustedDomains, TrustedKeywords};
pub use verdict::{ExtractedArticle, FactCheckSignal, OverrideReason, SourceSignals, Verdict};
