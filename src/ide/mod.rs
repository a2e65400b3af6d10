//! IDE features: completion classification, aggregation, and templates.
//!
//! The host calls [`completion::completions`] with immutable tree
//! snapshots, shows the resulting list, and on acceptance expands keywords
//! through [`templates::expand_keyword`] (or
//! [`templates::expand_routine_call`] for resolver-provided routines).

pub mod completion;
pub mod templates;

pub use completion::{
    AnchorInfo, CompletionRequest, Context, PriorityTier, Suggestion, SuggestionSource,
    VirtualContext, completions,
};
pub use templates::{
    Expansion, ReformatScope, TemplateKey, TemplateVariant, expand_keyword, expand_routine_call,
};
