//! Safe program-wide renaming.
//!
//! [`remap`] plans a collision-free name for every renamable class and member
//! family of a program and rewrites the program with the resulting
//! [`NameMapping`]. Families that the analysis cannot vouch for (library
//! contracts, native bindings, anything touching a class with a missing
//! dependency) keep their names.

#![forbid(unsafe_code)]

mod apply;
mod error;
mod keep;
mod mapping;
mod names;
mod pipeline;
mod planner;
mod registry;

pub use crate::apply::apply_mapping;
pub use crate::error::{RemapError, Result};
pub use crate::keep::{KeepRuleSpec, KeepRules};
pub use crate::mapping::{call_site_key, NameMapping};
pub use crate::names::{AlphabetGenerator, DictionaryGenerator, NameGenerator};
pub use crate::pipeline::{remap, PipelineObserver, RemapContext, RemapOptions, RemapOutput};
pub use crate::planner::{FamilyDecision, PinReason, PlanSummary, RenamePlanner};
pub use crate::registry::NameRegistry;
