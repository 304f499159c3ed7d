//! graphbuild-lib: core engine for the `gb` build runner
//!
//! This crate provides the pieces of a minimal ninja-style build engine:
//! - `ninja`: parser for the declarative `build.ninja` rule/build grammar
//! - `graph`: resolution of declarations into a validated dependency graph
//! - `plan`: staleness evaluation producing an ordered execution plan
//! - `execute`: parallel execution of planned commands

pub mod consts;
pub mod execute;
pub mod graph;
pub mod ninja;
pub mod plan;
