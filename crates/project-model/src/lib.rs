//! Storyboard Project Model
//!
//! Defines the core data contracts for Storyboard projects:
//! - **Analysis:** The act → scene → shot breakdown of a screenplay
//! - **Timeline:** Shots in playback order with computed start offsets
//! - **Project:** The saved session (script, analysis, timeline)
//!
//! JSON field names follow the project files written by the web version
//! of the tool so saved projects stay interchangeable.

pub mod analysis;
pub mod project;
pub mod timeline;

pub use analysis::*;
pub use project::*;
pub use timeline::*;
