//! Storyboard generative backend
//!
//! Talks to a `generateContent`-style API for two jobs: breaking a
//! screenplay down into acts, scenes and shots, and drawing one pencil
//! sketch per shot. Everything that touches the network sits behind the
//! [`StoryboardModel`] trait so the workflow and batch logic can run
//! against a fake in tests.

pub mod batch;
pub mod client;
pub mod credentials;
pub mod error;
pub mod schema;
pub mod workflow;

pub use batch::*;
pub use client::*;
pub use credentials::*;
pub use error::*;
pub use workflow::*;
