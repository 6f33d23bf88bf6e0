//! Pipeline execution modes.
//!
//! The synchronous mode is simply
//! [`IdeaOrchestrator::generate_idea`](crate::agents::IdeaOrchestrator::generate_idea)
//! awaited on the caller's task. This module provides the streaming mode,
//! where the run happens on a background worker and progress arrives as
//! [`StatusEvent`](crate::agents::StatusEvent)s.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use idea_forge::agents::IdeaOrchestrator;
//! use idea_forge::config::Settings;
//! use idea_forge::pipeline::GenerationStream;
//!
//! let settings = Settings::from_env()?;
//! let orchestrator = Arc::new(IdeaOrchestrator::from_settings(&settings)?);
//!
//! let stream = GenerationStream::spawn(orchestrator, "gravity", 70);
//! stream
//!     .forward(|event| {
//!         print!("{}", event.to_sse_frame()?);
//!         Ok(())
//!     })
//!     .await?;
//! ```

pub mod stream;

pub use stream::GenerationStream;
