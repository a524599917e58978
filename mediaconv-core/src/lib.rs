//! Core library for orchestrating media conversion jobs around an external
//! transcoding tool such as ffmpeg.
//!
//! The crate turns a plain [`ConversionSettings`] value into an exact
//! command-line invocation, runs the tool as a supervised subprocess, streams
//! its stdout into an observable progress sink, and resolves every job to one
//! of four terminal outcomes.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mediaconv_core::{
//!     ConversionSettings, JobSupervisor, SystemSpawner, build_command, outcome_message,
//! };
//! use std::path::PathBuf;
//!
//! let mut settings = ConversionSettings::default();
//! settings.input_path = PathBuf::from("/media/talk.mov");
//! settings.output_path = PathBuf::from("/media/talk.mp4");
//! settings.format = "mp4".to_string();
//!
//! let spec = build_command(&settings).unwrap();
//! let supervisor = JobSupervisor::new(SystemSpawner::new("ffmpeg"));
//! let handle = supervisor.start(spec);
//!
//! let outcome = handle.wait();
//! println!("{}", outcome_message(&outcome));
//! ```

pub mod command;
pub mod error;
pub mod events;
pub mod external;
pub mod jobs;
pub mod progress;
pub mod reporting;
pub mod settings;

// Re-exports for public API
pub use command::{AUDIO_FORMATS, CommandSpec, MediaKind, build_command};
pub use error::{CoreError, CoreResult, ValidationError};
pub use events::{Event, EventDispatcher, EventHandler};
pub use external::{SystemProcess, SystemSpawner, ToolProcess, ToolSpawner, check_dependency};
pub use jobs::{JobHandle, JobSupervisor, Outcome};
pub use progress::ProgressSink;
pub use reporting::{outcome_exit_code, outcome_message};
pub use settings::{AudioSettings, ConversionSettings, VideoSettings};
