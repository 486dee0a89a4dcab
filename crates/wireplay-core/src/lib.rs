//! Scripted protocol-replay animation core.
//!
//! Replays a fixed, hard-coded protocol exchange (a TCP three-way handshake,
//! a man-in-the-middle interception) between named endpoints: a moving token
//! per step, a synchronized log, and a status line.
//!
//! # Architecture
//!
//! ```text
//! wireplay-core
//!   ├─ EndpointRegistry      (named, positioned participants)
//!   ├─ Sequence              (ordered, immutable step list)
//!   ├─ FramePath             (pure per-step interpolation)
//!   ├─ SequenceRunner        (Idle → Running → Complete state machine)
//!   ├─ EventSender/Receiver  (ordered execution → interactive hand-off)
//!   └─ EventRouter           (folds events onto the surface traits)
//! ```
//!
//! The core is **sans-IO**: [`SequenceRunner::advance`] returns emit/wait
//! operations and never sleeps or draws. The async [`drive`] loop executes
//! those operations on the *execution flow*, pacing through an
//! [`Environment`] and handing every event to the dispatch bridge. The
//! *interactive flow* (the only writer of the rendering surface) drains the
//! bridge on its own loop iterations and applies events via [`EventRouter`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod controller;
pub mod endpoint;
pub mod env;
pub mod error;
pub mod event;
pub mod interpolate;
pub mod runner;
pub mod script;
pub mod sequence;
pub mod surface;

pub use bridge::{EventReceiver, EventRouter, EventSender, channel};
pub use controller::RunController;
pub use endpoint::{Endpoint, EndpointRegistry};
pub use env::Environment;
pub use error::{
    DispatchError, InvalidReferenceError, ReferenceViolation, RegistryError, StartError,
};
pub use event::{EndpointMarker, RunEvent, TokenFrame};
pub use interpolate::{FramePath, Point};
pub use runner::{
    RunPhase, RunState, RunStateCell, RunnerConfig, RunnerOp, SequenceRunner, drive,
};
pub use script::{Script, mitm_interception, three_way_handshake};
pub use sequence::{Sequence, Step};
pub use surface::{Color, LogSink, MarkerStyle, RenderSurface, StatusReporter, TokenHandle};
