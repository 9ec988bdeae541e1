//! Autonomous behavior: the idle/walk state machine, wandering motion, and
//! the polled deadline primitive their timers share.

pub mod motion;
pub mod scheduler;
pub mod state;

pub use motion::{ARRIVAL_EPSILON, MotionController, MotionTarget, WanderBounds, shortest_angle};
pub use scheduler::{Deadline, EpochClock};
pub use state::{CharacterState, CharacterStateMachine, IdlePicker, StateTimings};
