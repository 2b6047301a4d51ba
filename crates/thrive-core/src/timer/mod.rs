mod driver;
mod entry;
mod registry;

pub use driver::{Clock, ManualClock, SystemClock, TickDriver};
pub use entry::ActivityTimer;
pub use registry::{TickOutcome, TimerRegistry};
