pub mod observation_loop;

pub use observation_loop::{LoopStats, ObservationLoop};
