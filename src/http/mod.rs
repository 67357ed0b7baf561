//! Request generation, pacing and dispatch.
mod rate;
mod sender;
mod workload;


pub use rate::{Admission, RateGate};
pub use sender::{RequestTemplate, build_client};
pub use workload::{Payload, PayloadGenerator, PayloadQueue, render_payload, spawn_payload_generator};

pub(crate) use sender::{WorkerContext, spawn_worker};
