pub mod learn;
pub mod liveness;
pub mod readiness;
pub mod reflect;
