mod policy;
mod sweep;

pub use policy::RetentionPolicyStore;
pub use sweep::SweepEngine;
