pub mod replica;
pub mod runtime;

pub use replica::{CallOptions, Replica, ReplicaSet, Reply};
pub use runtime::ServeRuntime;
