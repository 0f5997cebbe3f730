//! Filter descriptors, the owner registry and predicate evaluation

mod descriptor;
mod evaluator;
mod registry;

pub use descriptor::{FilterDescriptor, Predicate};
pub use evaluator::evaluate;
pub use registry::{FilterHandle, FilterRegistry, OwnerKey};
