pub mod dist;
mod assignment;
mod edge;
mod node;
mod sd;
mod state_matrix;

pub mod parameters;

pub use assignment::LinkAssignment;
pub use edge::Edge;
pub use node::Node;
pub use sd::SD;
pub use state_matrix::StateMatrix;
