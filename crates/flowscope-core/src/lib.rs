pub mod arg;
pub mod id;
pub mod node;
pub mod workflow;

// Re-export commonly used types
pub use arg::{Arg, BindKind, DataType};
pub use id::NodeId;
pub use node::{
    ExceptionHandling, ExceptionPolicy, FlowNode, GenericConfig, LoopConfig, NodeConfig, NodeKind,
    StartConfig, VariableConfig, VariableMode,
};
pub use workflow::Workflow;
