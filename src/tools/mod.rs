//! 工具层：四个可被 Agent 调用的工具与注册表

pub mod ask;
pub mod formula;
pub mod reading;
pub mod registry;
pub mod visual;

pub use ask::AskTool;
pub use formula::FormulaTool;
pub use reading::ReadingTool;
pub use registry::{Tool, ToolRegistry};
pub use visual::VisualTool;
