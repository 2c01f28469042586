pub mod order;
pub mod task_ops;
