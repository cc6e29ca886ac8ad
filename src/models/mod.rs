pub mod patch;
pub mod todo;

pub use patch::{NullValue, Patch};
pub use todo::{CreateTodoRequest, MessageBody, Todo, UpdateTodoRequest};
