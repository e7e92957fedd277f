pub mod todo;

pub use todo::{parse_id, Changes, Todo, TodoDelete, TodoId, TodoUpdate};
