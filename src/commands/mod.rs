pub mod classify;
pub mod extract;
pub mod locate;
pub mod pipeline;
pub mod tools;
