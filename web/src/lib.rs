pub mod error;
pub mod forms;
pub mod pages;
pub mod store;
pub mod templates;
