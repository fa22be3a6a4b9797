pub mod api;
pub mod catalog;
pub mod classifier;
pub mod diagnosis;
pub mod error;
pub mod faq;
pub mod model;
