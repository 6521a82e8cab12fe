pub mod handlers;
pub mod syllabus;
pub mod upload;
