pub mod assignment;
pub mod class;
pub mod course;
pub mod user;
