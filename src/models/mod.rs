pub mod application;
pub mod intern;
pub mod status;
