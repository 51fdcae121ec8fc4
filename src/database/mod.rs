pub mod application_repo;
pub mod intern_repo;
pub mod pool;
