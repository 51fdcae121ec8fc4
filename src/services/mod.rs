pub mod application_store;
pub mod intern_directory;
pub mod notification_service;
pub mod provisioning_service;
pub mod transitions;
pub mod workflow_service;
