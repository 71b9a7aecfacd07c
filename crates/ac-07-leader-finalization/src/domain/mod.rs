pub mod messages;
pub mod policy;
