pub mod collaborators;
pub mod iam;
pub mod notify;
pub mod secrets;
pub mod sts;
