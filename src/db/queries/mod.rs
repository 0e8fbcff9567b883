pub mod approval;
pub mod audit;
pub mod user;
pub mod workflow;
