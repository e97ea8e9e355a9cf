pub mod outcome;
pub mod provider;
