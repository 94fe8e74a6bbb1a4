pub mod assessment;
pub mod profile;
pub mod riasec;
pub mod user;
