pub mod driver;
pub mod fixture;
pub mod session;
