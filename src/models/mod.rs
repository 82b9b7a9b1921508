pub mod admins;
pub mod categories;
pub mod portfolio;
