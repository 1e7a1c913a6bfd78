//! External collaborators: bazaar prices and the recipe catalog.

pub mod bazaar;
pub mod cache;
pub mod recipes;
