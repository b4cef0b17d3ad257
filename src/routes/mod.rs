pub mod health;
pub mod portfolio;
pub mod prices;
