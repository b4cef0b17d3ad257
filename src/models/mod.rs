mod portfolio;
mod price_point;

pub use portfolio::{Allocation, PortfolioResponse};
pub use price_point::PricePoint;
