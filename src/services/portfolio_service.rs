use crate::models::{Allocation, PortfolioResponse};

/// Static placeholder allocation until real weights are computed.
pub fn get_portfolio() -> PortfolioResponse {
    PortfolioResponse {
        portfolio: vec![Allocation {
            asset: "MSCI World".to_string(),
            weight: 0.5,
        }],
    }
}
