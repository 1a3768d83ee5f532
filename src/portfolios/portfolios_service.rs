use log::debug;
use std::sync::Arc;

use crate::Result;

use super::portfolios_model::{NewPortfolio, Portfolio};
use super::portfolios_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};

/// Service for managing portfolios
pub struct PortfolioService {
    repository: Arc<dyn PortfolioRepositoryTrait>,
}

impl PortfolioService {
    pub fn new(repository: Arc<dyn PortfolioRepositoryTrait>) -> Self {
        Self { repository }
    }
}

impl PortfolioServiceTrait for PortfolioService {
    fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        let portfolio = self.repository.create(new_portfolio)?;
        debug!(
            "Created portfolio {} for owner {}",
            portfolio.id, portfolio.owner_id
        );
        Ok(portfolio)
    }

    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        self.repository.get_by_id(portfolio_id)
    }

    fn exists(&self, portfolio_id: &str) -> Result<bool> {
        self.repository.exists(portfolio_id)
    }

    fn list_portfolios_for_owner(&self, owner_id: &str) -> Result<Vec<Portfolio>> {
        self.repository.list_by_owner(owner_id)
    }

    fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
        self.repository.list()
    }
}
