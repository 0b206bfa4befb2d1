use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod access;
mod dashboard;
mod expenses;
mod listing;
mod orders;
mod timeline;
mod transfers;
mod trucks;
mod users;

pub use dashboard::{DashboardStats, MonthlyRevenue, OwnerDashboard};
pub use expenses::ExpenseListFilter;
pub use orders::{OrderCodeSource, OrderListFilter, RandomOrderCodes};
pub use timeline::TimelineListFilter;
pub use transfers::TransferListFilter;
pub use trucks::TruckListFilter;
pub use users::UserCredentials;

/// Attempts at drawing a free order code before giving up.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 16;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    order_codes: Box<dyn OrderCodeSource>,
    max_code_attempts: u32,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Debug)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    order_codes: Box<dyn OrderCodeSource>,
    max_code_attempts: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            order_codes: Box::new(RandomOrderCodes),
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the source of order-code candidates.
    pub fn order_codes(mut self, source: impl OrderCodeSource + 'static) -> EngineBuilder {
        self.order_codes = Box::new(source);
        self
    }

    /// Bound the number of candidates drawn per order creation (at least one).
    pub fn max_code_attempts(mut self, attempts: u32) -> EngineBuilder {
        self.max_code_attempts = attempts.max(1);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            order_codes: self.order_codes,
            max_code_attempts: self.max_code_attempts,
        })
    }
}
