//! Ledger engine for a small trucking business.
//!
//! The engine owns the order lifecycle (derived balance, status transitions,
//! order codes), the role-scoped access policy, the append-only timeline and
//! the dashboard rollups. Every operation takes the calling [`Principal`] and
//! runs its mutation plus timeline writes in one database transaction.

pub use commands::{
    NewExpense, NewOrder, NewTransfer, NewTruck, NewUser, OrderUpdate, TruckUpdate,
};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseCategory};
pub use money::Money;
pub use ops::{
    DEFAULT_MAX_CODE_ATTEMPTS, DashboardStats, Engine, EngineBuilder, ExpenseListFilter,
    MonthlyRevenue, OrderCodeSource, OrderListFilter, OwnerDashboard, RandomOrderCodes,
    TimelineListFilter, TransferListFilter, TruckListFilter, UserCredentials,
};
pub use orders::{ORDER_CODE_PREFIX, Order, OrderDocument, OrderDocuments, OrderStatus, Stop};
pub use policy::{Action, EntityKind, Principal, Role, Scope, can_mutate, scope};
pub use timeline::{EventKind, TimelineEvent};
pub use transfers::{BankDetails, MoneyTransfer, TransferKind, TransferStatus};
pub use trucks::{Certificate, Truck, TruckStatus};
pub use users::User;

mod commands;
mod error;
mod expenses;
mod money;
mod ops;
mod orders;
mod policy;
mod timeline;
mod transfers;
mod trucks;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
