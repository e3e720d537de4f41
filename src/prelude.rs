pub use std::{sync::Arc, time::Duration};

pub use chrono::{Months, NaiveDateTime as DateTime, TimeDelta, Utc};
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
  EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
  Set, TransactionTrait, sea_query::Expr,
};
pub use tracing::{debug, error, info, warn};

pub use crate::error::{Error, Result};
