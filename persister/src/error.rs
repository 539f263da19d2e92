use diesel_async::pooled_connection::deadpool::PoolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersisterError {
    #[error("pg pool error: {0}")]
    PgPoolError(#[from] PoolError),
    #[error("diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
    #[error("retention of {0} days reaches before the earliest representable time")]
    RetentionOutOfRange(i64),
}
