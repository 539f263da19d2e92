use crate::config::CONFIG;
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::deadpool::Pool;
use std::sync::LazyLock;

pub mod models;
pub mod schema;

pub type PgPool = Pool<AsyncPgConnection>;

/// Resolves the Postgres url: `DATABASE_URL` (environment or `.env`) wins over the config file.
pub fn database_url() -> Option<String> {
    dotenvy::dotenv().ok();
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Some(url);
    }
    CONFIG.postgres.as_ref().map(|pg| {
        format!(
            "postgres://{user}:{password}@{host}:{port}/{db_name}",
            user = pg.user,
            password = pg.password,
            host = pg.host,
            port = pg.port,
            db_name = pg.db_name
        )
    })
}

pub fn init_pg_pool(db_url: &str) -> PgPool {
    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(db_url);
    Pool::builder(config).build().expect("build pool")
}

pub static PG_POOL: LazyLock<PgPool> = LazyLock::new(|| {
    init_pg_pool(&database_url().expect("neither DATABASE_URL nor postgres config is set"))
});
