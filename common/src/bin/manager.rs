use clap::Parser;

mod cli {
    use clap::{Parser, Subcommand};

    #[derive(Parser)]
    #[command(
        name = "dealership manager",
        about = "Cli tool for the dealership database: schema migrations and inventory overview"
    )]
    pub(crate) struct Args {
        #[command(subcommand)]
        pub command: Command,
    }

    #[derive(Subcommand)]
    pub(crate) enum Command {
        Postgres {
            #[clap(subcommand)]
            cmd: PostgresCommand,
        },
        /// Prints the number of vehicles per status
        Inventory,
    }

    #[derive(Subcommand)]
    pub(crate) enum PostgresCommand {
        Migrate,
        RevertAll,
        Redo,
        /// Lists migrations not applied yet
        Pending,
    }
}

mod postgres {
    use common::persistence::PG_POOL;
    use common::persistence::schema::vehicles;
    use diesel::dsl::count_star;
    use diesel::prelude::*;
    use diesel_async::pooled_connection::deadpool::Object;
    use diesel_async::{AsyncMigrationHarness, AsyncPgConnection, RunQueryDsl};
    use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

    pub const PG_MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/persistence/migrations");

    async fn harness() -> AsyncMigrationHarness<Object<AsyncPgConnection>> {
        let conn = PG_POOL.get().await.expect("failed to get pg connection");
        AsyncMigrationHarness::new(conn)
    }

    pub(crate) async fn migrate() {
        let mut harness = harness().await;
        let applied = harness
            .run_pending_migrations(PG_MIGRATIONS)
            .expect("failed to run migrations");
        println!("Database migrated, {} migration(s) applied", applied.len());
    }

    pub(crate) async fn revert_all() {
        let mut harness = harness().await;
        let reverted = harness
            .revert_all_migrations(PG_MIGRATIONS)
            .expect("failed to revert migrations");
        println!("Database reverted, {} migration(s) undone", reverted.len());
    }

    pub(crate) async fn redo() {
        revert_all().await;
        migrate().await;
    }

    pub(crate) async fn pending() {
        let mut harness = harness().await;
        let pending = harness
            .pending_migrations(PG_MIGRATIONS)
            .expect("failed to read migration state");
        if pending.is_empty() {
            println!("Schema is up to date");
        }
        for migration in pending {
            println!("pending: {}", migration.name());
        }
    }

    pub(crate) async fn inventory() {
        let mut conn = PG_POOL.get().await.expect("failed to get pg connection");
        let counts: Vec<(String, i64)> = vehicles::table
            .group_by(vehicles::status)
            .select((vehicles::status, count_star()))
            .order_by(vehicles::status)
            .load(&mut conn)
            .await
            .expect("failed to count vehicles");

        if counts.is_empty() {
            println!("No vehicles stored");
        }
        for (status, count) in counts {
            println!("{status:>10}: {count}");
        }
    }
}

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    match args.command {
        cli::Command::Postgres { cmd } => dispatch_postgres(cmd).await,
        cli::Command::Inventory => postgres::inventory().await,
    }
}

async fn dispatch_postgres(cmd: cli::PostgresCommand) {
    match cmd {
        cli::PostgresCommand::Migrate => postgres::migrate().await,
        cli::PostgresCommand::RevertAll => postgres::revert_all().await,
        cli::PostgresCommand::Redo => postgres::redo().await,
        cli::PostgresCommand::Pending => postgres::pending().await,
    };
}
