use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::auth::PasswordHasher;
use crate::config::AdminSeed;
use crate::models::{NewUser, Role};
use crate::schema::users;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .build(manager)
        .expect("Failed to create database pool");

    // Run pending migrations on startup
    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");

    pool
}

/// Seed the admin account. The password hash cannot be computed inside a SQL
/// migration, so this runs right after migrations instead.
pub fn ensure_admin(pool: &DbPool, hasher: &PasswordHasher, seed: &AdminSeed) -> QueryResult<()> {
    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for admin seeding");

    let password_hash = hasher.hash(&seed.password);
    let admin = NewUser {
        email: &seed.email,
        nickname: &seed.nickname,
        password_hash: &password_hash,
        role: Role::Admin,
    };

    let inserted = diesel::insert_into(users::table)
        .values(&admin)
        .on_conflict(users::email)
        .do_nothing()
        .execute(&mut conn)?;

    if inserted > 0 {
        tracing::info!(email = %seed.email, "seeded admin user");
    }

    Ok(())
}
