use sqlx::PgPool;
use uuid::Uuid;

/// Connects to the PostgreSQL instance named by `DATABASE_URL` and mints
/// fresh, uniquely-named databases for isolated test runs.
pub struct PgTestInstance {
    base_url: String,
}

/// An isolated database created for a single test run.
pub struct TestDatabase {
    pool: PgPool,
    db_name: String,
    base_url: String,
}

impl TestDatabase {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn url(&self) -> String {
        if let Some(last_slash) = self.base_url.rfind('/') {
            format!("{}/{}", &self.base_url[..last_slash], self.db_name)
        } else {
            format!("{}/{}", self.base_url, self.db_name)
        }
    }

    /// Run arbitrary DDL/DML against the database, e.g. to seed one side of a diff.
    pub async fn execute(&self, sql: &str) {
        use sqlx::Executor;
        self.pool
            .execute(sql)
            .await
            .unwrap_or_else(|e| panic!("failed to execute SQL: {sql}\nerror: {e}"));
    }

    /// Best-effort cleanup; dropped with a timeout so a stuck connection can't hang the suite.
    pub async fn cleanup(self) {
        self.pool.close().await;

        let db_name = self.db_name.clone();
        let base_url = self.base_url.clone();
        let cleanup = async move {
            if let Ok(pool) = PgPool::connect(&base_url).await {
                let drop_sql = format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)");
                let _ = sqlx::query(&drop_sql).execute(&pool).await;
                pool.close().await;
            }
        };
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), cleanup).await;
    }

    /// Standard roles used by grant-diffing tests, created once per database.
    async fn seed_standard_roles(&self) {
        let roles = [
            ("test_app_user", "CREATE ROLE test_app_user LOGIN"),
            (
                "test_admin_user",
                "CREATE ROLE test_admin_user LOGIN CREATEDB",
            ),
            ("test_read_only", "CREATE ROLE test_read_only NOLOGIN"),
            ("test_write_user", "CREATE ROLE test_write_user LOGIN"),
            ("test_group", "CREATE ROLE test_group NOLOGIN"),
        ];
        for (_, create_sql) in roles {
            let _ = sqlx::query(create_sql).execute(&self.pool).await;
        }
    }
}

impl PgTestInstance {
    pub async fn new() -> Self {
        dotenv::dotenv().ok();

        let base_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL is required to run catalog/CLI integration tests");

        let probe = PgPool::connect(&base_url)
            .await
            .expect("failed to connect to PostgreSQL using DATABASE_URL");
        probe.close().await;

        Self { base_url }
    }

    pub async fn create_test_database(&self) -> TestDatabase {
        let db_name = format!("test_{}", Uuid::new_v4().simple());

        let base_pool = PgPool::connect(&self.base_url)
            .await
            .expect("failed to connect to PostgreSQL to create a test database");
        sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
            .execute(&base_pool)
            .await
            .expect("failed to create test database");
        base_pool.close().await;

        let db_url = if let Some(last_slash) = self.base_url.rfind('/') {
            format!("{}/{}", &self.base_url[..last_slash], db_name)
        } else {
            format!("{}/{}", self.base_url, db_name)
        };
        let pool = PgPool::connect(&db_url)
            .await
            .expect("failed to connect to newly created test database");

        let db = TestDatabase {
            pool,
            db_name,
            base_url: self.base_url.clone(),
        };
        db.seed_standard_roles().await;
        db
    }
}

/// Provision an isolated database, run `test_fn` against it, then drop it.
pub async fn with_test_db<F, R>(test_fn: F) -> R
where
    F: std::ops::AsyncFnOnce(&TestDatabase) -> R,
{
    let pg = PgTestInstance::new().await;
    let db = pg.create_test_database().await;
    let result = test_fn(&db).await;
    db.cleanup().await;
    result
}

/// Provision two isolated databases (a `main` and a `branch`), run `test_fn` against
/// both, then drop them. Mirrors the pair every `diff`/`migrate` invocation compares.
pub async fn with_test_db_pair<F, R>(test_fn: F) -> R
where
    F: std::ops::AsyncFnOnce(&TestDatabase, &TestDatabase) -> R,
{
    let pg = PgTestInstance::new().await;
    let main = pg.create_test_database().await;
    let branch = pg.create_test_database().await;
    let result = test_fn(&main, &branch).await;
    main.cleanup().await;
    branch.cleanup().await;
    result
}
