//! End-to-end coverage of the `diff` and `migrate` subcommands against two
//! live PostgreSQL databases. Requires `DATABASE_URL`; gated behind `#[ignore]`
//! so the default `cargo test` run stays hermetic.

mod helpers;

use assert_cmd::Command;
use helpers::harness::with_test_db_pair;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance via DATABASE_URL"]
async fn diff_json_reports_a_new_table() {
    with_test_db_pair(async |main, branch| {
        branch
            .execute("CREATE TABLE widgets (id serial primary key, name text not null)")
            .await;

        Command::cargo_bin("pgcatdiff")
            .unwrap()
            .args(["diff", &main.url(), &branch.url(), "--output", "json"])
            .assert()
            .success()
            .stdout(contains("widgets"))
            .stdout(contains("\"operation\": \"create\""));
    })
    .await;
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance via DATABASE_URL"]
async fn diff_sql_renders_create_table_statement() {
    with_test_db_pair(async |main, branch| {
        branch
            .execute("CREATE TABLE widgets (id serial primary key)")
            .await;

        Command::cargo_bin("pgcatdiff")
            .unwrap()
            .args(["diff", &main.url(), &branch.url(), "--output", "sql"])
            .assert()
            .success()
            .stdout(contains("CREATE TABLE"))
            .stdout(contains("widgets"));
    })
    .await;
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance via DATABASE_URL"]
async fn diff_with_no_differences_emits_empty_array() {
    with_test_db_pair(async |main, branch| {
        Command::cargo_bin("pgcatdiff")
            .unwrap()
            .args(["diff", &main.url(), &branch.url(), "--output", "json"])
            .assert()
            .success()
            .stdout(contains("[]"));
    })
    .await;
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance via DATABASE_URL"]
async fn migrate_dry_run_does_not_touch_main() {
    with_test_db_pair(async |main, branch| {
        branch
            .execute("CREATE TABLE widgets (id serial primary key)")
            .await;

        Command::cargo_bin("pgcatdiff")
            .unwrap()
            .args(["migrate", &main.url(), &branch.url(), "--dry-run"])
            .assert()
            .success()
            .stdout(contains("CREATE TABLE"));

        let tables: Vec<(String,)> = sqlx::query_as("SELECT tablename FROM pg_tables WHERE schemaname = 'public'")
            .fetch_all(main.pool())
            .await
            .unwrap();
        assert!(tables.is_empty(), "dry run must not create any tables");
    })
    .await;
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance via DATABASE_URL"]
async fn migrate_applies_branch_schema_to_main() {
    with_test_db_pair(async |main, branch| {
        branch
            .execute("CREATE TABLE widgets (id serial primary key, name text not null)")
            .await;

        Command::cargo_bin("pgcatdiff")
            .unwrap()
            .args(["migrate", &main.url(), &branch.url()])
            .assert()
            .success();

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM pg_tables WHERE schemaname = 'public' AND tablename = 'widgets')",
        )
        .fetch_one(main.pool())
        .await
        .unwrap();
        assert!(exists, "migrate should have created widgets on main");

        // Running again should now be a no-op.
        Command::cargo_bin("pgcatdiff")
            .unwrap()
            .args(["diff", &main.url(), &branch.url(), "--output", "json"])
            .assert()
            .success()
            .stdout(contains("[]"));
    })
    .await;
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL instance via DATABASE_URL"]
async fn ignore_schema_prefix_filters_out_objects_but_keeps_the_schema_create() {
    with_test_db_pair(async |main, branch| {
        branch.execute("CREATE SCHEMA vendor_ext").await;
        branch
            .execute("CREATE TABLE vendor_ext.internal_state (id serial primary key)")
            .await;

        Command::cargo_bin("pgcatdiff")
            .unwrap()
            .args([
                "diff",
                &main.url(),
                &branch.url(),
                "--output",
                "json",
                "--ignore-schema-prefix",
                "vendor_",
            ])
            .assert()
            .success()
            .stdout(contains("vendor_ext"))
            .stdout(contains("internal_state").not());
    })
    .await;
}
