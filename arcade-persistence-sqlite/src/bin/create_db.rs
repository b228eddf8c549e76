use arcade_persistence_sqlite::{create_db_pool, create_schema};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let db_path = std::env::var("ARCADE_DB").expect("ARCADE_DB env var not set");

    let parent = std::path::Path::new(&db_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory for DB");
        println!("Created parent directory for DB at {}", parent.display());
    }

    let pool = create_db_pool(&db_path);
    create_schema(&pool)
        .await
        .expect("Failed to create schema");
    pool.close().await;

    println!("Created schema in DB at {}", db_path);
}
