use arcade_persistence_sqlite::{open_database, players::SqlitePlayerRepository};
use arcade_server_domain::credentials::{CredentialManager, HashConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: add_user <username> <password>");
        std::process::exit(1);
    }
    let username = &args[1];
    let password = &args[2];

    let db_path = std::env::var("ARCADE_DB").expect("ARCADE_DB env var not set");
    let cost = std::env::var("ARCADE_BCRYPT_COST")
        .ok()
        .map(|c| c.parse::<u32>().expect("ARCADE_BCRYPT_COST must be a number"))
        .unwrap_or(HashConfig::default().cost);

    let pool = open_database(&db_path)
        .await
        .expect("Failed to open database");
    let repo = SqlitePlayerRepository::new(pool.clone());

    let credentials = CredentialManager::new(HashConfig { cost });
    let result = repo
        .add_user(&credentials, username, password, chrono::Utc::now())
        .await;
    pool.close().await;

    let player = match result {
        Ok(player) => player,
        Err(e) => {
            eprintln!("Failed to add user [{}]: {}", username, e);
            std::process::exit(1);
        }
    };

    println!("Created user [{}] with id {}", player.username, player.id);
}
