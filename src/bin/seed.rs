use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use hostel_booking_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_admin(&pool, "admin@roommatz.com", "admin123").await?;
    seed_rooms(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, is_admin, role)
        VALUES ($1, 'Administrator', $2, $3, TRUE, 'admin')
        ON CONFLICT (email) DO UPDATE SET is_admin = TRUE, role = 'admin'
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    println!("Ensured admin {email}");
    Ok(id)
}

async fn seed_rooms(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let rooms: Vec<(&str, &str, i32, i64, Vec<&str>)> = vec![
        ("A-101", "single", 1, 800000, vec!["wifi", "desk"]),
        ("A-102", "double", 2, 650000, vec!["wifi", "desk", "balcony"]),
        ("B-201", "three-sharing", 3, 500000, vec!["wifi"]),
        ("B-202", "four-sharing", 4, 400000, vec!["wifi"]),
        ("C-301", "suite", 2, 1200000, vec!["wifi", "ac", "attached-bath"]),
        ("C-302", "deluxe", 2, 1500000, vec!["wifi", "ac", "attached-bath", "tv"]),
    ];

    for (number, room_type, capacity, price, amenities) in rooms {
        let amenities: Vec<String> = amenities.into_iter().map(String::from).collect();
        sqlx::query(
            r#"
            INSERT INTO rooms (id, room_number, room_type, capacity, price, amenities)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (room_number) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number)
        .bind(room_type)
        .bind(capacity)
        .bind(price)
        .bind(&amenities)
        .execute(pool)
        .await?;
        println!("Ensured room {number} ({room_type})");
    }

    Ok(())
}
