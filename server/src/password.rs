use bcrypt::DEFAULT_COST;

/// Work factor for new hashes. `BCRYPT_COST` lets tests and small
/// deployments dial it down; existing hashes keep the cost they were
/// created with.
fn bcrypt_cost() -> u32 {
    std::env::var("BCRYPT_COST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_COST)
}

pub fn hash_password(plain: &str) -> color_eyre::Result<String> {
    let hashed = bcrypt::hash(plain, bcrypt_cost())?;
    Ok(hashed)
}

pub fn verify_password(plain: &str, hashed: &str) -> color_eyre::Result<bool> {
    let matches = bcrypt::verify(plain, hashed)?;
    Ok(matches)
}
