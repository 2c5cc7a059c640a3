//! Account commands: register and client-key

use filebox_core::{Client, User};

use crate::error::Result;

/// Run the register command
pub fn run_register(id: u64, email: &str, password: &str) -> Result<()> {
    let user = User::register(id, email, password)?;
    tracing::info!(user = id, "Registered user");
    println!("{}", serde_json::to_string(&user)?);
    Ok(())
}

/// Run the client-key command
pub fn run_client_key(id: u64, user: u64) -> Result<()> {
    let client = Client::issue(id, &User::new(user, "", ""))?;
    println!("{}", serde_json::to_string(&client)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_hashes_password() {
        assert!(run_register(1, "a@example.com", "secret").is_ok());
    }

    #[test]
    fn client_key_is_issued() {
        assert!(run_client_key(2, 1).is_ok());
    }
}
