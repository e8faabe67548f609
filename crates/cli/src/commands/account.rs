//! Account commands: register, login, logout and whoami.
//!
//! # Usage
//!
//! ```bash
//! brewhouse register -n "Ana Silva" -e ana@example.com -p "(11) 91234-5678" \
//!     -a "Rua A, 100, São Paulo" --password 'Abcdef1!'
//! brewhouse login -e ana@example.com --password 'Abcdef1!'
//! brewhouse whoami
//! brewhouse logout
//! ```
//!
//! The password may also come from `BREWHOUSE_PASSWORD`.

use brewhouse_core::SessionStatus;
use brewhouse_storefront::services::auth::RegistrationForm;
use secrecy::SecretString;

use super::{CliError, Workspace};

/// Arguments of `brewhouse register`.
#[derive(Debug)]
pub struct RegisterArgs {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: SecretString,
}

/// Create an account and log it in.
#[allow(clippy::print_stdout)]
pub async fn register(workspace: &Workspace, args: RegisterArgs) -> Result<(), CliError> {
    let guard = workspace.guard()?;
    let form = RegistrationForm {
        name: args.name,
        email: args.email,
        phone: args.phone,
        address: args.address,
        password: args.password,
    };

    let identity = guard.register(&form).await?;
    println!(
        "Welcome, {}! Registered and logged in as {}.",
        identity.name.first_name(),
        identity.email
    );
    Ok(())
}

/// Log in with an email and password.
#[allow(clippy::print_stdout)]
pub async fn login(
    workspace: &Workspace,
    email: &str,
    password: &SecretString,
) -> Result<(), CliError> {
    let guard = workspace.guard()?;
    let identity = guard.login(email, password).await?;
    println!("Logged in as {} <{}>.", identity.name, identity.email);
    Ok(())
}

/// End the current session.
#[allow(clippy::print_stdout)]
pub fn logout(workspace: &Workspace) -> Result<(), CliError> {
    let guard = workspace.guard()?;
    match guard.status() {
        SessionStatus::LoggedOut => println!("Not logged in."),
        SessionStatus::LoggedIn => {
            if !guard.logout() {
                return Err(CliError::Usage("Could not clear the session".to_string()));
            }
            println!("Logged out.");
        }
    }
    Ok(())
}

/// Show who is logged in.
#[allow(clippy::print_stdout)]
pub fn whoami(workspace: &Workspace) -> Result<(), CliError> {
    let guard = workspace.guard()?;
    match guard.session() {
        Some(session) => {
            let identity = &session.identity;
            println!("{} <{}>", identity.name, identity.email);
            println!("  id:        {}", identity.id);
            println!("  phone:     {}", identity.phone);
            println!("  address:   {}", identity.address);
            println!("  logged in: {}", session.logged_in_at.to_rfc3339());
        }
        None => println!("Not logged in."),
    }
    Ok(())
}
