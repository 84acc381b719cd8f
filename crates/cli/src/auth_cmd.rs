use anyhow::{Context, Result};
use biasbuster_conversation::StartRoute;
use biasbuster_core::SessionStore;
use biasbuster_local_store::FileSessionStore;
use dialoguer::{Input, Password};

use crate::config::load_config;
use crate::connect::{Connection, explain};

fn prompt(label: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .interact_text()
        .with_context(|| format!("failed to read {label}"))
}

fn prompt_password(confirm: bool) -> Result<String> {
    let mut password = Password::new().with_prompt("Password");
    if confirm {
        password = password.with_confirmation("Repeat password", "Passwords do not match");
    }
    password.interact().context("failed to read password")
}

pub async fn run_login(email: Option<String>) -> Result<()> {
    let conn = Connection::open(load_config()?)?;
    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = prompt_password(false)?;

    let resp = conn
        .account()
        .login(&email, &password)
        .await
        .context("Login failed")?;
    match resp.user {
        Some(user) => println!("Logged in as {} <{}>.", user.username, user.email),
        None => println!("Logged in as {email}."),
    }
    Ok(())
}

pub async fn run_signup(username: Option<String>, email: Option<String>) -> Result<()> {
    let conn = Connection::open(load_config()?)?;
    let username = match username {
        Some(name) => name,
        None => prompt("Username")?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = prompt_password(true)?;

    conn.account()
        .signup(&username, &email, &password)
        .await
        .context("Signup failed")?;
    println!("Account created. Run `biasbuster login` to sign in.");
    Ok(())
}

pub fn run_logout() -> Result<()> {
    let session = FileSessionStore::open_default().context("Could not open session store")?;
    if session.is_authenticated() {
        session.clear();
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub async fn run_whoami() -> Result<()> {
    let conn = Connection::open(load_config()?)?;
    let account = conn.account();
    if account.restore() == StartRoute::Login {
        println!("Not logged in.");
        return Ok(());
    }
    let user = account.whoami().await.map_err(explain)?;
    println!("{} <{}> (id {})", user.username, user.email, user.id);
    Ok(())
}
