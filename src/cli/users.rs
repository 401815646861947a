// src/cli/users.rs
// `telescope users ...`

use anyhow::{bail, Result};

use telescope_client::composables::{CreateUser, DeleteUser, GetSimpleUsers, GetUsers, ResetUserPassword};
use telescope_client::http::Validation;
use telescope_client::models::{NewUser, ResetPassword};
use telescope_client::services::UserService;

use super::{Session, UsersAction};

pub async fn run(session: &Session, action: UsersAction) -> Result<()> {
    let service = UserService::new(session.transport.clone());

    match action {
        UsersAction::List { simple: false } => {
            let mut users = GetUsers::new(service);
            users.ready().await;
            let state = users.snapshot().await;
            if let Some(error) = state.error_message() {
                bail!("failed to get users: {}", error);
            }
            for user in state.data.unwrap_or_default() {
                let last_login = user
                    .last_login
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{:>5}  {:<20} {:<30} {:<16} {}",
                    user.id,
                    user.username,
                    user.display_name(),
                    last_login,
                    user.group_names().join(",")
                );
            }
        }
        UsersAction::List { simple: true } => {
            let mut users = GetSimpleUsers::new(service);
            users.ready().await;
            let state = users.snapshot().await;
            if let Some(error) = state.error_message() {
                bail!("failed to get users: {}", error);
            }
            for user in state.data.unwrap_or_default() {
                println!("{:<20} {}", user.username, user.display_name());
            }
        }
        UsersAction::Create {
            username,
            password,
            first_name,
            last_name,
            email,
        } => {
            let create = CreateUser::new(service);
            let response = create
                .create(&NewUser {
                    username,
                    password,
                    first_name,
                    last_name,
                    email,
                })
                .await;
            report_validation(&response.validation);
            if !response.result {
                bail!("failed to create user: {}", failure_text(&response.errors));
            }
            for message in &response.messages {
                println!("{}", message);
            }
            if let Some(created) = response.data {
                println!("id: {}", created.id);
            }
        }
        UsersAction::Delete { id } => {
            let response = DeleteUser::new(service).remove(id).await;
            if !response.result {
                bail!("failed to delete user {}: {}", id, failure_text(&response.errors));
            }
            println!("user {} deleted", id);
        }
        UsersAction::ResetPassword { id, password, confirm } => {
            let data = ResetPassword {
                password_confirm: confirm.unwrap_or_else(|| password.clone()),
                password,
            };
            let response = ResetUserPassword::new(service).reset(id, &data).await;
            report_validation(&response.validation);
            if !response.result {
                bail!("failed to reset password: {}", failure_text(&response.errors));
            }
            println!("password updated for user {}", id);
        }
    }

    Ok(())
}

fn report_validation(validation: &Validation) {
    for (field, message) in &validation.columns {
        eprintln!("{}: {}", field, message);
    }
}

fn failure_text(errors: &[String]) -> String {
    if errors.is_empty() {
        "invalid data".to_string()
    } else {
        errors.join(", ")
    }
}
