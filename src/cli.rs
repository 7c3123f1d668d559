use crate::{Args, Command};
use anyhow::Result;
use std::path::PathBuf;
use visionsync::validation::check_password_confirmation;
use visionsync::{Registration, SessionStore, User};

pub struct Context {
    pub args: Args,
    pub data_dir: PathBuf,
    pub store: SessionStore,
}

pub fn run(ctx: &Context) -> Result<()> {
    // Every invocation is an app start: pick up the persisted session first
    let restored = ctx.store.restore_session();

    match &ctx.args.command {
        Command::Signup {
            email,
            password,
            confirm_password,
            first_name,
            last_name,
            phone,
        } => {
            if let Some(confirm) = confirm_password {
                check_password_confirmation(password, confirm)?;
            }
            let mut form = Registration::new(email, password, first_name, last_name);
            form.phone = phone.clone();

            let user = ctx.store.register(&form)?;
            println!("Welcome, {}!", user.first_name);
            println!("{}", format_user(&user));
        }
        Command::Signin { email, password } => {
            let user = ctx.store.authenticate(email, password)?;
            println!("Signed in as {}", user.email);
        }
        Command::Whoami => match restored {
            Some(user) => println!("{}", format_user(&user)),
            None => println!("Not signed in"),
        },
        Command::Signout => {
            let was_signed_in = restored.is_some();
            ctx.store.sign_out()?;
            if was_signed_in {
                println!("Signed out");
            } else {
                println!("Not signed in");
            }
        }
        Command::Users => {
            let users = ctx.store.users()?;
            if users.is_empty() {
                println!("No accounts in {}", ctx.data_dir.display());
            }
            for user in &users {
                println!("  {}  {} <{}>", user.id, user.display_name(), user.email);
            }
        }
    }

    Ok(())
}

/// Profile card as shown on the profile screen
fn format_user(user: &User) -> String {
    let mut out = String::new();
    out.push_str(&format!("Name:   {}\n", user.display_name()));
    out.push_str(&format!("Email:  {}\n", user.email));
    if let Some(phone) = &user.phone {
        out.push_str(&format!("Phone:  {}\n", phone));
    }
    if let Some(created_at) = user.created_at {
        out.push_str(&format!(
            "Member: since {}\n",
            created_at.format("%Y-%m-%d")
        ));
    }
    out.push_str(&format!("Id:     {}", user.id));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_user() {
        let mut user = visionsync::demo::demo_user().user;
        let card = format_user(&user);
        assert!(card.contains("Name:   Demo User"));
        assert!(card.contains("Phone:  +27 12 345 6789"));
        assert!(!card.contains("Member"));
        assert!(card.ends_with("Id:     demo-user"));

        user.phone = None;
        user.created_at = Some(
            chrono::DateTime::parse_from_rfc3339("2025-10-15T08:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        );
        let card = format_user(&user);
        assert!(!card.contains("Phone"));
        assert!(card.contains("Member: since 2025-10-15"));
    }
}
