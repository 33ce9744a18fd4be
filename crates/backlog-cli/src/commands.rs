//! Command handlers

use anyhow::Context;
use tokio::sync::broadcast::{self, error::TryRecvError};

use backlog_core::{
    Backlog, BacklogList, Game, PasswordChange, RegistrationForm, ReviewRequest, SessionEvent,
};

use crate::Command;

pub async fn run(backlog: &Backlog, command: Command) -> anyhow::Result<()> {
    let client = backlog.client();

    match command {
        Command::Login { username, password } => {
            let session = client.login(&username, &password).await?;
            println!("Logged in as {} (session {})", username, session.session_id);
        }
        Command::Register {
            username,
            email,
            first_name,
            last_name,
            age,
            password,
            password_confirm,
        } => {
            let registration = RegistrationForm {
                username,
                email,
                first_name,
                last_name,
                age,
                password,
                password_confirm,
            }
            .validate()?;
            client.register(&registration).await?;
            println!("Registered and logged in as {}", registration.username);
        }
        Command::Logout => {
            client.logout().await?;
            println!("Logged out");
        }
        Command::Status => {
            println!("{}", backlog.auth_state()?);
        }
        Command::Whoami => {
            let user = client.current_user().await?;
            println!("{} ({} {}) <{}>", user.username, user.first_name, user.last_name, user.email);
            for list in BacklogList::ALL {
                let games = user.backlog(list);
                println!("\n{} ({})", list.label(), games.len());
                print_games(games);
            }
        }
        Command::Search { query } => print_games(&client.search_games(&query).await?),
        Command::Game { id } => {
            let game = client.game(id).await?;
            print_games(std::slice::from_ref(&game));
            if let Some(summary) = &game.summary {
                println!("\n{}", summary);
            }
            match client.average_rating(id).await? {
                Some(avg) => println!("\nAverage rating: {:.1}", avg),
                None => println!("\nNo ratings yet"),
            }
        }
        Command::Popular => print_games(&client.popular_games().await?),
        Command::Latest => print_games(&client.latest_games().await?),
        Command::Add { game_id, list } => {
            let list: BacklogList = list.parse().map_err(anyhow::Error::msg)?;
            let user = client.current_user().await?;
            client.add_game_to_list(user.id, game_id, list).await?;
            println!("Added game {} to {}", game_id, list.label());
        }
        Command::Remove { game_id } => {
            let user = client.current_user().await?;
            client.remove_game_from_all_lists(user.id, game_id).await?;
            println!("Removed game {} from all lists", game_id);
        }
        Command::Review {
            game_id,
            rating,
            comment,
        } => {
            let user = client.current_user().await?;
            client
                .submit_review(&ReviewRequest {
                    user_id: user.id,
                    game_id,
                    rating,
                    comment,
                })
                .await
                .context("submitting review")?;
            println!("Review saved");
        }
        Command::Email { new_email } => {
            client.update_email(&new_email).await?;
            println!("Email updated");
        }
        Command::Password { new, confirm } => {
            client
                .update_password(&PasswordChange::new(new, confirm))
                .await?;
            println!("Password updated");
        }
    }

    Ok(())
}

/// React to lifecycle events raised while the command ran.
pub fn report_session_events(events: &mut broadcast::Receiver<SessionEvent>) {
    let mut expired = false;
    loop {
        match events.try_recv() {
            Ok(SessionEvent::Expired { reason }) => {
                tracing::debug!(reason = %reason, "Session lost");
                expired = true;
            }
            Ok(event) => tracing::debug!(?event, "Session event"),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Missed session events");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    if expired {
        eprintln!("Your session has expired. Run `backlog login` to sign in again.");
    }
}

fn print_games(games: &[Game]) {
    if games.is_empty() {
        println!("  (none)");
        return;
    }
    for game in games {
        match game.release_year() {
            Some(year) => println!("  [{}] {} ({})", game.id, game.name, year),
            None => println!("  [{}] {}", game.id, game.name),
        }
    }
}
