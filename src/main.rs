use clap::Parser;
use path2prep_client::config::cli::{
    ApplicationCommand, BookmarkCommand, CareerCommand, Command, NotificationCommand,
    ProfileCommand, ScholarshipCommand,
};
use path2prep_client::core::endpoints::RegisterRequest;
use path2prep_client::domain::model::{ApplicationUpdate, ProfileUpdate, ScholarshipQuery};
use path2prep_client::utils::logger;
use path2prep_client::{
    ApiClient, CliConfig, ClientError, ErrorCategory, FileTokenStore, LogNavigator, Store,
};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

type Client = ApiClient<FileTokenStore, LogNavigator>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.client_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    };

    // 初始化日誌
    if cli.log_json || config.json_logs() {
        logger::init_json_logger(cli.verbose, config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }

    let store = FileTokenStore::new(config.store_path());
    tracing::debug!("Session file: {}", store.path().display());

    let client = ApiClient::new(&config, store, LogNavigator)?;
    let mut state = Store::restore(&client).await?;

    match run(&cli.command, &client, &mut state).await {
        Ok(output) => {
            if !output.is_null() {
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Err(e) => {
            tracing::error!("❌ Command failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(exit_code(&e));
        }
    }

    Ok(())
}

fn exit_code(error: &ClientError) -> i32 {
    match error.category() {
        ErrorCategory::Local => 1,
        ErrorCategory::Validation => 2,
        ErrorCategory::Authentication | ErrorCategory::SessionLost => 3,
        ErrorCategory::Server => 4,
        ErrorCategory::Network => 5,
        ErrorCategory::Configuration => 6,
    }
}

fn render<T: Serialize>(value: &T) -> path2prep_client::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn parse_profile(data: &str) -> path2prep_client::Result<ProfileUpdate> {
    serde_json::from_str(data).map_err(|e| ClientError::validation(format!("invalid profile JSON: {}", e)))
}

fn guess_mime(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

async fn run(command: &Command, client: &Client, state: &mut Store) -> path2prep_client::Result<Value> {
    match command {
        Command::Login { email, password } => {
            state.auth.login(client, email, password).await?;
            render(&state.auth.user)
        }
        Command::Register(args) => {
            let registration = RegisterRequest {
                username: args.username.clone(),
                email: args.email.clone(),
                password: args.password.clone(),
                password_confirm: args
                    .password_confirm
                    .clone()
                    .unwrap_or_else(|| args.password.clone()),
                full_name: args.full_name.clone(),
                country: args.country.clone(),
                age: args.age,
            };
            state.auth.register(client, &registration).await?;
            render(&state.auth.user)
        }
        Command::Logout => {
            state.auth.logout(client).await?;
            println!("👋 Signed out");
            Ok(Value::Null)
        }
        Command::Me => {
            state.auth.fetch_current_user(client).await?;
            render(&state.auth.user)
        }
        Command::Profile(profile) => match profile {
            ProfileCommand::Show => {
                state.profile.fetch(client).await?;
                render(&state.profile.profile)
            }
            ProfileCommand::Create { data } => {
                state.profile.create(client, &parse_profile(data)?).await?;
                render(&state.profile.profile)
            }
            ProfileCommand::Update { data } => {
                state.profile.update(client, &parse_profile(data)?).await?;
                render(&state.profile.profile)
            }
            ProfileCommand::UploadPicture { path } => {
                let content = tokio::fs::read(path).await?;
                let file_name = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("profile_picture");
                state
                    .profile
                    .upload_picture(client, file_name, content, guess_mime(path))
                    .await?;
                render(&state.profile.profile)
            }
        },
        Command::Careers(careers) => match careers {
            CareerCommand::Recommend => render(&client.recommend_careers().await?),
            CareerCommand::History => render(&client.my_recommendations().await?),
        },
        Command::Scholarships(scholarships) => match scholarships {
            ScholarshipCommand::List {
                country,
                search,
                ordering,
            } => {
                let query = ScholarshipQuery {
                    country: country.clone(),
                    search: search.clone(),
                    ordering: ordering.clone(),
                };
                state.scholarships.fetch(client, &query).await?;
                render(&state.scholarships.scholarships)
            }
            ScholarshipCommand::Show { id } => render(&client.get_scholarship(*id).await?),
            ScholarshipCommand::Match { top_k } => {
                state.scholarships.match_profile(client, *top_k).await?;
                render(&state.scholarships.matches)
            }
        },
        Command::Applications(applications) => match applications {
            ApplicationCommand::List => {
                state.scholarships.fetch_applications(client).await?;
                render(&state.scholarships.applications)
            }
            ApplicationCommand::Create {
                scholarship_id,
                status,
            } => render(&client.create_application(*scholarship_id, *status).await?),
            ApplicationCommand::Update { id, status, notes } => {
                let update = ApplicationUpdate {
                    status: *status,
                    notes: notes.clone(),
                };
                render(&client.update_application(*id, &update).await?)
            }
        },
        Command::Bookmarks(bookmarks) => match bookmarks {
            BookmarkCommand::List => {
                state.scholarships.fetch_bookmarks(client).await?;
                render(&state.scholarships.bookmarks)
            }
            BookmarkCommand::Add { scholarship_id } => {
                render(&client.create_bookmark(*scholarship_id).await?)
            }
            BookmarkCommand::Remove { id } => {
                client.delete_bookmark(*id).await?;
                println!("🗑️ Bookmark {} removed", id);
                Ok(Value::Null)
            }
        },
        Command::Notifications(notifications) => match notifications {
            NotificationCommand::List => {
                state.notifications.fetch(client).await?;
                render(&state.notifications.notifications)
            }
            NotificationCommand::Read { id } => {
                state.notifications.mark_read(client, *id).await?;
                println!("✅ Notification {} marked as read", id);
                Ok(Value::Null)
            }
            NotificationCommand::ReadAll => {
                state.notifications.mark_all_read(client).await?;
                println!("✅ All notifications marked as read");
                Ok(Value::Null)
            }
            NotificationCommand::Unread => {
                state.notifications.fetch_unread_count(client).await?;
                render(&serde_json::json!({ "unread_count": state.notifications.unread_count }))
            }
        },
    }
}
