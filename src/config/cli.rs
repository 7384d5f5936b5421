use crate::config::toml_config::ClientConfig;
use crate::domain::model::ApplicationStatus;
use crate::domain::ports::RefreshPolicy;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "path2prep")]
#[command(about = "Command-line client for the path2prep scholarship and career matching service")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Backend API base URL")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "Where the session tokens are stored")]
    pub session_file: Option<String>,

    #[arg(long, global = true, help = "Share one token refresh between concurrent requests")]
    pub single_flight: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store the session
    Register(RegisterArgs),
    /// Revoke the refresh token and clear the local session
    Logout,
    /// Show the signed-in user
    Me,
    #[command(subcommand)]
    Profile(ProfileCommand),
    #[command(subcommand)]
    Careers(CareerCommand),
    #[command(subcommand)]
    Scholarships(ScholarshipCommand),
    #[command(subcommand)]
    Applications(ApplicationCommand),
    #[command(subcommand)]
    Bookmarks(BookmarkCommand),
    #[command(subcommand)]
    Notifications(NotificationCommand),
}

#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long, help = "Defaults to --password")]
    pub password_confirm: Option<String>,
    #[arg(long)]
    pub full_name: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub age: Option<u32>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProfileCommand {
    Show,
    /// Create a profile from a JSON object
    Create {
        #[arg(long)]
        data: String,
    },
    /// Partially update the profile from a JSON object
    Update {
        #[arg(long)]
        data: String,
    },
    UploadPicture {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CareerCommand {
    /// Ask the backend for fresh recommendations
    Recommend,
    /// Previously saved recommendations
    History,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ScholarshipCommand {
    List {
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        ordering: Option<String>,
    },
    Show {
        id: i64,
    },
    /// Rank scholarships against the signed-in profile
    Match {
        #[arg(long)]
        top_k: Option<u32>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ApplicationCommand {
    List,
    Create {
        scholarship_id: i64,
        #[arg(long)]
        status: Option<ApplicationStatus>,
    },
    Update {
        id: i64,
        #[arg(long)]
        status: Option<ApplicationStatus>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum BookmarkCommand {
    List,
    Add { scholarship_id: i64 },
    Remove { id: i64 },
}

#[derive(Debug, Clone, Subcommand)]
pub enum NotificationCommand {
    List,
    Read { id: i64 },
    ReadAll,
    Unread,
}

impl CliConfig {
    /// 讀取設定檔並套用命令列參數，結果已通過驗證
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(session_file) = &self.session_file {
            config = config.with_store_path(session_file.clone());
        }
        if self.single_flight {
            config = config.with_refresh_policy(RefreshPolicy::SingleFlight);
        }

        config.validate()?;
        Ok(config)
    }
}
