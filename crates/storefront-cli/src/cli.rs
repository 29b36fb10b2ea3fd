//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use storefront_config::ClientConfig;
use storefront_telemetry::{LoggingConfig, init_logging};
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliError, CliResult, parse_query_pair, parse_url};
use crate::commands::products::{
    handle_product_create, handle_product_delete, handle_product_get, handle_product_list,
    handle_product_update,
};
use crate::commands::session::{
    handle_login, handle_logout, handle_profile_update, handle_register, handle_whoami,
};
use crate::commands::uploads::handle_upload_images;
use crate::commands::users::{
    handle_user_create, handle_user_delete, handle_user_list, handle_user_update,
};

/// Parses CLI arguments and executes the requested command. Returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let trace_id = Uuid::new_v4().to_string();

    match execute(cli, &trace_id).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn execute(cli: Cli, trace_id: &str) -> CliResult<()> {
    let config = load_config(&cli)?;
    init_logging(&LoggingConfig {
        level: &config.log_level,
        format: config.log_format,
    })
    .map_err(CliError::failure)?;
    tracing::debug!(trace_id, api_url = %config.api_url, "starting command");

    let ctx = AppContext::from_config(&config, trace_id)?;
    dispatch(&ctx, cli.command, cli.format).await
}

fn load_config(cli: &Cli) -> CliResult<ClientConfig> {
    let mut config =
        ClientConfig::from_env().map_err(|err| CliError::validation(err.to_string()))?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url.clone());
    }
    if let Some(session_file) = &cli.session_file {
        config = config.with_session_file(session_file.clone());
    }
    Ok(config)
}

pub(crate) async fn dispatch(
    ctx: &AppContext,
    command: Command,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        Command::Login(args) => handle_login(ctx, args, format).await,
        Command::Register(args) => handle_register(ctx, args, format).await,
        Command::Logout => handle_logout(ctx),
        Command::Whoami => handle_whoami(ctx, format).await,
        Command::Profile(ProfileCommand::Update(args)) => {
            handle_profile_update(ctx, args, format).await
        }
        Command::Products(products) => match products {
            ProductCommand::List(args) => handle_product_list(ctx, args, format).await,
            ProductCommand::Get(args) => handle_product_get(ctx, args, format).await,
            ProductCommand::Create(args) => handle_product_create(ctx, args, format).await,
            ProductCommand::Update(args) => handle_product_update(ctx, args, format).await,
            ProductCommand::Delete(args) => handle_product_delete(ctx, args).await,
        },
        Command::Users(users) => match users {
            UserCommand::List(args) => handle_user_list(ctx, args, format).await,
            UserCommand::Create(args) => handle_user_create(ctx, args, format).await,
            UserCommand::Update(args) => handle_user_update(ctx, args, format).await,
            UserCommand::Delete(args) => handle_user_delete(ctx, args).await,
        },
        Command::Upload(UploadCommand::Images(args)) => {
            handle_upload_images(ctx, args, format).await
        }
    }
}

#[derive(Parser)]
#[command(
    name = "storefront",
    about = "Command-line client for the storefront backend"
)]
pub(crate) struct Cli {
    #[arg(long, global = true, value_parser = parse_url, help = "Backend base URL [env: STOREFRONT_API_URL]")]
    pub(crate) api_url: Option<Url>,
    #[arg(long, global = true, help = "Session file [env: STOREFRONT_SESSION_FILE]")]
    pub(crate) session_file: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Exchange credentials for a session.
    Login(LoginArgs),
    /// Create an account.
    Register(RegisterArgs),
    /// Forget the stored session.
    Logout,
    /// Show the profile of the logged-in user.
    Whoami,
    #[command(subcommand)]
    Profile(ProfileCommand),
    #[command(subcommand)]
    Products(ProductCommand),
    #[command(subcommand)]
    Users(UserCommand),
    #[command(subcommand)]
    Upload(UploadCommand),
}

#[derive(Subcommand)]
pub(crate) enum ProfileCommand {
    /// Update the current user's profile from a JSON file.
    Update(BodyArgs),
}

#[derive(Subcommand)]
pub(crate) enum ProductCommand {
    List(ListArgs),
    Get(IdArgs),
    Create(BodyArgs),
    Update(UpdateArgs),
    Delete(IdArgs),
}

#[derive(Subcommand)]
pub(crate) enum UserCommand {
    List(ListArgs),
    Create(BodyArgs),
    Update(UpdateArgs),
    Delete(IdArgs),
}

#[derive(Subcommand)]
pub(crate) enum UploadCommand {
    /// Upload image files in one request.
    Images(UploadImagesArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) name: String,
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args, Default)]
pub(crate) struct ListArgs {
    #[arg(
        value_parser = parse_query_pair,
        help = "Query parameters as key=value (e.g. skip=0 limit=20)"
    )]
    pub(crate) query: Vec<(String, String)>,
}

#[derive(Args)]
pub(crate) struct IdArgs {
    #[arg(help = "Resource identifier")]
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct BodyArgs {
    #[arg(short = 'f', long = "file", help = "JSON request body")]
    pub(crate) file: PathBuf,
}

#[derive(Args)]
pub(crate) struct UpdateArgs {
    #[arg(help = "Resource identifier")]
    pub(crate) id: String,
    #[arg(short = 'f', long = "file", help = "JSON request body")]
    pub(crate) file: PathBuf,
}

#[derive(Args)]
pub(crate) struct UploadImagesArgs {
    #[arg(required = true)]
    pub(crate) files: Vec<PathBuf>,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}
