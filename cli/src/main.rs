use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use threatscope::api::ImageUpload;
use threatscope::config::normalize_base_url;
use threatscope::error::{ConfigError, ErrorCode};
use threatscope::forms::{
    FormError, ImageAnalysisForm, ImageInput, PasswordChangeForm, ProfileForm, RegistrationForm, TextAnalysisForm,
    TextInput,
};
use threatscope::history::{HistoryView, Pager};
use threatscope::nav::{GuardDecision, Navigator, Route, guard};
use threatscope::storage::FileStore;
use threatscope::tier::format_percent;
use threatscope::types::{DashboardStats, DetectionResult, DetectionSummary, User};
use threatscope::{ApiClient, ApiError, AuthStatus, ClientConfig, SessionStore};
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not signed in; run `threatscope login` first")]
    NotSignedIn,
    #[error("refusing to delete the account without --yes")]
    ConfirmationRequired,
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Form(#[from] FormError),
    #[error("{0}")]
    Failed(String),
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotSignedIn => "E_NOT_SIGNED_IN",
            Self::ConfirmationRequired => "E_CONFIRMATION_REQUIRED",
            Self::Config(e) => e.error_code(),
            Self::Api(e) => e.error_code(),
            Self::Form(_) | Self::Failed(_) => "E_FAILED",
            Self::Io(_) => "E_IO",
            Self::Json(_) => "E_JSON",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "threatscope", about = "Threat analysis service client")]
struct Cli {
    /// Versioned API base URL.
    #[arg(long, env = "THREATSCOPE_API_URL")]
    api_url: Option<String>,

    /// File holding the persisted session tokens.
    #[arg(long, env = "THREATSCOPE_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Print raw JSON instead of a summary.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Restore the persisted session and report who is signed in.
    Status,
    Login {
        #[arg(long, env = "THREATSCOPE_EMAIL")]
        email: String,
        #[arg(long, env = "THREATSCOPE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register(RegisterArgs),
    Logout,
    Whoami,
    Profile(ProfileCommand),
    Dashboard(DashboardCommand),
    Analyze(AnalyzeCommand),
    /// List past detections one page at a time.
    History {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = threatscope::history::DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "THREATSCOPE_PASSWORD", hide_env_values = true)]
    password: String,
    /// Defaults to --password.
    #[arg(long)]
    confirm_password: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    full_name: Option<String>,
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    Delete {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct DashboardCommand {
    #[command(subcommand)]
    command: DashboardSubcommand,
}

#[derive(Subcommand, Debug)]
enum DashboardSubcommand {
    Stats,
    Recent,
}

#[derive(Args, Debug)]
struct AnalyzeCommand {
    #[command(subcommand)]
    command: AnalyzeSubcommand,
}

#[derive(Subcommand, Debug)]
enum AnalyzeSubcommand {
    Text {
        #[arg(help = "Text to analyze, or - for stdin")]
        text: String,
    },
    Image {
        path: PathBuf,
    },
}

/// Prints where a browser would have redirected.
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        if route == Route::Login {
            eprintln!("session ended; run `threatscope login` to sign in again");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(code = e.code(), "command failed");
            eprintln!("error[{}]: {e}", e.code());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(cli.api_url.as_deref(), cli.session_file)?;
    let session = Arc::new(SessionStore::new(Arc::new(FileStore::new(config.session_file.clone()))));
    let client = ApiClient::new(&config, session, Arc::new(TerminalNavigator))?;
    let json = cli.json;

    match cli.command {
        Command::Status => run_status(&client, json).await,
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            print_user(user.as_ref(), json)
        }
        Command::Register(args) => run_register(&client, args, json).await,
        Command::Logout => {
            client.logout().await?;
            println!("signed out");
            Ok(())
        }
        Command::Whoami => {
            require_session(&client, Route::Profile).await?;
            print_user(client.session().user().as_ref(), json)
        }
        Command::Profile(profile) => run_profile(&client, profile, json).await,
        Command::Dashboard(dashboard) => run_dashboard(&client, dashboard, json).await,
        Command::Analyze(analyze) => run_analyze(&client, analyze, json).await,
        Command::History { page, page_size } => run_history(&client, page, page_size, json).await,
    }
}

fn resolve_config(api_url: Option<&str>, session_file: Option<PathBuf>) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = api_url {
        config.api_base_url = normalize_base_url(url)?;
    }
    if let Some(path) = session_file {
        config.session_file = path;
    }
    Ok(config)
}

/// Restore the persisted session and apply the route guard.
async fn require_session(client: &ApiClient, route: Route) -> Result<(), CliError> {
    let status = client.session().restore(client).await;
    match guard(route, status) {
        GuardDecision::Render => Ok(()),
        GuardDecision::Wait | GuardDecision::Redirect(_) => Err(CliError::NotSignedIn),
    }
}

async fn run_status(client: &ApiClient, json: bool) -> Result<(), CliError> {
    let status = client.session().restore(client).await;
    if json {
        return print_json(&serde_json::json!({
            "status": format!("{status:?}").to_lowercase(),
            "user": client.session().user(),
            "error": client.session().last_error(),
        }));
    }
    match (status, client.session().user()) {
        (AuthStatus::Authenticated, Some(user)) => println!("signed in as {}", describe_user(&user)),
        _ => {
            println!("not signed in");
            if let Some(error) = client.session().last_error() {
                println!("last error: {error}");
            }
        }
    }
    Ok(())
}

async fn run_register(client: &ApiClient, args: RegisterArgs, json: bool) -> Result<(), CliError> {
    let form = RegistrationForm {
        confirm_password: args.confirm_password.unwrap_or_else(|| args.password.clone()),
        email: args.email,
        password: args.password,
        username: args.username.unwrap_or_default(),
        full_name: args.full_name.unwrap_or_default(),
    };
    let request = form.validate()?;
    let user = client.register(&request).await?;
    print_user(user.as_ref(), json)
}

async fn run_profile(client: &ApiClient, profile: ProfileCommand, json: bool) -> Result<(), CliError> {
    require_session(client, Route::Profile).await?;
    match profile.command {
        ProfileSubcommand::Update { username, full_name, email } => {
            let form = ProfileForm {
                username: username.unwrap_or_default(),
                full_name: full_name.unwrap_or_default(),
                email: email.unwrap_or_default(),
            };
            let user = client.update_profile(&form.to_update()).await?;
            print_user(Some(&user), json)
        }
        ProfileSubcommand::Password { current, new, confirm } => {
            let form = PasswordChangeForm { current_password: current, new_password: new, confirm_password: confirm };
            client.update_profile(&form.validate()?).await?;
            println!("password changed");
            Ok(())
        }
        ProfileSubcommand::Delete { yes } => {
            if !yes {
                return Err(CliError::ConfirmationRequired);
            }
            client.delete_account().await?;
            println!("account deleted");
            Ok(())
        }
    }
}

async fn run_dashboard(client: &ApiClient, dashboard: DashboardCommand, json: bool) -> Result<(), CliError> {
    require_session(client, Route::Dashboard).await?;
    match dashboard.command {
        DashboardSubcommand::Stats => {
            let stats = client.dashboard_stats().await?;
            if json {
                return print_serialized(&stats);
            }
            println!("{}", render_stats(&stats));
        }
        DashboardSubcommand::Recent => {
            let recent = client.recent_detections().await?;
            if json {
                return print_serialized(&recent);
            }
            if recent.is_empty() {
                println!("no recent detections");
            }
            for row in &recent {
                println!("{}", render_summary(row));
            }
        }
    }
    Ok(())
}

async fn run_analyze(client: &ApiClient, analyze: AnalyzeCommand, json: bool) -> Result<(), CliError> {
    let (result, error) = match analyze.command {
        AnalyzeSubcommand::Text { text } => {
            require_session(client, Route::TextAnalysis).await?;
            let mut form = TextAnalysisForm::new(TextInput { text: read_text_arg(&text)? });
            form.submit(client).await?;
            (form.result().cloned(), form.error().map(str::to_owned))
        }
        AnalyzeSubcommand::Image { path } => {
            require_session(client, Route::ImageAnalysis).await?;
            let upload = ImageUpload::from_path(&path).await?;
            let mut form = ImageAnalysisForm::new(ImageInput { file: Some(upload) });
            form.submit(client).await?;
            (form.result().cloned(), form.error().map(str::to_owned))
        }
    };
    if let Some(message) = error {
        return Err(CliError::Failed(message));
    }
    let Some(result) = result else {
        return Err(CliError::Failed("analysis returned no result".to_owned()));
    };
    if json {
        return print_serialized(&result);
    }
    println!("{}", render_result(&result));
    Ok(())
}

async fn run_history(client: &ApiClient, page: u32, page_size: u32, json: bool) -> Result<(), CliError> {
    require_session(client, Route::History).await?;
    let mut view = HistoryView::new(Pager::new(page, page_size)?);
    view.refresh(client).await;
    if let Some(message) = view.error() {
        return Err(CliError::Failed(message.to_owned()));
    }
    if json {
        return print_serialized(&view.rows());
    }
    let window = view.pager().window();
    println!("page {} (showing {} from offset {})", view.pager().page() + 1, view.rows().len(), window.skip);
    for row in view.rows() {
        println!("{}", render_history_row(row));
    }
    Ok(())
}

fn read_text_arg(arg: &str) -> Result<String, CliError> {
    if arg != "-" {
        return Ok(arg.to_owned());
    }
    let mut text = String::new();
    io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

// =============================================================================
// RENDERING
// =============================================================================

fn describe_user(user: &User) -> String {
    if user.display_name() == user.email {
        user.email.clone()
    } else {
        format!("{} <{}>", user.display_name(), user.email)
    }
}

fn print_user(user: Option<&User>, json: bool) -> Result<(), CliError> {
    if json {
        return print_serialized(&user);
    }
    match user {
        Some(user) => println!("signed in as {}", describe_user(user)),
        None => println!("signed in (profile unavailable)"),
    }
    Ok(())
}

fn render_result(result: &DetectionResult) -> String {
    let mut lines = vec![
        format!("threat: {} ({})", result.tier(), format_percent(result.threat_score)),
        format!("confidence: {}", format_percent(result.confidence_score)),
    ];
    if !result.threat_category.is_empty() {
        lines.push(format!("category: {}", result.threat_category));
    }
    if !result.analysis_results.details.is_empty() {
        lines.push(format!("details: {}", result.analysis_results.details));
    }
    for indicator in &result.analysis_results.indicators {
        lines.push(format!("  indicator: {indicator}"));
    }
    if let Some(priority) = &result.remediation_suggestions.priority {
        lines.push(format!("priority: {priority}"));
    }
    for action in &result.remediation_suggestions.actions {
        lines.push(format!("  action: {action}"));
    }
    lines.join("\n")
}

fn render_stats(stats: &DashboardStats) -> String {
    let threats = &stats.recent_threats;
    let categories = &stats.threat_categories;
    format!(
        "total detections: {}\nrecent threats: critical {} / high {} / moderate {} / low {}\ncategories: phishing {} / malware {} / spam {} / suspicious {}",
        stats.total_detections,
        threats.critical,
        threats.high,
        threats.moderate,
        threats.low,
        categories.phishing,
        categories.malware,
        categories.spam,
        categories.suspicious,
    )
}

fn render_summary(row: &DetectionSummary) -> String {
    format!(
        "{}  {:<6}  {:>6}  {}",
        row.created_at.as_deref().unwrap_or("-"),
        row.tier().label(),
        format_percent(row.threat_score),
        row.threat_category,
    )
}

fn render_history_row(row: &DetectionResult) -> String {
    format!(
        "{}  {:<5}  {:<6}  {:>6}  {}",
        row.created_at.as_deref().unwrap_or("-"),
        row.detection_type.as_deref().unwrap_or("-"),
        row.tier().label(),
        format_percent(row.threat_score),
        row.threat_category,
    )
}

fn print_serialized<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    print_json(&serde_json::to_value(value)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
