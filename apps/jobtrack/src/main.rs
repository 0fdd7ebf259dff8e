use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use jobtrack::config::Config;
use jobtrack::contract::jobs::parse_date;
use jobtrack::contract::{
    Credentials, Identity, JobApplication, JobApplicationUpdate, JobForm, JobStatus,
    ResumeJobRequest,
};
use jobtrack::errors::ClientError;
use jobtrack::services::resumes::resume_upload;
use jobtrack::session::guard::{GuardView, Navigator, RouteGuard};
use jobtrack::state::AppState;
use jobtrack::views::dashboard::{greeting, UPCOMING_WINDOW_DAYS};
use jobtrack::views::{DashboardStats, JobBoard, ResumeLibrary};

#[derive(Parser)]
#[command(name = "jobtrack", version, about = "Track job applications, resumes and interview prep")]
struct Cli {
    /// Backend API base URL
    #[arg(long, env = "JOBTRACK_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register(CredentialArgs),
    /// Sign in and store the session credential
    Login(CredentialArgs),
    /// Sign out and forget the stored credential
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Manage job applications
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// Manage uploaded resumes
    #[command(subcommand)]
    Resumes(ResumesCommand),
    /// Score a resume against a job description
    Analyze(ResumeJobArgs),
    /// Generate interview questions for a resume and job description
    Interview(ResumeJobArgs),
    /// Application totals and upcoming deadlines
    Dashboard,
}

#[derive(Args)]
struct CredentialArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "JOBTRACK_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum JobsCommand {
    /// List all applications
    List,
    /// Show one application
    Show { id: Uuid },
    /// Add an application
    Add {
        #[arg(long)]
        company: String,
        #[arg(long)]
        position: String,
        /// wishlist, applied, interviewing, offer, rejected, no_response
        #[arg(long)]
        status: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change fields of an application
    Update {
        id: Uuid,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        status: Option<JobStatus>,
        #[arg(long, value_parser = parse_deadline, conflicts_with = "clear_deadline")]
        deadline: Option<NaiveDate>,
        #[arg(long)]
        clear_deadline: bool,
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        #[arg(long)]
        clear_notes: bool,
    },
    /// Delete an application
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum ResumesCommand {
    /// List uploaded resumes
    List,
    /// Show a resume and its extracted text
    Show { id: Uuid },
    /// Upload a PDF or DOCX resume
    Upload { path: PathBuf },
    /// Delete a resume
    Delete { id: Uuid },
}

#[derive(Args)]
struct ResumeJobArgs {
    /// Previously uploaded resume
    #[arg(long, conflicts_with = "resume_file", required_unless_present = "resume_file")]
    resume_id: Option<Uuid>,
    /// Plain-text resume
    #[arg(long)]
    resume_file: Option<PathBuf>,
    /// Plain-text job description
    #[arg(long)]
    job_description: PathBuf,
}

fn parse_deadline(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("'{raw}' is not a YYYY-MM-DD date"))
}

/// Stands in for the login route: a redirect becomes a sign-in hint.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect(&mut self, path: &str) {
        debug!("Guard redirect to {path}");
        eprintln!("Not signed in. Run `jobtrack login --email <EMAIL>` first.");
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = match cli.api_url {
        Some(api_url) => config.with_api_url(api_url)?,
        None => config,
    };

    info!("jobtrack v{}", env!("CARGO_PKG_VERSION"));
    let state = AppState::from_config(config)?;

    match run(&state, cli.command).await {
        Ok(code) => Ok(code),
        Err(e) => {
            match e.downcast_ref::<ClientError>() {
                Some(client_error) => eprintln!("Error: {}", client_error.user_message()),
                None => eprintln!("Error: {e:#}"),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(state: &AppState, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Register(args) => {
            let identity = state
                .register(&Credentials::new(args.email, args.password))
                .await?;
            println!("Registered {}. Run `jobtrack login` to sign in.", identity.email);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Login(args) => {
            let identity = state
                .sign_in(&Credentials::new(args.email, args.password))
                .await?;
            println!("Signed in as {}", identity.email);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Logout => {
            state.logout();
            println!("Signed out");
            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }

    let Some(identity) = require_session(state).await else {
        return Ok(ExitCode::FAILURE);
    };

    match command {
        Commands::Whoami => println!("{} ({})", identity.email, identity.id),
        Commands::Jobs(command) => cmd_jobs(state, command).await?,
        Commands::Resumes(command) => cmd_resumes(state, command).await?,
        Commands::Analyze(args) => cmd_analyze(state, args).await?,
        Commands::Interview(args) => cmd_interview(state, args).await?,
        Commands::Dashboard => cmd_dashboard(state, &identity).await?,
        Commands::Register(_) | Commands::Login(_) | Commands::Logout => {}
    }
    Ok(ExitCode::SUCCESS)
}

/// Restores the stored session and runs the route guard over it.
async fn require_session(state: &AppState) -> Option<Identity> {
    state.session.bootstrap().await;
    let mut watcher = state.session.subscribe();
    let mut guard = RouteGuard::new(state.config.login_path.clone());
    match guard.settle(&mut watcher, &mut CliNavigator).await {
        GuardView::Content => state.session.identity(),
        GuardView::Placeholder | GuardView::Nothing => None,
    }
}

async fn cmd_jobs(state: &AppState, command: JobsCommand) -> Result<()> {
    let mut board = JobBoard::new(state.jobs.clone());
    match command {
        JobsCommand::List => {
            let jobs = board.jobs().await?;
            if jobs.is_empty() {
                println!("No job applications yet");
            }
            for job in jobs {
                print_job_row(job);
            }
        }
        JobsCommand::Show { id } => print_job(&state.jobs.get(id).await?),
        JobsCommand::Add {
            company,
            position,
            status,
            deadline,
            notes,
        } => {
            let form = JobForm {
                company,
                position,
                status: status.unwrap_or_default(),
                deadline: deadline.unwrap_or_default(),
                notes: notes.unwrap_or_default(),
            };
            let job = board.create(&form).await?;
            println!("Added {}", job.id);
        }
        JobsCommand::Update {
            id,
            company,
            position,
            status,
            deadline,
            clear_deadline,
            notes,
            clear_notes,
        } => {
            let update = JobApplicationUpdate {
                company,
                position,
                status,
                deadline: if clear_deadline { Some(None) } else { deadline.map(Some) },
                notes: if clear_notes { Some(None) } else { notes.map(Some) },
            };
            let job = board.update(id, &update).await?;
            print_job(&job);
        }
        JobsCommand::Delete { id } => {
            board.delete(id).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

async fn cmd_resumes(state: &AppState, command: ResumesCommand) -> Result<()> {
    let mut library = ResumeLibrary::new(state.resumes.clone());
    match command {
        ResumesCommand::List => {
            let resumes = library.resumes().await?;
            if resumes.is_empty() {
                println!("No resumes uploaded yet");
            }
            for resume in resumes {
                println!(
                    "{}  {:32} {}",
                    resume.id,
                    resume.filename.as_deref().unwrap_or("-"),
                    resume.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ResumesCommand::Show { id } => {
            let resume = state.resumes.get(id).await?;
            println!("Id:       {}", resume.id());
            println!("File:     {}", resume.metadata.filename.as_deref().unwrap_or("-"));
            println!("Uploaded: {}", resume.metadata.created_at.to_rfc3339());
            if let Some(text) = resume.raw_text.as_deref() {
                println!("\n{text}");
            }
        }
        ResumesCommand::Upload { path } => {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = file_name(&path)?;
            let resume = library.upload(resume_upload(filename, bytes)).await?;
            println!("Uploaded {}", resume.id());
        }
        ResumesCommand::Delete { id } => {
            library.delete(id).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

async fn resume_job_request(args: ResumeJobArgs) -> Result<ResumeJobRequest> {
    let job_description = read_text(&args.job_description).await?;
    let resume_text = match &args.resume_file {
        Some(path) => Some(read_text(path).await?),
        None => None,
    };
    ResumeJobRequest::new(args.resume_id, resume_text, job_description)
        .map_err(|e| ClientError::from(e).into())
}

async fn cmd_analyze(state: &AppState, args: ResumeJobArgs) -> Result<()> {
    let request = resume_job_request(args).await?;
    let analysis = state.resumes.analyze(&request).await?;

    println!("Match score: {}/100", analysis.match_score);
    println!("\nStrengths:\n  {}", analysis.strength_summary);
    print_list("Missing keywords", &analysis.missing_keywords);
    print_list("Suggestions", &analysis.improvement_suggestions);
    println!("\nATS check:\n  {}", analysis.ats_compatibility_check);
    Ok(())
}

async fn cmd_interview(state: &AppState, args: ResumeJobArgs) -> Result<()> {
    let request = resume_job_request(args).await?;
    let prep = state.interview.generate_questions(&request).await?;

    println!("Questions:");
    for (i, question) in prep.generated_questions.iter().enumerate() {
        println!("  {}. [{}] {}", i + 1, question.category, question.question);
    }
    print_list("Preparation tips", &prep.preparation_tips);
    Ok(())
}

async fn cmd_dashboard(state: &AppState, identity: &Identity) -> Result<()> {
    let mut board = JobBoard::new(state.jobs.clone());
    let today = Local::now().date_naive();
    let stats = DashboardStats::from_jobs(board.jobs().await?, today, UPCOMING_WINDOW_DAYS);

    println!("{}\n", greeting(identity));
    println!("Applications: {}", stats.total);
    for status in JobStatus::ALL {
        println!("  {:14} {}", status.label(), stats.count(status));
    }
    println!("\nDeadlines in the next {UPCOMING_WINDOW_DAYS} days:");
    if stats.upcoming.is_empty() {
        println!("  none");
    }
    for upcoming in &stats.upcoming {
        println!(
            "  {}  {} at {} ({} days left)",
            upcoming.deadline, upcoming.position, upcoming.company, upcoming.days_left
        );
    }
    Ok(())
}

fn print_job_row(job: &JobApplication) {
    println!(
        "{}  {:24} {:28} {:14} {}",
        job.id,
        job.company,
        job.position,
        job.status.label(),
        job.deadline.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
    );
}

fn print_job(job: &JobApplication) {
    println!("Id:       {}", job.id);
    println!("Company:  {}", job.company);
    println!("Position: {}", job.position);
    println!("Status:   {}", job.status.label());
    println!(
        "Deadline: {}",
        job.deadline.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
    );
    println!("Updated:  {}", job.updated_at.format("%Y-%m-%d %H:%M"));
    if let Some(notes) = job.notes.as_deref() {
        println!("\n{notes}");
    }
}

fn print_list(title: &str, items: &[String]) {
    println!("\n{title}:");
    if items.is_empty() {
        println!("  none");
    }
    for item in items {
        println!("  - {item}");
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .with_context(|| format!("{} has no usable file name", path.display()))
}
