//! coursetrack CLI - follow a course from the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use coursetrack_client::{
    ClientConfig, CourseLoader, FetchError, HttpCourseApi, Redirect, StaticToken,
};
use coursetrack_core::Course;
use coursetrack_progress::{
    LearningSession, Notification, NotificationLevel, Notifier, SessionConfig, WriteOutcome,
};
use coursetrack_storage::{CourseCache, JsonCache, MemoryCache};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coursetrack")]
#[command(about = "Track lesson progress through an online course", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (overrides COURSETRACK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides COURSETRACK_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Directory for cached courses
    #[arg(long, global = true, default_value = ".coursetrack/cache")]
    cache_dir: PathBuf,

    /// Do not read or write the course cache on disk
    #[arg(long, global = true)]
    no_cache: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show modules, lessons and completion
    Outline {
        /// Course slug
        slug: String,
    },
    /// Mark a lesson completed
    Complete {
        /// Course slug
        slug: String,
        /// Module number (1-based)
        module: usize,
        /// Lesson number within the module (1-based)
        lesson: usize,
    },
    /// Report playback positions for a lesson
    Watch {
        /// Course slug
        slug: String,
        /// Module number (1-based)
        module: usize,
        /// Lesson number within the module (1-based)
        lesson: usize,
        /// Playback positions in seconds, in the order the player emitted them
        #[arg(required = true)]
        seconds: Vec<u64>,
    },
}

/// Routes notifications into the log, which the subscriber writes to stderr.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => info!("{}: {}", notification.title, notification.message),
            NotificationLevel::Error => error!("{}: {}", notification.title, notification.message),
        }
    }
}

struct App {
    api: Arc<HttpCourseApi>,
    loader: CourseLoader,
    notifier: Arc<ConsoleNotifier>,
}

impl App {
    /// Load `slug` into a new session. `fresh` bypasses the cache.
    async fn open(&self, slug: &str, fresh: bool) -> Result<LearningSession> {
        let session = LearningSession::new(
            self.api.clone(),
            self.notifier.clone(),
            SessionConfig::default(),
        );

        let ticket = session.begin_fetch().await;
        let loaded = if fresh {
            self.loader.refresh(slug).await
        } else {
            self.loader.load(slug).await
        };
        let course = match loaded {
            Ok(course) => course,
            Err(e) => {
                self.report_fetch_error(slug, &e);
                return Err(e.into());
            }
        };
        session.apply_fetch(ticket, course).await;
        Ok(session)
    }

    fn report_fetch_error(&self, slug: &str, e: &FetchError) {
        self.notifier
            .notify(Notification::error("Could not load course", e.to_string()));
        match e.redirect() {
            Some(Redirect::SignIn) => eprintln!("Sign in first: pass --token or set COURSETRACK_TOKEN"),
            Some(Redirect::Enroll) => eprintln!("Enroll in '{}' before opening its lessons", slug),
            Some(Redirect::Catalog) => eprintln!("No course '{}'; check the catalog for its slug", slug),
            None => {}
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn zero_based(module: usize, lesson: usize) -> Result<(usize, usize)> {
    match (module.checked_sub(1), lesson.checked_sub(1)) {
        (Some(m), Some(l)) => Ok((m, l)),
        _ => bail!("module and lesson numbers start at 1"),
    }
}

fn print_outline(course: &Course, current: Option<coursetrack_core::Position>) {
    let snapshot = coursetrack_progress::snapshot(course);
    println!("{} ({})", course.title, course.slug);
    println!(
        "  Progress: {}/{} lessons, {:.1}%",
        snapshot.completed_lessons, snapshot.total_lessons, snapshot.percentage
    );

    for (m, (module, progress)) in course.modules.iter().zip(&snapshot.modules).enumerate() {
        println!("  {}. {} [{:.0}%]", m + 1, module.title, progress.percentage);
        for (l, lesson) in module.lessons.iter().enumerate() {
            let mark = if lesson.progress.completed { "x" } else { " " };
            let pointer = if current == Some(coursetrack_core::Position::new(m, l)) { ">" } else { " " };
            println!(
                "   {}[{}] {}.{} {} ({})",
                pointer,
                mark,
                m + 1,
                l + 1,
                lesson.title,
                lesson.kind.as_str()
            );
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.base_url = url;
    }
    if let Some(token) = cli.token {
        config.token = Some(token);
    }

    let auth = Arc::new(StaticToken::new(config.token.clone()));
    let api = Arc::new(HttpCourseApi::new(&config, auth));
    let cache: Arc<dyn CourseCache> = if cli.no_cache {
        Arc::new(MemoryCache::new())
    } else {
        Arc::new(JsonCache::new(&cli.cache_dir).await?)
    };
    let app = App {
        loader: CourseLoader::new(api.clone(), cache, config.cache_ttl),
        api,
        notifier: Arc::new(ConsoleNotifier),
    };

    match cli.command {
        Commands::Outline { slug } => {
            let session = app.open(&slug, false).await?;
            if let Some(course) = session.course().await {
                print_outline(&course, session.position().await);
            }
            session.close().await;
        }
        Commands::Complete { slug, module, lesson } => {
            let (m, l) = zero_based(module, lesson)?;
            let session = app.open(&slug, true).await?;
            session.jump_to(m, l).await?;

            let outcome = session.mark_complete().await?;
            if !outcome.changed {
                println!("Lesson {}.{} was already completed ({:.1}%)", module, lesson, outcome.percent);
            } else {
                println!("Completed lesson {}.{}: course at {:.1}%", module, lesson, outcome.percent);
                match outcome.advanced_to {
                    Some(next) => println!("Up next: lesson {}", next),
                    None => println!("That was the last lesson"),
                }
                if outcome.percent >= 100.0 {
                    app.notifier.notify(Notification::info(
                        "Course finished",
                        format!("Every lesson of '{}' is completed", slug),
                    ));
                }
                if let Some(write) = outcome.write {
                    match write.outcome().await {
                        WriteOutcome::Confirmed => app.loader.invalidate(&slug).await,
                        WriteOutcome::Superseded => {}
                        WriteOutcome::Failed(reason) => warn!("Completion not saved: {}", reason),
                    }
                }
            }
            session.close().await;
        }
        Commands::Watch { slug, module, lesson, seconds } => {
            let (m, l) = zero_based(module, lesson)?;
            let session = app.open(&slug, true).await?;
            session.jump_to(m, l).await?;

            for position in &seconds {
                session.record_playback(*position).await?;
            }
            session.flush_playback().await;

            if let Some(current) = session.current_lesson().await {
                println!(
                    "{}: watched {}s, resume at {}s",
                    current.title, current.progress.watched_seconds, current.progress.last_position
                );
            }
            session.close().await;
            app.loader.invalidate(&slug).await;
        }
    }

    Ok(())
}
