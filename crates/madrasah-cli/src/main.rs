use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "madrasah-cli", version, about = "Madrasah CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Child profile management
    Child {
        #[command(subcommand)]
        action: commands::child::ChildAction,
    },
    /// Lesson catalog
    Lesson {
        #[command(subcommand)]
        action: commands::lesson::LessonAction,
    },
    /// Lesson progress: phases, resume, completion
    Learn {
        #[command(subcommand)]
        action: commands::learn::LearnAction,
    },
    /// Daily streak
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Achievements
    Badges {
        #[command(subcommand)]
        action: commands::badges::BadgesAction,
    },
    /// Family activities
    Family {
        #[command(subcommand)]
        action: commands::family::FamilyAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Child { action } => commands::child::run(action),
        Commands::Lesson { action } => commands::lesson::run(action),
        Commands::Learn { action } => commands::learn::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Badges { action } => commands::badges::run(action),
        Commands::Family { action } => commands::family::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
