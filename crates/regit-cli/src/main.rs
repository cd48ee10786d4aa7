mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use commands::Session;
use regit_core::config::Config;
use regit_vcs::RepoPaths;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "git-dep",
    version,
    about = "Manage dependencies between git branches",
    long_about = "git-dep records a base branch and a list of dependency branches for each\n\
        feature branch, and keeps the branch synchronized with them: dependencies are\n\
        merged into an integration branch built from the base, and the branch's own\n\
        commits are rebased on top of it.\n\n\
        Quick start:\n  \
        git dep init --base main --depends-on lib\n  \
        git dep update\n  \
        git dep status"
)]
struct Cli {
    /// Enable verbose logging (set log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: .regit/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Resume an update that stopped on a conflict
    #[arg(short = 'c', long = "continue", conflicts_with = "abort")]
    resume: bool,

    /// Cancel an update that stopped on a conflict
    #[arg(short, long)]
    abort: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize the checked-out branch with its base and dependencies
    ///
    /// Merges every dependency into `regit/base/<branch>` (built from the base)
    /// and rebases the branch's own commits onto the result. Stops on
    /// conflicts; finish with `git dep --continue` or `git dep --abort`.
    ///
    /// Examples:
    ///   git dep update
    ///   git dep update --recursive
    Update {
        /// Update bases and dependencies first
        #[arg(short, long)]
        recursive: bool,

        /// Rebuild even when the branch is already up to date
        #[arg(long)]
        force: bool,
    },
    /// Start managing the checked-out branch
    ///
    /// Example: git dep init --base main --depends-on lib --depends-on api
    Init {
        /// Base branch (default: init.default_base from config)
        #[arg(short, long)]
        base: Option<String>,

        /// Dependency branch (repeatable)
        #[arg(short, long = "depends-on")]
        depends_on: Vec<String>,
    },
    /// Add dependencies to the checked-out branch
    Add {
        #[arg(required = true)]
        deps: Vec<String>,
    },
    /// Remove dependencies from the checked-out branch
    Del {
        #[arg(required = true)]
        deps: Vec<String>,
    },
    /// Replace the dependency list of the checked-out branch
    Set {
        #[arg(required = true)]
        deps: Vec<String>,
    },
    /// Show the stored information of a branch
    Show {
        /// Branch to show (default: the checked-out branch)
        branch: Option<String>,
    },
    /// Report which branches need an update
    ///
    /// Examples:
    ///   git dep status
    ///   git dep status --all --recursive-deps
    ///   git dep status --all --dot | dot -Tsvg > deps.svg
    Status {
        /// Every managed branch instead of only the checked-out one
        #[arg(long)]
        all: bool,

        /// Also list the dependencies of dependencies
        #[arg(long)]
        recursive_deps: bool,

        /// Print a graphviz digraph instead of text
        #[arg(long)]
        dot: bool,
    },
    /// Write a merge-free copy of the checked-out branch
    ///
    /// The copy holds the base, one commit with the dependency content and the
    /// branch's own commits. Default target: regit/export/<branch>.
    Export {
        /// Target branch name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Replace the checked-out branch with its exported form
    Squash,
    /// Delete branches and rewire everything that referenced them
    DeleteBranch {
        #[arg(required = true)]
        branches: Vec<String>,
    },
    /// Override the recorded rebase tip of the checked-out branch
    ///
    /// Examples:
    ///   git dep set-rebase-tip HEAD~3
    ///   git dep set-rebase-tip --base
    SetRebaseTip {
        /// Commit to record as the rebase tip
        #[arg(required_unless_present = "base")]
        commit: Option<String>,

        /// Use the current head of the base branch
        #[arg(long, conflicts_with = "commit")]
        base: bool,
    },
    /// Attach an external reference (e.g. a pull request number)
    SetRef { label: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let paths = RepoPaths::discover(&cwd)?;
    let config_file = cli.config.as_deref().map(std::path::Path::new);
    let config = Config::load_with_file(Some(&paths.root), config_file)?;

    // Set up tracing
    let filter = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let session = Session::open(paths, config);

    if (cli.resume || cli.abort) && cli.command.is_some() {
        anyhow::bail!("--continue and --abort cannot be combined with a subcommand");
    }
    if cli.resume {
        return commands::operation::resume(&session);
    }
    if cli.abort {
        return commands::operation::abort(&session);
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };
    session.ensure_idle()?;

    match command {
        Commands::Update { recursive, force } => {
            commands::update::run(&session, recursive, force)?;
        }
        Commands::Init { base, depends_on } => {
            commands::init::run(&session, base.as_deref(), &depends_on)?;
        }
        Commands::Add { deps } => commands::deps::add(&session, &deps)?,
        Commands::Del { deps } => commands::deps::remove(&session, &deps)?,
        Commands::Set { deps } => commands::deps::set(&session, &deps)?,
        Commands::Show { branch } => commands::show::run(&session, branch.as_deref())?,
        Commands::Status {
            all,
            recursive_deps,
            dot,
        } => {
            commands::status::run(&session, all, recursive_deps, dot)?;
        }
        Commands::Export { name } => commands::export::run(&session, name.as_deref())?,
        Commands::Squash => commands::export::squash(&session)?,
        Commands::DeleteBranch { branches } => {
            commands::delete_branch::run(&session, &branches)?;
        }
        Commands::SetRebaseTip { commit, base } => {
            commands::rebase_tip::run(&session, commit.as_deref(), base)?;
        }
        Commands::SetRef { label } => commands::reference::run(&session, &label)?,
    }

    Ok(())
}
