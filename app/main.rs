use std::{env::current_dir, path::PathBuf, process::exit};

use chrono::Local;
use clap::{Parser, Subcommand};
use lib::{repository::REPO_DIR, staging::Staged, Initialized, Repository};

#[derive(Parser, Debug)]
struct Arguments {
    #[arg(short = 'C', global = true, help = "run as if started in this directory")]
    dir: Option<PathBuf>,
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[clap(about = "initialize a new repository")]
    Init,
    #[clap(about = "stage a file for the next commit")]
    Add { path: String },
    #[clap(about = "record the staged files")]
    Commit {
        #[arg(short, long, help = "message to leave with this commit")]
        message: String,
    },
    #[clap(about = "show the history of the current branch")]
    Log,
    #[clap(about = "create a branch, or list branches when no name is given")]
    Branch { name: Option<String> },
    #[clap(about = "switch to a branch and restore its files")]
    Checkout { name: String },
    #[clap(about = "merge a branch into the current branch")]
    Merge { branch: String },
    #[clap(about = "show the current branch and the staged files")]
    Status,
}

fn run(args: Arguments) -> lib::Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => current_dir()?,
    };
    use Command::*;
    match args.cmd {
        Init => match Repository::init(dir)?.1 {
            Initialized::Fresh => {
                println!("Initialized empty VCS repository in {}/", REPO_DIR)
            }
            Initialized::Existing => {
                println!("Reinitialized existing VCS repository in {}/", REPO_DIR)
            }
        },
        Add { path } => match Repository::open(dir)?.stage(&path)? {
            Staged::Added => println!("Added '{}' to staging area.", path),
            Staged::AlreadyStaged => println!("'{}' is already staged.", path),
        },
        Commit { message } => {
            let mut repo = Repository::open(dir)?;
            let report = repo.commit(&message)?;
            for path in &report.skipped {
                eprintln!("warning: '{}' no longer exists, left out of the commit", path);
            }
            println!(
                "[{} {}] {}",
                repo.current_branch()?,
                report.commit.id(),
                report.commit.message
            );
        }
        Log => {
            let repo = Repository::open(dir)?;
            for commit in repo.history()? {
                let commit = commit?;
                let date = commit
                    .date()
                    .map(|date| {
                        date.with_timezone(&Local)
                            .format("%Y-%m-%d %H:%M:%S")
                            .to_string()
                    })
                    .unwrap_or_default();
                let marker = if commit.is_merge() { " (merge)" } else { "" };
                println!("commit {}{}", commit.id(), marker);
                println!("Date:   {}", date);
                println!("\n    {}\n", commit.message);
            }
        }
        Branch { name: Some(name) } => {
            Repository::open(dir)?.create_branch(&name)?;
            println!("Created branch '{}'.", name);
        }
        Branch { name: None } => {
            let repo = Repository::open(dir)?;
            let current = repo.current_branch()?;
            for name in repo.list_branches()? {
                let marker = if name == current { '*' } else { ' ' };
                println!("{} {}", marker, name);
            }
        }
        Checkout { name } => {
            Repository::open(dir)?.checkout(&name)?;
            println!("Switched to branch '{}'.", name);
        }
        Merge { branch } => {
            let merged = Repository::open(dir)?.merge(&branch)?;
            println!("[{}] {}", merged.id(), merged.message);
        }
        Status => {
            let repo = Repository::open(dir)?;
            println!("On branch {}", repo.current_branch()?);
            let staged = repo.staged()?;
            if staged.is_empty() {
                println!("nothing staged");
            } else {
                println!("Staged files:");
                for path in staged.paths() {
                    println!("    {}", path);
                }
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run(Arguments::parse()) {
        eprintln!("error: {}", err);
        exit(1);
    }
}
