use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod add;
mod cat_file;
mod check_ignore;
mod checkout;
mod commit;
mod commit_tree;
mod config;
mod hash_object;
mod init;
mod ls_tree;
mod repo;
mod rev_parse;
mod rm;
mod show_ref;
mod status;
mod tag;
mod write_tree;

#[derive(Parser, Debug)]
#[command(name = "vesigit", about = "A Git-compatible local version-control tool")]
pub struct Args {
    /// Increase logging verbosity (repeatable). Overridden by RUST_LOG if set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a new repository skeleton.
    Init {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Stage one or more paths into the index.
    Add { paths: Vec<String> },
    /// Unstage one or more paths (and optionally delete them from disk).
    Rm {
        #[arg(long)]
        cached: bool,
        paths: Vec<String>,
    },
    /// Hash a file as a blob, optionally writing it to the object store.
    HashObject {
        #[arg(short = 'w')]
        write: bool,
        file: PathBuf,
    },
    /// Print an object's content.
    CatFile {
        #[arg(short = 'p')]
        pretty_print: bool,
        object: String,
    },
    /// List a tree object's entries.
    LsTree {
        #[arg(long)]
        name_only: bool,
        tree_ish: String,
    },
    /// Build a tree object from the current index.
    WriteTree,
    /// Write a commit object directly from a tree and parent hashes.
    CommitTree {
        #[arg(short = 'm')]
        message: String,
        #[arg(short = 'p')]
        parents: Vec<String>,
        tree: String,
    },
    /// Build a tree from the index, commit it, and advance the current ref.
    Commit {
        #[arg(short = 'm')]
        message: String,
    },
    /// Create a tag. Annotated with `-a`/`-m`, lightweight otherwise.
    Tag {
        #[arg(short = 'a')]
        annotate: bool,
        #[arg(short = 'm')]
        message: Option<String>,
        name: Option<String>,
        #[arg(default_value = "HEAD")]
        object: String,
    },
    /// List every reference under refs/, resolved to its hash.
    ShowRef,
    /// Resolve a token (HEAD, a short hash, a branch, a tag) to a hash.
    RevParse { token: String },
    /// Show the three-way status (HEAD vs index vs working directory).
    Status,
    /// Report whether the given paths are ignored.
    CheckIgnore { paths: Vec<String> },
    /// Materialize a tree into an empty destination directory.
    Checkout { tree_ish: String, destination: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Init { path } => init::run(&path),
        Command::Add { paths } => add::run(&paths),
        Command::Rm { cached, paths } => rm::run(&paths, cached),
        Command::HashObject { write, file } => hash_object::run(write, &file),
        Command::CatFile { pretty_print, object } => cat_file::run(pretty_print, &object),
        Command::LsTree { name_only, tree_ish } => ls_tree::run(name_only, &tree_ish),
        Command::WriteTree => write_tree::run(),
        Command::CommitTree { message, parents, tree } => commit_tree::run(&tree, &parents, &message),
        Command::Commit { message } => commit::run(&message),
        Command::Tag {
            annotate,
            message,
            name,
            object,
        } => tag::run(annotate, message.as_deref(), name.as_deref(), &object),
        Command::ShowRef => show_ref::run(),
        Command::RevParse { token } => rev_parse::run(&token),
        Command::Status => status::run(),
        Command::CheckIgnore { paths } => check_ignore::run(&paths),
        Command::Checkout { tree_ish, destination } => checkout::run(&tree_ish, &destination),
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default_level = match verbose {
        0 => "warn",
        1 => "vesigit=info",
        2 => "vesigit=debug",
        _ => "vesigit=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
