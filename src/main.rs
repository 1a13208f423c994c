use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, LevelFilter};
use mktorrent::torrent::v1::{AnnounceList, TorrentBuilder};
use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Create a .torrent file from a file or a directory.
#[derive(Debug, Parser)]
#[command(name = "mktorrent", version)]
#[command(about = "Create a .torrent file from a file or a directory", long_about = None)]
struct Args {
    /// File or directory to share
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Tracker announce url
    #[arg(short, long, value_name = "URL")]
    announce: String,

    /// Where to write the .torrent file
    #[arg(short = 't', long, value_name = "FILE")]
    output: PathBuf,

    /// Free-form comment
    #[arg(short, long)]
    comment: Option<String>,

    /// Piece size in KiB (a power of 2 between 32 and 16384)
    #[arg(short, long, value_name = "KIB", default_value_t = 1024)]
    piece_size: u64,

    /// Extra tracker url, forming a tier of its own (repeatable)
    #[arg(long, value_name = "URL")]
    announce_list: Vec<String>,

    /// Torrent name, defaults to the last component of PATH
    #[arg(short, long)]
    name: Option<String>,

    /// Value of the `created by` field
    #[arg(long, default_value = concat!("mktorrent/", env!("CARGO_PKG_VERSION")))]
    created_by: String,

    /// Do not record the creation date
    #[arg(long)]
    no_creation_date: bool,

    /// Mark the torrent as private
    #[arg(long)]
    private: bool,

    /// Number of hashing threads, 0 for one per physical core
    #[arg(short = 'j', long, default_value_t = 2)]
    threads: usize,

    /// Log debug output (ignored if RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    match env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) if verbose => {
            builder.filter_level(LevelFilter::Debug);
        }
        Err(_) => {
            builder.filter_level(LevelFilter::Warn);
        }
    }
    builder.init();
}

// One tier per url, primary tracker first. Clients that read `announce-list`
// ignore `announce`, so the primary must be listed too.
fn announce_tiers(announce: &str, extra: Vec<String>) -> Option<AnnounceList> {
    if extra.is_empty() {
        return None;
    }

    let mut tiers = vec![vec![announce.to_owned()]];
    tiers.extend(
        extra
            .into_iter()
            .filter(|url| url != announce)
            .map(|url| vec![url]),
    );
    Some(tiers)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);
    debug!("{:?}", args);

    let piece_length = args
        .piece_size
        .checked_mul(1024)
        .context("piece size is too large")?;

    let announce_list = announce_tiers(&args.announce, args.announce_list);
    let mut builder = TorrentBuilder::new(args.announce, &args.path, piece_length)
        .set_created_by(args.created_by)
        .set_privacy(args.private)
        .set_num_threads(args.threads);
    if let Some(announce_list) = announce_list {
        builder = builder.set_announce_list(announce_list);
    }
    if let Some(comment) = args.comment {
        builder = builder.set_comment(comment);
    }
    if let Some(name) = args.name {
        builder = builder.set_name(name);
    }
    if !args.no_creation_date {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is set before the Unix epoch")?;
        builder = builder.set_creation_date(now.as_secs());
    }

    let torrent = builder
        .build()
        .with_context(|| format!("failed to create torrent from [{}]", args.path.display()))?;
    torrent
        .write_into_file(&args.output)
        .with_context(|| format!("failed to write [{}]", args.output.display()))?;

    println!("{}", torrent.info_hash());
    Ok(())
}

#[cfg(test)]
mod announce_tiers_tests {
    use super::*;

    #[test]
    fn no_extra_trackers() {
        assert_eq!(announce_tiers("http://primary/announce", vec![]), None);
    }

    #[test]
    fn primary_is_first_tier() {
        assert_eq!(
            announce_tiers(
                "http://primary/announce",
                vec![
                    "http://backup1/announce".to_owned(),
                    "http://backup2/announce".to_owned(),
                ]
            ),
            Some(vec![
                vec!["http://primary/announce".to_owned()],
                vec!["http://backup1/announce".to_owned()],
                vec!["http://backup2/announce".to_owned()],
            ])
        );
    }

    #[test]
    fn primary_is_not_repeated() {
        assert_eq!(
            announce_tiers(
                "http://primary/announce",
                vec![
                    "http://primary/announce".to_owned(),
                    "http://backup/announce".to_owned(),
                ]
            ),
            Some(vec![
                vec!["http://primary/announce".to_owned()],
                vec!["http://backup/announce".to_owned()],
            ])
        );
    }

    #[test]
    fn parsed_args_keep_primary_tracker() {
        let args = Args::try_parse_from([
            "mktorrent",
            "-a",
            "http://primary/announce",
            "-t",
            "out.torrent",
            "--announce-list",
            "http://backup/announce",
            "dir",
        ])
        .unwrap();

        assert_eq!(
            announce_tiers(&args.announce, args.announce_list),
            Some(vec![
                vec!["http://primary/announce".to_owned()],
                vec!["http://backup/announce".to_owned()],
            ])
        );
    }
}
