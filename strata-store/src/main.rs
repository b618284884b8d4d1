use std::env;
use std::fs::metadata;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use strum::EnumString;

use strata::storage::FileStore;
use strata::tree::Strata;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store location
    store: String,

    /// Create a new store (will overwrite existing file)
    #[arg(short, long, default_value_t = false)]
    create: bool,

    /// Capacity (maximum keys per node) for a newly created store
    #[arg(long, default_value_t = 100)]
    capacity: usize,

    /// Persist one object per tree level instead of a single blob
    #[arg(short, long, default_value_t = false)]
    sharded: bool,

    #[command(subcommand)]
    parameter: Option<Parameter>,
}

#[derive(Debug, EnumString, Subcommand)]
#[strum(ascii_case_insensitive)]
enum Parameter {
    /// Display the tree as box-drawing text
    Ascii,
    /// Clear store entries
    Clear,
    /// Does our store contain this key
    Contains { key: i64 },
    /// Display B+Tree entry count
    Count,
    /// Get this key
    Get { key: i64 },
    /// Display tree height
    Height,
    /// Interactive Help
    Help,
    /// Insert key value pair
    Insert { key: i64, value: String },
    /// List store keys
    Keys,
    /// Display the tree as a Mermaid diagram
    Mermaid,
}

fn get_history_file() -> Option<PathBuf> {
    dirs::preference_dir()
        .and_then(|mut base| {
            base.push("strata");
            // Note: Not create_dir_all(), because we don't want to create preference
            // dirs if they don't exist.
            if metadata(base.clone()).ok().is_none() {
                std::fs::create_dir(base.clone()).ok()?
            }
            Some(base)
        })
        .map(|mut base| {
            base.push("history.txt");
            base
        })
}

fn parse_key(word: &str) -> Option<i64> {
    match word.parse::<i64>() {
        Ok(key) => Some(key),
        Err(_) => {
            println!("keys are integers");
            None
        }
    }
}

async fn interactive(mut tree: Strata<String>, store: FileStore, sharded: bool) -> Result<()> {
    // `()` can be used when no completer is required
    let mut rl = DefaultEditor::new()?;
    if let Some(file_location) = get_history_file() {
        if let Err(e) = rl.load_history(&file_location) {
            println!("error loading history: {e}");
        }
    }
    println!("terminate with ctrl-c or ctrl-d");
    loop {
        let readline = rl.readline("word: ");
        match readline {
            Ok(line) => {
                if line.is_empty() {
                    continue;
                }
                // EnumString doesn't deal with variant parameters, so...
                let words = line.split_whitespace().collect::<Vec<&str>>();
                let parameter = match Parameter::from_str(words[0]) {
                    Ok(p) => match p {
                        Parameter::Contains { key: _ } => {
                            if words.len() != 2 {
                                println!("usage: contains <key>");
                                continue;
                            }
                            let Some(key) = parse_key(words[1]) else {
                                continue;
                            };
                            Parameter::Contains { key }
                        }
                        Parameter::Get { key: _ } => {
                            if words.len() != 2 {
                                println!("usage: get <key>");
                                continue;
                            }
                            let Some(key) = parse_key(words[1]) else {
                                continue;
                            };
                            Parameter::Get { key }
                        }
                        Parameter::Insert { key: _, value: _ } => {
                            if words.len() != 3 {
                                println!("usage: insert <key> <value>");
                                continue;
                            }
                            let Some(key) = parse_key(words[1]) else {
                                continue;
                            };
                            Parameter::Insert {
                                key,
                                value: words[2].to_string(),
                            }
                        }
                        _ => p,
                    },
                    Err(e) => {
                        println!("error: {e}");
                        continue;
                    }
                };
                process_parameter(&mut tree, &store, sharded, &parameter).await;
                rl.add_history_entry(line.as_str())?;
            }
            Err(ReadlineError::Interrupted) => {
                println!("terminating...");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("terminating...");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
    if let Some(file_location) = get_history_file() {
        if let Err(e) = rl.save_history(&file_location) {
            println!("error saving history: {e}");
        }
    }
    Ok(())
}

async fn persist(tree: &Strata<String>, store: &FileStore, sharded: bool) {
    let result = if sharded {
        tree.save_sharded(store).await
    } else {
        tree.save(store).await
    };
    if let Err(e) = result {
        println!("save failed: {e}");
    }
}

async fn process_parameter(
    tree: &mut Strata<String>,
    store: &FileStore,
    sharded: bool,
    parameter: &Parameter,
) {
    match parameter {
        Parameter::Ascii => println!("{}", tree.to_ascii()),
        Parameter::Clear => {
            tree.clear();
            persist(tree, store, sharded).await;
            println!("cleared");
        }
        Parameter::Contains { key } => {
            if tree.contains(*key) {
                println!("true");
            } else {
                println!("false");
            }
        }
        Parameter::Count => println!("count: {}", tree.count()),
        Parameter::Get { key } => match tree.get(*key) {
            Some(value) => {
                println!("{value}");
            }
            None => {
                println!("not found");
            }
        },
        Parameter::Height => println!("height: {}", tree.height()),
        Parameter::Help => {
            let help = Cli::command().render_help().to_string();

            let mut print_it = false;

            for line in help.lines() {
                if line.starts_with("Arguments:") {
                    print_it = false;
                }
                if print_it && !line.is_empty() {
                    println!("{}", line);
                }
                if line.starts_with("Commands:") {
                    print_it = true;
                }
            }
        }
        Parameter::Insert { key, value } => {
            let updating = tree.contains(*key);
            tree.insert(*key, value.clone());
            persist(tree, store, sharded).await;
            if updating {
                println!("updated: {key}: {value}");
            } else {
                println!("inserted: {key}: {value}");
            }
        }
        Parameter::Keys => {
            for key in tree.keys() {
                println!("{key}");
            }
        }
        Parameter::Mermaid => println!("{}", tree.to_mermaid()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = match env::var("TMPDIR") {
        Ok(d) => d,
        Err(_e) => ".".to_string(),
    };

    let file_appender = tracing_appender::rolling::daily(log_dir, "strata.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt().with_writer(non_blocking).init();

    let store = FileStore::new(&cli.store);
    let tree: Strata<String> = if cli.create {
        let tree = Strata::try_new(cli.capacity)?;
        if cli.sharded {
            tree.save_sharded(&store).await?;
        } else {
            tree.save(&store).await?;
        }
        tree
    } else {
        let mut tree = Strata::try_new(cli.capacity)?;
        if cli.sharded {
            tree.load_sharded(&store).await?;
        } else {
            tree.load(&store).await?;
        }
        tree
    };

    match cli.parameter {
        Some(parameter) => {
            let mut tree = tree;
            process_parameter(&mut tree, &store, cli.sharded, &parameter).await;
        }
        None => interactive(tree, store, cli.sharded).await?,
    }
    Ok(())
}
