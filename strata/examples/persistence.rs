use anyhow::Result;
use rand::{thread_rng, Rng};

use strata::storage::FileStore;
use strata::tree::Strata;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    // Build a tree with random entries
    let mut tree = Strata::new();
    let mut rng = thread_rng();
    for _ in 0..10_000 {
        let key = rng.gen_range(0..100_000);
        tree.insert(key, format!("value{key}"));
    }
    tree.info();

    let dir = tempfile::tempdir()?;
    let store = FileStore::new(dir.path().join("tree.db"));

    // Whole-tree persistence: one blob
    tree.save(&store).await?;
    let mut reloaded: Strata<String> = Strata::new();
    reloaded.load(&store).await?;
    println!("reloaded {} entries from one blob", reloaded.count());

    let probe = tree.keys()[0];
    assert_eq!(reloaded.get(probe), tree.get(probe));

    // Sharded persistence: one object per tree level
    tree.save_sharded(&store).await?;
    let mut sharded: Strata<String> = Strata::new();
    sharded.load_sharded(&store).await?;
    println!(
        "reloaded {} entries from {} level shards",
        sharded.count(),
        sharded.height() + 1
    );
    assert_eq!(sharded.get(probe), tree.get(probe));

    Ok(())
}
