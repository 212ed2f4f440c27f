use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use ops_settings::{
    import_branches, import_categories, init_tracing, AppConfig, BranchRegistry, CategoryRegistry,
    SqliteStore,
};

const DEFAULT_DB_PATH: &str = "ops-settings.db";

const USAGE: &str = "\
Usage: ops-settings <command> [--db PATH]

Commands:
  init                               Create the database schema
  seed                               Create schema and insert default categories/branches
  list categories|branches [--all]   Print records (active only unless --all)
  import categories|branches FILE    Import records from a CSV file";

fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.log_level);

    let mut args: Vec<String> = env::args().skip(1).collect();
    let db_path = take_db_flag(&mut args)?
        .or_else(|| config.database.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

    match args.first().map(String::as_str) {
        Some("init") => run_init(&db_path),
        Some("seed") => run_seed(&db_path),
        Some("list") => run_list(&db_path, &args[1..]),
        Some("import") => run_import(&db_path, &args[1..]),
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
}

/// Pull `--db PATH` out of the argument list
fn take_db_flag(args: &mut Vec<String>) -> Result<Option<PathBuf>> {
    let Some(pos) = args.iter().position(|a| a == "--db") else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        bail!("--db requires a path");
    }
    let path = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(PathBuf::from(path)))
}

fn open_store(db_path: &Path) -> Result<SqliteStore> {
    SqliteStore::open(db_path).with_context(|| format!("Failed to open {}", db_path.display()))
}

fn run_init(db_path: &Path) -> Result<()> {
    println!("🔧 Setting up database...");
    open_store(db_path)?;
    println!("✓ Schema ready at {}", db_path.display());
    Ok(())
}

fn run_seed(db_path: &Path) -> Result<()> {
    let store = open_store(db_path)?;

    let categories = CategoryRegistry::with_store(store.categories()).seed_defaults()?;
    let branches = BranchRegistry::with_store(store.branches()).seed_defaults()?;

    println!("🌱 Seeded {} categories, {} branches", categories, branches);
    Ok(())
}

fn run_list(db_path: &Path, args: &[String]) -> Result<()> {
    let show_all = args.iter().any(|a| a == "--all");
    let store = open_store(db_path)?;

    match args.first().map(String::as_str) {
        Some("categories") => {
            let registry = CategoryRegistry::with_store(store.categories());
            let listing = if show_all {
                registry.list_all()?
            } else {
                registry.list_active()?
            };

            println!("🏷️  {} categories", listing.total);
            for c in listing.records {
                let status = if c.is_active { "active" } else { "inactive" };
                println!("  {}  {:<24} {:<24} {}", c.id, c.name, c.value, status);
            }
        }
        Some("branches") => {
            let registry = BranchRegistry::with_store(store.branches());
            let listing = if show_all {
                registry.list_all()?
            } else {
                registry.list_active()?
            };

            println!("🏬 {} branches", listing.total);
            for b in listing.records {
                let status = if b.is_active { "active" } else { "inactive" };
                println!(
                    "  {}  {:<24} {:<20} {}",
                    b.id,
                    b.name,
                    b.email.as_deref().unwrap_or("-"),
                    status
                );
            }
        }
        _ => return Err(anyhow!("list expects 'categories' or 'branches'")),
    }

    Ok(())
}

fn run_import(db_path: &Path, args: &[String]) -> Result<()> {
    let (Some(kind), Some(file)) = (args.first(), args.get(1)) else {
        bail!("import expects 'categories|branches FILE'");
    };
    let csv_path = Path::new(file);
    let store = open_store(db_path)?;

    println!("📂 Importing {} from {}...", kind, csv_path.display());
    let summary = match kind.as_str() {
        "categories" => {
            import_categories(&CategoryRegistry::with_store(store.categories()), csv_path)?
        }
        "branches" => import_branches(&BranchRegistry::with_store(store.branches()), csv_path)?,
        other => bail!("unknown resource '{other}', expected 'categories' or 'branches'"),
    };

    println!("✓ Imported: {}", summary.imported);
    println!("✓ Skipped: {}", summary.skipped);
    for error in &summary.errors {
        println!("  ⚠️  {}", error);
    }

    Ok(())
}
