//! # Seed Data Generator
//!
//! Creates (or opens) a local database file and loads the demo data, plus
//! an admin account, so the server can be pointed at it.
//!
//! ## Usage
//! ```bash
//! # Seed ./nexoventis.db
//! cargo run -p nexo-store --bin seed
//!
//! # Specify database path and admin credentials
//! cargo run -p nexo-store --bin seed -- --db ./data/nexo.db \
//!     --admin-email jefe@tienda.cl --admin-password secreto
//! ```

use std::env;
use std::path::PathBuf;

use nexo_store::fixtures::seed_if_empty;
use nexo_store::local::{Database, DbConfig, LocalStore};
use nexo_store::{Backend, Store};

struct Args {
    db_path: PathBuf,
    admin_email: String,
    admin_password: String,
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        db_path: PathBuf::from("./nexoventis.db"),
        admin_email: "admin@nexoventis.com".to_string(),
        admin_password: "admin123".to_string(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" if i + 1 < args.len() => {
                parsed.db_path = PathBuf::from(&args[i + 1]);
                i += 1;
            }
            "--admin-email" if i + 1 < args.len() => {
                parsed.admin_email = args[i + 1].clone();
                i += 1;
            }
            "--admin-password" if i + 1 < args.len() => {
                parsed.admin_password = args[i + 1].clone();
                i += 1;
            }
            "--help" | "-h" => {
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>              Database path (default: ./nexoventis.db)");
                println!("      --admin-email <EMAIL>    Admin account email");
                println!("      --admin-password <PASS>  Admin account password");
                println!("  -h, --help                   Show this help");
                return None;
            }
            other => {
                eprintln!("Ignoring unknown argument: {other}");
            }
        }
        i += 1;
    }

    Some(parsed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = parse_args() else {
        return Ok(());
    };

    println!("🌱 NEXOVENTIS Seed Data Generator");
    println!("   Database: {}", args.db_path.display());

    println!("\n📦 Connecting to database...");
    let db = Database::new(DbConfig::file(&args.db_path)).await?;
    let store = LocalStore::new(db);

    println!("🔄 Loading demo data...");
    if seed_if_empty(&store).await? {
        println!("   ✅ Products, customers and sales created");
    } else {
        println!("   ⏭️  Store already has products, skipping");
    }

    let backend = Backend::local(store, chrono::Duration::hours(nexo_core::SESSION_LIFETIME_HOURS));
    let created = backend
        .auth()
        .bootstrap_admin(&args.admin_email, &args.admin_password, "Administrador")
        .await?;
    if created {
        println!("   ✅ Admin account {} created", args.admin_email);
    } else {
        println!("   ⏭️  Users already exist, admin not created");
    }

    if let Some(store) = backend.system_store() {
        let products = store.products().all().await?;
        let customers = store.customers().all().await?;
        println!("\n📊 Database now contains:");
        println!("   {} products", products.len());
        println!("   {} customers", customers.len());
    }

    println!("\n🎉 Done!");
    Ok(())
}
