//! Stock Shelf - Inventory Tracker
//!
//! Command-line front end. Each command refreshes the inventory from the
//! record store, runs, and prints the displayed list.

use clap::{Parser, Subcommand};
use shelf_common::{InventoryItem, Session, SortKey};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stock_shelf::config::{default_db_path, default_image_dir, FirebaseConfig};
use stock_shelf::{
    FirebaseStorage, FirestoreStore, IdentityClient, ImagePayload, InventorySync,
    LocalObjectStore, ObjectStore, RecordStore, SqliteStore, ViewState,
};

/// Inventory tracker backed by a local SQLite file or a Firebase project
#[derive(Parser, Debug)]
#[command(name = "stock_shelf")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file (local backend)
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    /// Directory for item photos (local backend)
    #[arg(long, default_value_t = default_image_dir())]
    images: String,

    /// Collection holding the inventory records
    #[arg(long, default_value = stock_shelf::store::INVENTORY_COLLECTION)]
    collection: String,

    /// Firebase project id; selects the Firebase backend when set
    #[arg(long, env = "FIREBASE_PROJECT_ID")]
    firebase_project: Option<String>,

    /// Firebase web API key
    #[arg(long, env = "FIREBASE_API_KEY", hide_env_values = true)]
    firebase_api_key: Option<String>,

    /// Storage bucket (default: {project}.appspot.com)
    #[arg(long, env = "FIREBASE_STORAGE_BUCKET")]
    firebase_bucket: Option<String>,

    /// Account email for the Firebase backend
    #[arg(long, env = "STOCK_SHELF_EMAIL")]
    email: Option<String>,

    /// Account password for the Firebase backend
    #[arg(long, env = "STOCK_SHELF_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Create the account instead of signing in
    #[arg(long, default_value_t = false)]
    sign_up: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the inventory
    List {
        /// Only show items whose name contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// name-asc, name-desc, quantity-asc or quantity-desc
        #[arg(long, default_value_t = SortKey::NameAsc)]
        sort: SortKey,
    },
    /// Add units of an item, creating it if needed
    Add {
        name: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: i64,

        /// Photo to attach to the item
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Add one unit of an item
    Increment { name: String },
    /// Take one unit of an item away
    Decrement { name: String },
    /// Delete an item whatever its quantity
    RemoveAll { name: String },
    /// Print the photo URL of an item
    Image { name: String },
    /// Serve the JSON API
    Serve {
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Starting stock_shelf...");

    let sync = match connect(&args).await {
        Ok(sync) => Arc::new(sync.with_collection(args.collection.clone())),
        Err(e) => {
            log::error!("Failed to set up backend: {}", e);
            std::process::exit(1);
        }
    };

    log::info!(
        "Inventory collection '{}' for user {}",
        sync.collection(),
        sync.session().user_id
    );

    if let Err(e) = sync.refresh().await {
        log::error!("Initial refresh failed: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args.command, sync).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Build the synchronizer for the backend selected on the command line
async fn connect(args: &Args) -> Result<InventorySync, Box<dyn std::error::Error>> {
    let Some(project) = args.firebase_project.as_deref() else {
        let db_path = PathBuf::from(&args.database);
        log::info!("Database path: {}", db_path.display());

        let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::open(&db_path)?);
        let objects: Arc<dyn ObjectStore> =
            Arc::new(LocalObjectStore::new(Path::new(&args.images))?);
        return Ok(InventorySync::new(store, objects, Session::local()));
    };

    let api_key = args
        .firebase_api_key
        .as_deref()
        .ok_or("--firebase-api-key is required with --firebase-project")?;
    let (email, password) = match (args.email.as_deref(), args.password.as_deref()) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err("--email and --password are required with --firebase-project".into()),
    };

    let mut config = FirebaseConfig::new(project, api_key);
    if let Some(bucket) = &args.firebase_bucket {
        config = config.with_bucket(bucket);
    }

    let client = stock_shelf::http::client()?;
    let identity = IdentityClient::new(client.clone(), &config);
    let session = if args.sign_up {
        identity.sign_up(email, password).await?
    } else {
        identity.sign_in(email, password).await?
    };
    log::info!("Signed in to project {} as {}", project, session.user_id);

    let store: Arc<dyn RecordStore> =
        Arc::new(FirestoreStore::new(client.clone(), &config, &session));
    let objects: Arc<dyn ObjectStore> =
        Arc::new(FirebaseStorage::new(client, &config, &session));
    Ok(InventorySync::new(store, objects, session))
}

async fn run(command: Command, sync: Arc<InventorySync>) -> Result<(), Box<dyn std::error::Error>> {
    let view = match command {
        Command::List { search, sort } => ViewState::new(search, sort),
        Command::Add {
            name,
            quantity,
            image,
        } => {
            let payload = match image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };
            sync.add_item(&name, quantity, payload.as_ref()).await?;
            ViewState::default()
        }
        Command::Increment { name } => {
            sync.add_item(&name, 1, None).await?;
            ViewState::default()
        }
        Command::Decrement { name } => {
            sync.decrement_item(&name).await?;
            ViewState::default()
        }
        Command::RemoveAll { name } => {
            sync.remove_all(&name).await?;
            ViewState::default()
        }
        Command::Image { name } => {
            match sync.lookup_image(&name).await? {
                Some(url) => println!("{}", url),
                None => println!("No image for '{}'", name),
            }
            return Ok(());
        }
        Command::Serve { port } => {
            return stock_shelf::web::serve(sync, port).await;
        }
    };

    print_items(&sync.display(&view).await, view.sort_key);
    Ok(())
}

async fn read_image(path: &Path) -> std::io::Result<ImagePayload> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(ImagePayload::from_file_name(bytes, &file_name))
}

fn print_items(items: &[InventoryItem], sort_key: SortKey) {
    if items.is_empty() {
        println!("Inventory is empty");
        return;
    }

    println!("{} item(s), sorted by {}", items.len(), sort_key.label());
    let width = items
        .iter()
        .map(|item| item.display_name().chars().count())
        .max()
        .unwrap_or(0);
    for item in items {
        let photo = if item.has_image() { " [photo]" } else { "" };
        println!(
            "{:<width$}  {:>6}{}",
            item.display_name(),
            item.quantity,
            photo,
            width = width
        );
    }
}
