//! order-console - table ordering and kitchen display in the terminal
//!
//! Customer side: browse the menu, claim a table, fill the persisted cart,
//! submit and follow the order. Kitchen side: watch the board and move items
//! and orders through their statuses.

mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use order_client::{
    CartStore, ClientConfig, JsonFileStorage, KitchenBoard, MenuCatalog, OrderTracker, RestApi,
    TableId, TableLanding, TrackingView,
};
use shared::{ItemStatus, OrderStatus};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Restaurant API base URL, overrides ORDER_API_URL
    #[arg(long)]
    api_url: Option<String>,

    /// Cart storage directory, overrides ORDER_STORAGE_DIR
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Seconds between status polls, overrides ORDER_POLL_INTERVAL_SECS
    #[arg(long)]
    poll_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the menu by section
    Menu,
    /// Check a table and start ordering for it
    Table { table_id: String },
    /// Add a menu item to the cart
    Add {
        item_id: i64,
        #[arg(default_value_t = 1)]
        quantity: u32,
        /// Special instructions for this line
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Show the cart
    Cart,
    /// Remove a cart line (numbered from 1)
    Remove { line: usize },
    /// Set the quantity of a cart line; zero or less removes it
    Quantity {
        line: usize,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear {
        /// Also forget the table
        #[arg(long)]
        all: bool,
    },
    /// Send the cart to the kitchen
    Submit {
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Follow an order until it is ready
    Track { order_id: i64 },
    /// Show the kitchen board
    Kitchen {
        /// Keep refreshing until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Set an item's status (pending, preparing, ready)
    ItemStatus {
        order_id: i64,
        item_id: i64,
        status: ItemStatus,
    },
    /// Move an order to its next status (in_progress, completed)
    OrderStatus { order_id: i64, status: OrderStatus },
}

impl Cli {
    fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(dir) = &self.storage_dir {
            config = config.with_storage_dir(dir.clone());
        }
        if let Some(secs) = self.poll_secs {
            config = config.with_poll_interval(Duration::from_secs(secs.max(1)));
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing; stdout is reserved for the views
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "order_console=info,order_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    tracing::debug!(base_url = %config.base_url, "Using restaurant API");

    run(cli.command, &config).await
}

async fn run(command: Command, config: &ClientConfig) -> Result<()> {
    let api = Arc::new(config.build_api()?);

    match command {
        Command::Menu => {
            let catalog = MenuCatalog::fetch(api.as_ref()).await?;
            print!("{}", render::menu(&catalog));
        }
        Command::Table { table_id } => {
            let table_id: TableId = table_id.parse()?;
            let mut landing = TableLanding::new(table_id);
            landing.check(api.as_ref()).await;
            println!("{}", landing.status_message());

            let mut cart = open_cart(config);
            landing.start_ordering(&mut cart)?;
            println!("Ordering for table {table_id}");
        }
        Command::Add {
            item_id,
            quantity,
            note,
        } => {
            let catalog = MenuCatalog::fetch(api.as_ref()).await?;
            let item = catalog
                .find(item_id)
                .with_context(|| format!("No menu item with id {item_id}"))?;
            let mut cart = open_cart(config);
            cart.add_item(item, quantity, &note)?;
            print!("{}", render::cart(cart.session()));
        }
        Command::Cart => {
            let cart = open_cart(config);
            print!("{}", render::cart(cart.session()));
        }
        Command::Remove { line } => {
            let mut cart = open_cart(config);
            let index = line_index(&cart, line)?;
            cart.remove_item(index)?;
            print!("{}", render::cart(cart.session()));
        }
        Command::Quantity { line, quantity } => {
            let mut cart = open_cart(config);
            let index = line_index(&cart, line)?;
            cart.update_quantity(index, quantity)?;
            print!("{}", render::cart(cart.session()));
        }
        Command::Clear { all } => {
            let mut cart = open_cart(config);
            if all {
                cart.reset()?;
            } else {
                cart.clear_cart()?;
            }
            print!("{}", render::cart(cart.session()));
        }
        Command::Submit { notes } => {
            let mut cart = open_cart(config);
            let order = cart.submit_order(api.as_ref(), &notes).await?;
            println!("Order #{} placed", order.id);
            println!("Follow it with: order-console track {}", order.id);
        }
        Command::Track { order_id } => track(api, order_id, config.poll_interval).await?,
        Command::Kitchen { watch } => kitchen(api, config.poll_interval, watch).await?,
        Command::ItemStatus {
            order_id,
            item_id,
            status,
        } => {
            let board = loaded_board(api, config.poll_interval).await?;
            board.update_item_status(order_id, item_id, status).await?;
            board.stop();
            println!("Order #{order_id} item {item_id} is now {status}");
        }
        Command::OrderStatus { order_id, status } => {
            let board = loaded_board(api, config.poll_interval).await?;
            board.transition_order(order_id, status).await?;
            board.stop();
            println!("Order #{order_id} is now {status}");
        }
    }
    Ok(())
}

fn open_cart(config: &ClientConfig) -> CartStore<JsonFileStorage> {
    CartStore::load(config.session_storage())
}

/// 1-based line number to index
fn line_index(cart: &CartStore<JsonFileStorage>, line: usize) -> Result<usize> {
    if line == 0 || line > cart.items().len() {
        bail!("No cart line {line}; the cart has {} lines", cart.items().len());
    }
    Ok(line - 1)
}

async fn track(api: Arc<RestApi>, order_id: i64, interval: Duration) -> Result<()> {
    let tracker = OrderTracker::start(api, order_id, interval);
    let mut rx = tracker.subscribe();
    let mut shown: Option<TrackingView> = None;

    loop {
        let view = TrackingView::from_state(&rx.borrow_and_update());
        if shown.as_ref() != Some(&view) {
            print!("{}", render::tracking(&view));
        }
        let done = view.is_ready() || matches!(view, TrackingView::NotFound { .. });
        shown = Some(view);
        if done {
            break;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    tracker.stop();
    Ok(())
}

async fn loaded_board(api: Arc<RestApi>, interval: Duration) -> Result<KitchenBoard<RestApi>> {
    let board = KitchenBoard::start(api, interval);
    let state = board
        .subscribe()
        .wait_for(|s| !s.loading)
        .await
        .map(|s| s.clone())?;
    if let (None, Some(e)) = (&state.data, &state.error) {
        board.stop();
        bail!("Unable to load orders: {e}");
    }
    Ok(board)
}

async fn kitchen(api: Arc<RestApi>, interval: Duration, watch: bool) -> Result<()> {
    let board = loaded_board(api, interval).await?;
    let mut rx = board.subscribe();

    loop {
        let state = rx.borrow_and_update().clone();
        print!("{}", render::kitchen(&state, chrono::Utc::now()));
        if !watch {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    board.stop();
    Ok(())
}
