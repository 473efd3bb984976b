use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stasher::api::client::Upload;
use stasher::api::error::ApiError;
use stasher::api::types::{
  Collection, Item, ItemListParams, NewCollection, NewItem, PriceFilter, RegisterRequest,
  SharePatch, Visibility,
};
use stasher::config::Config;
use stasher::error_message::extract_error_message;
use stasher::notify::ConsoleNotifier;
use stasher::query::QueryResult;
use stasher::storage::ViewMode;
use stasher::{logging, AppContext};

#[derive(Parser, Debug)]
#[command(name = "stasher")]
#[command(about = "Catalog your belongings from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/stasher/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Keep the session in memory only
  #[arg(long)]
  ephemeral: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Sign in and store the session
  Login {
    #[arg(long)]
    email: String,
    /// Falls back to $STASHER_PASSWORD
    #[arg(long)]
    password: Option<String>,
  },
  /// Create an account
  Register {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: String,
    /// Falls back to $STASHER_PASSWORD
    #[arg(long)]
    password: Option<String>,
  },
  /// Sign out and forget the stored session
  Logout,
  /// Show the signed-in user
  Whoami,
  #[command(subcommand)]
  Items(ItemCommand),
  #[command(subcommand)]
  Collections(CollectionCommand),
  #[command(subcommand)]
  Tags(VocabularyCommand),
  #[command(subcommand)]
  Locations(VocabularyCommand),
  /// Inventory totals
  Stats,
  /// Ask the assistant about your inventory
  Ask { question: Vec<String> },
  /// Upload an image, optionally setting it on an item
  Upload {
    path: PathBuf,
    #[arg(long)]
    item: Option<String>,
  },
  /// Show or set the listing layout
  ViewMode { mode: Option<ViewMode> },
}

#[derive(Subcommand, Debug)]
enum ItemCommand {
  List(ListArgs),
  Show {
    id: String,
  },
  Add(AddArgs),
  Archive {
    id: String,
    #[arg(long)]
    note: Option<String>,
  },
  Restore {
    id: String,
    #[arg(long)]
    note: Option<String>,
  },
  Gift {
    id: String,
    #[arg(long)]
    note: Option<String>,
  },
  /// Use one unit; the last unit archives the item
  Use {
    id: String,
    #[arg(long)]
    note: Option<String>,
  },
  Delete {
    id: String,
  },
}

#[derive(ClapArgs, Debug)]
struct ListArgs {
  #[arg(long)]
  search: Option<String>,
  #[arg(long)]
  location: Option<String>,
  #[arg(long)]
  tag: Option<String>,
  #[arg(long)]
  archived: bool,
  #[arg(long)]
  sort: Option<String>,
  #[arg(long)]
  page: Option<u32>,
  #[arg(long)]
  limit: Option<u32>,
  #[arg(long, value_enum, default_value_t = PriceFacet::All)]
  price: PriceFacet,
  #[arg(long)]
  min: Option<f64>,
  #[arg(long)]
  max: Option<f64>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PriceFacet {
  All,
  Priced,
  Priceless,
  Range,
}

#[derive(ClapArgs, Debug)]
struct AddArgs {
  name: String,
  #[arg(long)]
  description: Option<String>,
  #[arg(long, default_value_t = 1)]
  quantity: u32,
  #[arg(long)]
  location: Option<String>,
  #[arg(long = "tag")]
  tags: Vec<String>,
  #[arg(long, conflicts_with = "priceless")]
  price: Option<f64>,
  #[arg(long)]
  priceless: bool,
  #[arg(long)]
  icon: Option<String>,
}

#[derive(Subcommand, Debug)]
enum CollectionCommand {
  List,
  Show {
    id: String,
  },
  /// Read a publicly shared collection
  Shared {
    share_id: String,
  },
  Create {
    name: String,
    #[arg(long)]
    description: Option<String>,
  },
  /// Move the item at position FROM to position TO (0-based)
  Reorder {
    id: String,
    from: usize,
    to: usize,
  },
  Share {
    id: String,
    #[arg(long, conflicts_with = "disable")]
    enable: bool,
    #[arg(long)]
    disable: bool,
    #[arg(long, value_enum)]
    visibility: Option<VisibilityArg>,
  },
  /// Ask the assistant for collection ideas
  Suggest {
    /// Create every suggested collection
    #[arg(long)]
    create: bool,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VisibilityArg {
  Private,
  Unlisted,
  Public,
}

impl From<VisibilityArg> for Visibility {
  fn from(v: VisibilityArg) -> Self {
    match v {
      VisibilityArg::Private => Visibility::Private,
      VisibilityArg::Unlisted => Visibility::Unlisted,
      VisibilityArg::Public => Visibility::Public,
    }
  }
}

#[derive(Subcommand, Debug)]
enum VocabularyCommand {
  List,
  Add { name: String },
  Remove { name: String },
}

/// A hook already told the user what went wrong.
#[derive(Debug)]
struct Reported;

impl std::fmt::Display for Reported {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("operation failed")
  }
}

impl std::error::Error for Reported {}

trait Notified<T> {
  fn notified(self) -> Result<T>;
}

impl<T> Notified<T> for std::result::Result<T, ApiError> {
  fn notified(self) -> Result<T> {
    self.map_err(|_| Reported.into())
  }
}

/// Unwrap a read, turning its error into one line of text.
fn loaded<T>(result: QueryResult<T>, what: &str) -> Result<T> {
  result.into_result().map_err(|e| {
    let fallback = format!("Failed to load {}", what);
    eyre!("{}", extract_error_message(&e.to_value(), &fallback))
  })
}

fn password(arg: Option<String>) -> Result<String> {
  arg
    .or_else(|| std::env::var("STASHER_PASSWORD").ok())
    .ok_or_else(|| eyre!("Password required. Pass --password or set STASHER_PASSWORD."))
}

fn require_user(ctx: &AppContext) -> Result<()> {
  if ctx.session.is_authenticated() {
    Ok(())
  } else {
    Err(eyre!("Not signed in. Run `stasher login` first."))
  }
}

fn read_upload(path: &Path) -> Result<Upload> {
  let bytes = std::fs::read(path)
    .map_err(|e| eyre!("Failed to read {}: {}", path.display(), e))?;
  let name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "image".to_string());
  Ok(Upload::image(name, bytes))
}

fn print_item_row(item: &Item, mode: ViewMode) {
  let price = match (item.price, item.priceless) {
    (_, true) => "priceless".to_string(),
    (Some(p), _) => format!("{:.2}", p),
    (None, _) => "-".to_string(),
  };
  match mode {
    ViewMode::List => println!(
      "{:<26} {:<30} x{:<4} {:<16} {}",
      item.id,
      item.name,
      item.quantity,
      item.location.as_deref().unwrap_or("-"),
      price
    ),
    ViewMode::Grid => println!("[{}] {} (x{}, {})", item.id, item.name, item.quantity, price),
  }
}

fn print_item(item: &Item) {
  println!("{} ({})", item.name, item.id);
  if let Some(d) = &item.description {
    println!("  {}", d);
  }
  println!("  quantity: {}", item.quantity);
  if let Some(l) = &item.location {
    println!("  location: {}", l);
  }
  if !item.tags.is_empty() {
    println!("  tags: {}", item.tags.join(", "));
  }
  if item.priceless {
    println!("  price: priceless");
  } else if let Some(p) = item.price {
    println!("  price: {:.2}", p);
  }
  if item.archived {
    println!("  archived");
  }
  for entry in &item.history {
    match &entry.note {
      Some(note) => println!("  - {} {} ({})", entry.date, entry.action, note),
      None => println!("  - {} {}", entry.date, entry.action),
    }
  }
}

fn print_collection(collection: &Collection) {
  println!("{} ({})", collection.name, collection.id);
  if let Some(d) = &collection.description {
    println!("  {}", d);
  }
  let mut members = collection.items.clone();
  members.sort_by_key(|m| m.order);
  for member in members {
    match &member.note {
      Some(note) => println!("  {:>3}. {} - {}", member.order, member.item.name, note),
      None => println!("  {:>3}. {}", member.order, member.item.name),
    }
  }
}

async fn run_items(ctx: &AppContext, command: ItemCommand) -> Result<()> {
  let items = ctx.items();
  match command {
    ItemCommand::List(args) => {
      let filter = match args.price {
        PriceFacet::All => PriceFilter::All,
        PriceFacet::Priced => PriceFilter::Priced,
        PriceFacet::Priceless => PriceFilter::Priceless,
        PriceFacet::Range => PriceFilter::Range {
          min: args.min,
          max: args.max,
        },
      };
      let params = ItemListParams {
        search: args.search,
        location: args.location,
        tag: args.tag,
        archived: args.archived.then_some(true),
        sort: args.sort,
        page: args.page,
        limit: args.limit,
      };
      let page = loaded(items.list(params, filter).fetch().await, "items")?;
      let mode = ctx.tokens.view_mode();
      for item in &page.items {
        print_item_row(item, mode);
      }
      println!("page {} of {} ({} total)", page.page, page.total_pages.max(1), page.total);
    }
    ItemCommand::Show { id } => {
      let item = loaded(items.detail(&id).fetch().await, "item")?;
      print_item(&item);
    }
    ItemCommand::Add(args) => {
      let mut draft = NewItem::named(args.name);
      draft.description = args.description;
      draft.quantity = args.quantity;
      draft.location = args.location;
      draft.tags = args.tags;
      draft.price = args.price;
      draft.priceless = args.priceless;
      draft.icon_type = args.icon;
      let item = items.create(draft).await.notified()?;
      println!("Added {} ({})", item.name, item.id);
    }
    ItemCommand::Archive { id, note } => {
      let item = items.archive(&id, note.as_deref()).await.notified()?;
      println!("Archived {}", item.name);
    }
    ItemCommand::Restore { id, note } => {
      let item = items.restore(&id, note.as_deref()).await.notified()?;
      println!("Restored {}", item.name);
    }
    ItemCommand::Gift { id, note } => {
      let item = items.gift(&id, note.as_deref()).await.notified()?;
      println!("Gifted {}", item.name);
    }
    ItemCommand::Use { id, note } => {
      let current = loaded(items.detail(&id).fetch().await, "item")?;
      let item = items.use_item(&current, note.as_deref()).await.notified()?;
      if item.archived {
        println!("Used the last {}; archived", item.name);
      } else {
        println!("Used one {}; {} left", item.name, item.quantity);
      }
    }
    ItemCommand::Delete { id } => {
      items.delete(&id).await.notified()?;
      println!("Deleted {}", id);
    }
  }
  Ok(())
}

async fn run_collections(ctx: &AppContext, command: CollectionCommand) -> Result<()> {
  let collections = ctx.collections();
  match command {
    CollectionCommand::List => {
      for c in loaded(collections.list().fetch().await, "collections")? {
        println!("{:<26} {} ({} items)", c.id, c.name, c.items.len());
      }
    }
    CollectionCommand::Show { id } => {
      print_collection(&loaded(collections.detail(&id).fetch().await, "collection")?);
    }
    CollectionCommand::Shared { share_id } => {
      print_collection(&loaded(
        collections.shared(&share_id).fetch().await,
        "shared collection",
      )?);
    }
    CollectionCommand::Create { name, description } => {
      let created = collections
        .create(NewCollection {
          name,
          description,
          cover_image: None,
        })
        .await
        .notified()?;
      println!("Created {} ({})", created.name, created.id);
    }
    CollectionCommand::Reorder { id, from, to } => {
      collections.reorder(&id, from, to).await.notified()?;
      print_collection(&loaded(collections.detail(&id).fetch().await, "collection")?);
    }
    CollectionCommand::Share {
      id,
      enable,
      disable,
      visibility,
    } => {
      let patch = SharePatch {
        enabled: if enable {
          Some(true)
        } else if disable {
          Some(false)
        } else {
          None
        },
        visibility: visibility.map(Visibility::from),
        ..Default::default()
      };
      let share = collections.update_share(&id, patch).await.notified()?;
      match (share.enabled, share.share_id) {
        (true, Some(share_id)) => println!("Shared as {} ({:?})", share_id, share.visibility),
        _ => println!("Sharing disabled"),
      }
    }
    CollectionCommand::Suggest { create } => {
      let suggestions = ctx.ai().suggest_collections().await.notified()?;
      for s in &suggestions {
        println!("{} ({} items)", s.name, s.item_ids.len());
        if create {
          collections.create_from_suggestion(s).await.notified()?;
        }
      }
    }
  }
  Ok(())
}

async fn run_vocabulary(
  hooks: stasher::hooks::VocabularyHooks<'_>,
  command: VocabularyCommand,
) -> Result<()> {
  match command {
    VocabularyCommand::List => {
      for entry in hooks.list() {
        println!("{}", entry);
      }
    }
    VocabularyCommand::Add { name } => {
      let entries = hooks.add(&name).await.notified()?;
      println!("{}", entries.join(", "));
    }
    VocabularyCommand::Remove { name } => {
      let entries = hooks.remove(&name).await.notified()?;
      println!("{}", entries.join(", "));
    }
  }
  Ok(())
}

async fn run(ctx: &AppContext, command: Command) -> Result<()> {
  match command {
    Command::Login { email, password: pw } => {
      let user = ctx
        .session
        .login(&email, &password(pw)?)
        .await
        .map_err(|e| eyre!("{}", extract_error_message(&e.to_value(), "Login failed")))?;
      println!("Signed in as {}", user.name);
      return Ok(());
    }
    Command::Register {
      name,
      email,
      username,
      password: pw,
    } => {
      let request = RegisterRequest {
        name,
        email,
        username,
        password: password(pw)?,
      };
      let user = ctx.session.register(request).await.map_err(|e| {
        eyre!(
          "{}",
          extract_error_message(&e.to_value(), "Registration failed")
        )
      })?;
      println!("Welcome, {}", user.name);
      return Ok(());
    }
    Command::Logout => {
      ctx.session.logout().await;
      println!("Signed out");
      return Ok(());
    }
    Command::ViewMode { mode } => {
      if let Some(mode) = mode {
        ctx
          .tokens
          .set_view_mode(mode)
          .map_err(|e| eyre!("Failed to save view mode: {}", e))?;
      }
      println!("{}", ctx.tokens.view_mode());
      return Ok(());
    }
    Command::Collections(CollectionCommand::Shared { share_id }) => {
      // Public read, no session needed
      return run_collections(ctx, CollectionCommand::Shared { share_id }).await;
    }
    _ => require_user(ctx)?,
  }

  match command {
    Command::Whoami => {
      let user = loaded(ctx.users().me().fetch().await, "profile")?;
      println!("{} <{}>", user.name, user.email);
      if let Some(username) = &user.username {
        println!("  @{}", username);
      }
      println!(
        "  {} items, {} collections, currency {}",
        user.usage.item_count, user.usage.collection_count, user.currency
      );
    }
    Command::Items(command) => run_items(ctx, command).await?,
    Command::Collections(command) => run_collections(ctx, command).await?,
    Command::Tags(command) => run_vocabulary(ctx.tags(), command).await?,
    Command::Locations(command) => run_vocabulary(ctx.locations(), command).await?,
    Command::Stats => {
      let stats = loaded(ctx.stats().get().fetch().await, "stats")?;
      println!("items: {} ({} active)", stats.total_items, stats.active_items);
      println!(
        "archived: {}  gifted: {}  used: {}",
        stats.archived_items, stats.gifted_items, stats.used_items
      );
      println!("total value: {:.2}", stats.total_value);
      for bucket in &stats.by_location {
        println!("  @{}: {}", bucket.name, bucket.count);
      }
      for bucket in &stats.by_tag {
        println!("  #{}: {}", bucket.name, bucket.count);
      }
    }
    Command::Ask { question } => {
      let answer = ctx.ai().ask(&question.join(" ")).await.notified()?;
      println!("{}", answer.answer);
      for item in &answer.items {
        print_item_row(item, ViewMode::List);
      }
    }
    Command::Upload { path, item } => {
      let upload = read_upload(&path)?;
      match item {
        Some(id) => {
          let item = ctx.items().set_image(&id, upload).await.notified()?;
          println!("Set image on {}", item.name);
        }
        None => println!("{}", ctx.items().upload_image(upload).await.notified()?),
      }
    }
    Command::Login { .. }
    | Command::Register { .. }
    | Command::Logout
    | Command::ViewMode { .. } => {}
  }
  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  let mut config = Config::load(args.config.as_deref())?;
  if args.ephemeral {
    config.storage.ephemeral = true;
  }

  let _log_guard = match logging::init() {
    Ok(guard) => Some(guard),
    Err(e) => {
      eprintln!("warning: {}", e);
      None
    }
  };

  let ctx = AppContext::from_config(&config, Arc::new(ConsoleNotifier))?;
  ctx.session.bootstrap().await;

  match run(&ctx, args.command).await {
    Err(e) if e.downcast_ref::<Reported>().is_some() => std::process::exit(1),
    other => other,
  }
}
