use anyhow::{anyhow, bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use vp_admin::admin::model::{Item, Store, User, UserStoreRelation};
use vp_admin::admin::{AdminApi, AdminClient};
use vp_admin::auth::{self, Authenticator, BcryptVerifier, CredentialVerifier, Route, SessionStore};
use vp_admin::cache::{Entity, EntitySource};
use vp_admin::catalog::barcodes::{add_barcode, AddBarcode};
use vp_admin::catalog::labels::load_reference_data;
use vp_admin::catalog::price_levels::PriceLevels;
use vp_admin::catalog::{CatalogApi, CatalogClient};
use vp_admin::config;
use vp_admin::edit::Editable;
use vp_admin::http::HttpCore;
use vp_admin::send::{self, send_state};
use vp_admin::table::catalog_items::{catalog_item_table, ItemFilter};
use vp_admin::table::items::item_table;
use vp_admin::table::relations::relation_table;
use vp_admin::table::stores::store_table;
use vp_admin::table::users::user_table;
use vp_admin::table::{EntityTable, RowValidator};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Print the logged-in user
    Whoami,
    /// Show where a page request would land
    Route { path: String },
    #[command(subcommand)]
    Users(UsersCmd),
    #[command(subcommand)]
    Stores(StoresCmd),
    #[command(subcommand)]
    Relations(RelationsCmd),
    #[command(subcommand)]
    Items(ItemsCmd),
    #[command(subcommand)]
    Catalog(CatalogCmd),
}

#[derive(Debug, ClapArgs)]
struct EditArgs {
    #[arg(long)]
    id: String,
    /// Cell assignment, e.g. `--set Name=Ana`; repeatable
    #[arg(long = "set", required = true)]
    set: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum UsersCmd {
    List,
    Levels,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    Edit(EditArgs),
    Delete {
        #[arg(long)]
        id: String,
    },
    ResetPassword {
        #[arg(long)]
        id: String,
    },
    ChangePassword {
        /// Defaults to the logged-in user
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}

#[derive(Debug, Subcommand)]
enum StoresCmd {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        head_office: String,
        #[arg(long)]
        store_token: String,
        #[arg(long)]
        head_office_token: String,
    },
    Edit(EditArgs),
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum RelationsCmd {
    List,
    Create {
        #[arg(long)]
        user: String,
        #[arg(long)]
        store: String,
    },
    Edit(EditArgs),
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum ItemsCmd {
    List {
        #[arg(long)]
        store: i64,
    },
    Create {
        #[arg(long)]
        store: i64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        number: String,
        #[arg(long, default_value = "")]
        barcode: String,
    },
    Edit {
        #[arg(long)]
        store: i64,
        #[command(flatten)]
        edit: EditArgs,
    },
    Delete {
        #[arg(long)]
        store: i64,
        #[arg(long)]
        id: i64,
    },
    /// Push items to the retail catalog
    Send {
        #[arg(long)]
        store: i64,
        #[arg(long = "item", required = true)]
        items: Vec<i64>,
    },
    History {
        #[arg(long)]
        item: i64,
    },
}

#[derive(Debug, Subcommand)]
enum CatalogCmd {
    Search {
        #[arg(long)]
        store: i64,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        number: String,
    },
    Edit {
        #[arg(long)]
        store: i64,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        number: String,
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Reference-data option lists
    Labels {
        #[arg(long)]
        store: i64,
        /// Only the categories of this department
        #[arg(long)]
        department: Option<String>,
    },
    Barcodes {
        #[arg(long)]
        store: i64,
        #[arg(long)]
        item: i64,
        #[arg(long)]
        add: Option<String>,
    },
    PriceLevels {
        #[arg(long)]
        store: i64,
        #[arg(long)]
        item: i64,
        /// LEVEL:PRICE
        #[arg(long)]
        create: Option<String>,
        /// LEVEL:PRICE
        #[arg(long)]
        update: Option<String>,
        #[arg(long)]
        delete: Option<i64>,
    },
}

struct Ctx {
    admin: Arc<dyn AdminApi>,
    catalog: Arc<dyn CatalogApi>,
    verifier: Arc<dyn CredentialVerifier>,
    auth: Authenticator,
}

impl Ctx {
    fn me(&self) -> Result<User> {
        let session = self.auth.session()?;
        Ok(session.require()?.clone())
    }

    /// Head-office token of one of the logged-in user's stores.
    async fn head_office_token(&self, me: &User, store_id: i64) -> Result<String> {
        let table = store_table(self.admin.clone(), self.catalog.clone(), me.clone());
        ensure_loaded(&table).await?;
        let store = table
            .cache()
            .get(&store_id)
            .await
            .ok_or_else(|| anyhow!("store {store_id} is not linked to this account"))?;
        Ok(store.head_office_token)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let base_url = cfg.base_url()?;
    let admin: Arc<dyn AdminApi> = Arc::new(AdminClient::new(HttpCore::new(base_url.clone(), None)?));
    let catalog_api: Arc<dyn CatalogApi> = Arc::new(CatalogClient::new(HttpCore::new(
        base_url,
        cfg.subscription_key(),
    )?));
    let verifier: Arc<dyn CredentialVerifier> = Arc::new(BcryptVerifier::default());
    let auth = Authenticator::new(
        admin.clone(),
        verifier.clone(),
        SessionStore::new(cfg.session_path()),
    );
    let ctx = Ctx {
        admin,
        catalog: catalog_api,
        verifier,
        auth,
    };

    match args.command {
        Command::Login { email, password } => match ctx.auth.login(&email, &password).await {
            Ok(route) => println!("{}", route.path()),
            Err(err @ auth::AuthError::InvalidCredentials) => {
                println!("{}", Route::Login.path());
                bail!(err);
            }
            Err(err) => return Err(err.into()),
        },
        Command::Logout => println!("{}", ctx.auth.logout()?.path()),
        Command::Whoami => {
            let me = ctx.me()?;
            println!("{}", serde_json::to_string_pretty(&me)?);
        }
        Command::Route { path } => {
            let session = ctx.auth.session()?;
            println!("{}", Route::resolve(&path, &session).path());
        }
        Command::Users(cmd) => users(&ctx, cmd).await?,
        Command::Stores(cmd) => stores(&ctx, cmd).await?,
        Command::Relations(cmd) => relations(&ctx, cmd).await?,
        Command::Items(cmd) => items(&ctx, cmd).await?,
        Command::Catalog(cmd) => catalog(&ctx, cmd).await?,
    }
    Ok(())
}

async fn ensure_loaded<T, S, V>(table: &EntityTable<T, S, V>) -> Result<()>
where
    T: Editable,
    S: EntitySource<T>,
    V: RowValidator<T>,
{
    table.refresh().await;
    if table.load_failed().await {
        bail!("Error loading data");
    }
    Ok(())
}

/// Apply `Field=value` assignments to one row and save them as a batch.
async fn edit_and_save<T, S, V>(table: &mut EntityTable<T, S, V>, id: &T::Id, sets: &[String]) -> Result<()>
where
    T: Editable,
    S: EntitySource<T>,
    V: RowValidator<T>,
{
    ensure_loaded(table).await?;
    for assignment in sets {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected Field=value, got {assignment:?}"))?;
        if let Some(err) = table.set(id, name, value).await? {
            warn!(field = name, %err, "cell rejected");
            println!("{name}: {err}");
        }
    }
    if !table.can_save() {
        table.cancel();
        bail!("save disabled: fix the reported cells");
    }
    report_write("update", table.save().await?)
}

fn report_write(action: &str, ok: bool) -> Result<()> {
    if ok {
        info!(action, "write accepted");
        println!("{action}: ok");
        Ok(())
    } else {
        bail!("{action} was not accepted by the server")
    }
}

fn parse_level_price(raw: &str) -> Result<(i64, f64)> {
    let (level, price) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("expected LEVEL:PRICE, got {raw:?}"))?;
    Ok((
        level.trim().parse().context("price level")?,
        price.trim().parse().context("price")?,
    ))
}

fn print_user(u: &User) {
    println!(
        "{}\t{}\t{}\tlevel={}\tmanager={}\tnew={}",
        u.user_id.as_deref().unwrap_or("-"),
        u.name,
        u.email,
        u.user_level_id,
        u.manager_user_id.as_deref().unwrap_or("-"),
        u.is_new_user
    );
}

fn print_store(s: &Store) {
    println!(
        "{}\t{}\t{}\t{}\t{}",
        s.store_id, s.store_name, s.head_office_name, s.store_token, s.head_office_token
    );
}

fn print_relation(r: &UserStoreRelation) {
    println!("{}\tuser={}\tstore={}", r.relation_id, r.user_id, r.store_id);
}

fn print_item(i: &Item) {
    println!(
        "{}\t{}\t{}\t{}\t{:.2}\t{:?}",
        i.item_id,
        i.item_number,
        i.barcode,
        i.item_name,
        i.unit_price,
        send_state(i)
    );
}

async fn users(ctx: &Ctx, cmd: UsersCmd) -> Result<()> {
    let me = ctx.me()?;
    let mut table = user_table(ctx.admin.clone(), ctx.verifier.clone(), me.clone());
    match cmd {
        UsersCmd::List => {
            ensure_loaded(&table).await?;
            table.rows().await.iter().for_each(print_user);
        }
        UsersCmd::Levels => {
            for level in ctx.admin.user_levels().await? {
                println!("{}\t{}", level.user_level_id, level.name);
            }
        }
        UsersCmd::Create { name, email } => {
            let user = User {
                name,
                email,
                ..Default::default()
            };
            report_write("create", table.create_row(user).await?)?;
        }
        UsersCmd::Edit(edit) => edit_and_save(&mut table, &edit.id, &edit.set).await?,
        UsersCmd::Delete { id } => report_write("delete", table.delete_row(id).await?)?,
        UsersCmd::ResetPassword { id } => {
            ensure_loaded(&table).await?;
            let user = table
                .cache()
                .get(&id)
                .await
                .ok_or_else(|| anyhow!("no user {id}"))?;
            auth::reset_password(ctx.admin.as_ref(), ctx.verifier.as_ref(), &user).await?;
            println!("password reset to default");
        }
        UsersCmd::ChangePassword {
            id,
            current,
            new,
            confirm,
        } => {
            let user = match id.filter(|id| Some(id) != me.id().as_ref()) {
                None => me.clone(),
                Some(id) => {
                    ensure_loaded(&table).await?;
                    table
                        .cache()
                        .get(&id)
                        .await
                        .ok_or_else(|| anyhow!("no user {id}"))?
                }
            };
            let updated = auth::change_password(
                ctx.admin.as_ref(),
                ctx.verifier.as_ref(),
                &user,
                &current,
                &new,
                &confirm,
            )
            .await?;
            if updated.id() == me.id() {
                ctx.auth.store().save(&updated)?;
            }
            println!("password changed");
        }
    }
    Ok(())
}

async fn stores(ctx: &Ctx, cmd: StoresCmd) -> Result<()> {
    let me = ctx.me()?;
    let mut table = store_table(ctx.admin.clone(), ctx.catalog.clone(), me);
    match cmd {
        StoresCmd::List => {
            ensure_loaded(&table).await?;
            table.rows().await.iter().for_each(print_store);
        }
        StoresCmd::Create {
            name,
            head_office,
            store_token,
            head_office_token,
        } => {
            let store = Store {
                store_id: 0,
                store_name: name,
                head_office_name: head_office,
                store_token,
                head_office_token,
            };
            report_write("create", table.create_row(store).await?)?;
        }
        StoresCmd::Edit(edit) => {
            let id: i64 = edit.id.parse().context("store id")?;
            edit_and_save(&mut table, &id, &edit.set).await?;
        }
        StoresCmd::Delete { id } => report_write("delete", table.delete_row(id).await?)?,
    }
    Ok(())
}

async fn relations(ctx: &Ctx, cmd: RelationsCmd) -> Result<()> {
    let me = ctx.me()?;
    let mut table = relation_table(ctx.admin.clone(), me);
    match cmd {
        RelationsCmd::List => {
            ensure_loaded(&table).await?;
            table.rows().await.iter().for_each(print_relation);
        }
        RelationsCmd::Create { user, store } => {
            let relation = UserStoreRelation {
                relation_id: 0,
                user_id: user,
                store_id: store,
            };
            report_write("create", table.create_row(relation).await?)?;
        }
        RelationsCmd::Edit(edit) => {
            let id: i64 = edit.id.parse().context("relation id")?;
            edit_and_save(&mut table, &id, &edit.set).await?;
        }
        RelationsCmd::Delete { id } => report_write("delete", table.delete_row(id).await?)?,
    }
    Ok(())
}

async fn items(ctx: &Ctx, cmd: ItemsCmd) -> Result<()> {
    let me = ctx.me()?;
    match cmd {
        ItemsCmd::List { store } => {
            let token = ctx.head_office_token(&me, store).await?;
            let table = item_table(ctx.admin.clone(), ctx.catalog.clone(), me, &token);
            ensure_loaded(&table).await?;
            table.rows().await.iter().for_each(print_item);
        }
        ItemsCmd::Create {
            store,
            name,
            number,
            barcode,
        } => {
            let token = ctx.head_office_token(&me, store).await?;
            let table = item_table(ctx.admin.clone(), ctx.catalog.clone(), me, &token);
            let item = Item {
                item_name: name,
                item_number: number,
                barcode,
                ..Default::default()
            };
            report_write("create", table.create_row(item).await?)?;
        }
        ItemsCmd::Edit { store, edit } => {
            let token = ctx.head_office_token(&me, store).await?;
            let mut table = item_table(ctx.admin.clone(), ctx.catalog.clone(), me, &token);
            let id: i64 = edit.id.parse().context("item id")?;
            edit_and_save(&mut table, &id, &edit.set).await?;
        }
        ItemsCmd::Delete { store, id } => {
            let token = ctx.head_office_token(&me, store).await?;
            let table = item_table(ctx.admin.clone(), ctx.catalog.clone(), me, &token);
            report_write("delete", table.delete_row(id).await?)?;
        }
        ItemsCmd::Send { store, items } => {
            let token = ctx.head_office_token(&me, store).await?;
            let table = item_table(ctx.admin.clone(), ctx.catalog.clone(), me, &token);
            ensure_loaded(&table).await?;
            let mut selected = Vec::with_capacity(items.len());
            for id in &items {
                selected.push(
                    table
                        .cache()
                        .get(id)
                        .await
                        .ok_or_else(|| anyhow!("no item {id}"))?,
                );
            }
            let notes = send::send_items(ctx.catalog.as_ref(), &table, &token, &selected).await?;
            notes.iter().for_each(|n| println!("{n}"));
        }
        ItemsCmd::History { item } => match send::last_send_history(ctx.admin.as_ref(), item).await? {
            Some(h) => println!(
                "{}\t{}\t{}\t{}",
                h.send_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
                h.action.unwrap_or_default(),
                h.status.unwrap_or_default(),
                h.response_msg.unwrap_or_default()
            ),
            None => println!("never sent"),
        },
    }
    Ok(())
}

async fn catalog(ctx: &Ctx, cmd: CatalogCmd) -> Result<()> {
    let me = ctx.me()?;
    match cmd {
        CatalogCmd::Search {
            store,
            name,
            number,
        } => {
            let token = ctx.head_office_token(&me, store).await?;
            let table = catalog_item_table(ctx.admin.clone(), ctx.catalog.clone(), &me, &token);
            table
                .source()
                .set_filter(ItemFilter {
                    item_name: name,
                    item_number: number,
                })
                .await;
            ensure_loaded(&table).await?;
            table.rows().await.iter().for_each(|c| print_item(&c.0));
        }
        CatalogCmd::Edit {
            store,
            name,
            number,
            edit,
        } => {
            let token = ctx.head_office_token(&me, store).await?;
            let mut table = catalog_item_table(ctx.admin.clone(), ctx.catalog.clone(), &me, &token);
            table
                .source()
                .set_filter(ItemFilter {
                    item_name: name,
                    item_number: number,
                })
                .await;
            let id: i64 = edit.id.parse().context("item id")?;
            edit_and_save(&mut table, &id, &edit.set).await?;
        }
        CatalogCmd::Labels { store, department } => {
            let token = ctx.head_office_token(&me, store).await?;
            match department {
                Some(dept) => {
                    let categories = ctx.catalog.categories_by_department(&token, &dept).await?;
                    println!("{}", serde_json::to_string_pretty(&categories)?);
                }
                None => {
                    let data = load_reference_data(ctx.catalog.as_ref(), &token).await?;
                    println!("{}", serde_json::to_string_pretty(&data)?);
                }
            }
        }
        CatalogCmd::Barcodes { store, item, add } => {
            let token = ctx.head_office_token(&me, store).await?;
            if let Some(code) = add {
                match add_barcode(ctx.catalog.as_ref(), &token, item, &code).await? {
                    AddBarcode::Added => println!("added {}", code.trim()),
                    AddBarcode::Empty => println!("nothing to add"),
                    AddBarcode::Duplicate => bail!("Duplicate Barcodes"),
                    AddBarcode::Rejected => bail!("barcode was not accepted"),
                }
            }
            for b in ctx.catalog.item_barcodes(&token, item).await? {
                println!("{}\tqty={}", b.barcode, b.qty);
            }
        }
        CatalogCmd::PriceLevels {
            store,
            item,
            create,
            update,
            delete,
        } => {
            let token = ctx.head_office_token(&me, store).await?;
            let levels = PriceLevels::new(ctx.catalog.as_ref(), token, item);
            if let Some(raw) = create {
                let (level, price) = parse_level_price(&raw)?;
                report_write("create", levels.create(level, price).await.map(|_| true)?)?;
            }
            if let Some(raw) = update {
                let (level, price) = parse_level_price(&raw)?;
                report_write("update", levels.update(level, price).await?)?;
            }
            if let Some(level) = delete {
                report_write("delete", levels.delete(level).await?)?;
            }
            for l in levels.list().await? {
                println!("level={}\tprice={:.2}", l.price_level, l.price);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn catalog_group_dispatches() {
        let args = Args::try_parse_from([
            "vp-admin", "catalog", "labels", "--store", "3", "--department", "12",
        ])
        .unwrap();
        match args.command {
            Command::Catalog(CatalogCmd::Labels { store, department }) => {
                assert_eq!(store, 3);
                assert_eq!(department.as_deref(), Some("12"));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let args = Args::try_parse_from([
            "vp-admin", "catalog", "price-levels", "--store", "3", "--item", "8", "--create", "2:4.50",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Command::Catalog(CatalogCmd::PriceLevels { create: Some(ref c), .. }) if c == "2:4.50"
        ));
    }

    #[test]
    fn writes_report_the_same_way() {
        assert!(report_write("create", true).is_ok());
        let err = report_write("create", false).unwrap_err();
        assert_eq!(err.to_string(), "create was not accepted by the server");
        assert_eq!(parse_level_price("2:4.50").unwrap(), (2, 4.5));
    }
}
