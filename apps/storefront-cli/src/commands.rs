//! Subcommand handlers.
//!
//! Each handler builds the client pieces it needs from the config, calls
//! them, and prints the result. Failures are returned to `main`.

use std::sync::Arc;

use tienda_client::{
    place_order, AdminClient, ClientConfig, ClientError, ClientResult, Credentials, FileStorage,
    ReqwestTransport, ResilientFetcher, StorefrontApi,
};
use tienda_core::{
    AdminOrder, CartStore, CatalogQuery, CoreError, CustomerContact, OrderFilter, OrderStatus,
    SortOrder,
};

use crate::{AdminCommand, CartCommand, Commands};

pub(crate) async fn run(command: Commands, config: &ClientConfig) -> ClientResult<()> {
    match command {
        Commands::Products {
            category,
            search,
            sort,
        } => {
            let query = CatalogQuery {
                category,
                search,
                sort: sort.parse::<SortOrder>()?,
            };
            list_products(config, &query).await
        }
        Commands::Categories => list_categories(config).await,
        Commands::Cart(cart) => run_cart(cart, config).await,
        Commands::Checkout {
            name,
            email,
            phone,
            address,
        } => checkout(config, CustomerContact::new(name, email, phone, address)).await,
        Commands::Admin(admin) => run_admin(admin, config).await,
    }
}

// =============================================================================
// Wiring
// =============================================================================

fn shop_api(config: &ClientConfig) -> ClientResult<StorefrontApi<ReqwestTransport>> {
    let fetcher = ResilientFetcher::new(ReqwestTransport::new(), config.retry_policy()?);
    StorefrontApi::new(config.base_url(), fetcher)
}

fn open_storage(config: &ClientConfig) -> ClientResult<Arc<FileStorage>> {
    let path = config
        .storage_path()
        .ok_or_else(|| ClientError::InvalidConfig("no storage path available".into()))?;
    Ok(Arc::new(FileStorage::open(path)))
}

fn admin_client(
    config: &ClientConfig,
) -> ClientResult<AdminClient<Arc<FileStorage>, ReqwestTransport>> {
    let fetcher = ResilientFetcher::new(ReqwestTransport::new(), config.admin_retry_policy()?);
    let mut client = AdminClient::new(config.base_url(), fetcher, open_storage(config)?)?;
    client.restore_session();
    Ok(client)
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_products(config: &ClientConfig, query: &CatalogQuery) -> ClientResult<()> {
    let catalog = shop_api(config)?.fetch_catalog().await?;
    let view = catalog.query(query);

    if view.is_empty() {
        println!("No products match.");
        return Ok(());
    }

    println!("{:>5}  {:<30} {:>12}  {:<12} {:>6}", "ID", "NAME", "PRICE", "CATEGORY", "STOCK");
    for product in &view {
        println!(
            "{:>5}  {:<30} {:>12}  {:<12} {:>6}",
            product.id,
            product.name,
            format!("{}/{}", product.price, product.unit),
            product.category,
            product.stock
        );
    }
    println!("{} of {} products", view.len(), catalog.len());
    Ok(())
}

async fn list_categories(config: &ClientConfig) -> ClientResult<()> {
    let catalog = shop_api(config)?.fetch_catalog().await?;
    for category in catalog.categories() {
        println!("{}", category);
    }
    Ok(())
}

// =============================================================================
// Cart
// =============================================================================

async fn run_cart(command: CartCommand, config: &ClientConfig) -> ClientResult<()> {
    let mut cart = CartStore::load(open_storage(config)?);

    match command {
        CartCommand::Show => {}
        CartCommand::Add { id, qty } => {
            let catalog = shop_api(config)?.fetch_catalog().await?;
            let product = catalog.find(id).ok_or(CoreError::ProductNotFound(id))?;
            match cart.add(product, qty) {
                Some(line) => println!("{} × {} in cart", line.quantity, line.name),
                None => println!("{} is no longer in the cart", product.name),
            }
        }
        CartCommand::Qty { id, delta } => cart.change_quantity(id, delta),
        CartCommand::Remove { id } => cart.remove(id),
        CartCommand::Clear => cart.clear(),
    }

    print_cart(&cart);
    Ok(())
}

fn print_cart<S: tienda_core::Storage>(cart: &CartStore<S>) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        println!(
            "{:>5}  {:<30} {:>4} {:<8} {:>10}",
            line.id,
            line.name,
            line.quantity,
            line.unit,
            line.line_total().to_string()
        );
    }
    println!("Items: {}   Total: {}", cart.item_count(), cart.total());
}

async fn checkout(config: &ClientConfig, contact: CustomerContact) -> ClientResult<()> {
    let api = shop_api(config)?;
    let mut cart = CartStore::load(open_storage(config)?);
    let total = cart.total();

    let receipt = place_order(&api, &mut cart, &contact).await?;

    println!("Order #{} placed. Total: {}", receipt.id, total);
    if receipt.email_sent == Some(false) {
        println!("The confirmation email could not be sent; keep your order number.");
    }
    Ok(())
}

// =============================================================================
// Admin
// =============================================================================

async fn run_admin(command: AdminCommand, config: &ClientConfig) -> ClientResult<()> {
    let mut client = admin_client(config)?;

    match command {
        AdminCommand::Login { user, password } => {
            client.login(&Credentials::new(user, password)).await?;
            println!("Logged in.");
        }
        AdminCommand::Logout => {
            client.logout()?;
            println!("Logged out.");
        }
        AdminCommand::Stats => {
            let stats = client.stats().await?;
            println!("Orders:        {}", stats.total_orders);
            println!("Revenue:       {}", stats.total_revenue);
            println!("Pending:       {}", stats.count_for(OrderStatus::Pendiente));
            println!("Average order: {}", stats.average_order);
        }
        AdminCommand::Orders { status, search } => {
            let filter = OrderFilter {
                status: status.map(|s| s.parse::<OrderStatus>()).transpose()?,
                query: search,
            };
            let book = client.orders().await?;
            let view = book.filter(&filter);
            if view.is_empty() {
                println!("No orders match.");
            }
            for order in view {
                print_order_row(order);
            }
        }
        AdminCommand::Show { id } => {
            let book = client.orders().await?;
            let order = book.find(id).ok_or_else(|| {
                ClientError::InvalidConfig(format!("order #{} not found", id))
            })?;
            print_order_detail(order);
        }
        AdminCommand::SetStatus { id, status } => {
            let status = status.parse::<OrderStatus>()?;
            client.update_status(id, status).await?;
            println!("Order #{} is now {}", id, status);
        }
    }

    Ok(())
}

fn print_order_row(order: &AdminOrder) {
    println!(
        "#{:<6} {:<12} {:<24} {:<28} {:>10}  {}",
        order.id,
        order.date,
        order.customer_name,
        order.customer_email,
        order.total.to_string(),
        order.status
    );
}

fn print_order_detail(order: &AdminOrder) {
    println!("Order #{}  ({})", order.id, order.status);
    println!("Date:     {}", order.date);
    println!("Customer: {} <{}>", order.customer_name, order.customer_email);
    println!("Phone:    {}", order.customer_phone);
    println!("Address:  {}", order.delivery_address);
    for item in &order.items {
        println!(
            "  {:<30} {:>4} {:<8} {:>10}",
            item.name,
            item.quantity,
            item.unit,
            item.line_total().to_string()
        );
    }
    println!("Total:    {}", order.total);
}
