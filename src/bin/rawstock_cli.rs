use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use rawstock_console::{
    client::{ApiClient, InventoryApi},
    config::{self, ConsoleConfig},
    models::{display_date, Customer, CustomerStatus, PurchaseOrder, PurchaseOrderStatus},
    services::{
        customer_form::{ContactForm, CustomerForm},
        customers::{CustomerPage, ViewMode},
        order_form::{LineItemDraft, LineItemField, PurchaseOrderDraft, ReceiveForm},
        pricing,
        purchase_orders::{available_actions, PurchaseOrderPage},
        AutoConfirm, Confirm,
    },
};
use serde_json::json;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize()?;

    let auto = AutoConfirm(true);
    let confirm: &dyn Confirm = if cli.yes { &auto } else { &prompt_confirm };

    match cli.command {
        Commands::Customers(command) => {
            handle_customers_command(&context, command, cli.json, confirm).await?
        }
        Commands::Orders(command) => {
            handle_orders_command(&context, command, cli.json, confirm).await?
        }
        Commands::Materials(command) => handle_materials_command(&context, command, cli.json).await?,
        Commands::Suppliers(command) => handle_suppliers_command(&context, command, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "rawstock",
    about = "Raw-material inventory console: customers, purchase orders and invoices",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[arg(
        long,
        short = 'y',
        global = true,
        action = ArgAction::SetTrue,
        help = "Answer yes to every confirmation prompt"
    )]
    yes: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Customers(CustomersCommands),
    #[command(subcommand)]
    Orders(OrdersCommands),
    #[command(subcommand)]
    Materials(ListOnlyCommands),
    #[command(subcommand)]
    Suppliers(ListOnlyCommands),
}

#[derive(Subcommand)]
enum CustomersCommands {
    List(ListCustomersArgs),
    Show(IdArgs),
    Create(CustomerFieldArgs),
    Update(UpdateCustomerArgs),
    Delete(IdArgs),
}

#[derive(Subcommand)]
enum OrdersCommands {
    List(ListOrdersArgs),
    Show(IdArgs),
    Create(OrderFieldArgs),
    Update(UpdateOrderArgs),
    Place(IdArgs),
    Receive(ReceiveOrderArgs),
    Cancel(IdArgs),
    Delete(IdArgs),
    SuggestSuppliers(SuggestSuppliersArgs),
    Invoice(InvoiceArgs),
}

#[derive(Subcommand)]
enum ListOnlyCommands {
    List,
}

#[derive(Args)]
struct IdArgs {
    #[arg(help = "Record identifier")]
    id: String,
}

#[derive(Args)]
struct ListCustomersArgs {
    #[arg(long, help = "Match company name or city/state (case-insensitive)")]
    search: Option<String>,
    #[arg(long, value_parser = CustomerStatus::from_str, help = "Only active or inactive customers")]
    status: Option<CustomerStatus>,
    #[arg(long, value_parser = ViewMode::from_str, default_value = "list", help = "list or grid")]
    view: ViewMode,
}

#[derive(Args)]
struct CustomerFieldArgs {
    #[arg(long, help = "Company name")]
    company: Option<String>,
    #[arg(long, help = "active or inactive")]
    status: Option<String>,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    pincode: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long = "gst", help = "GSTIN, 15 characters")]
    gst_number: Option<String>,
    #[arg(long = "pan", help = "PAN, e.g. ABCDE1234F")]
    pan_number: Option<String>,
    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Use the shipping address for billing"
    )]
    billing_same: bool,
    #[arg(long)]
    billing_street: Option<String>,
    #[arg(long)]
    billing_city: Option<String>,
    #[arg(long)]
    billing_state: Option<String>,
    #[arg(long)]
    billing_pincode: Option<String>,
    #[arg(
        long = "contact",
        value_parser = parse_contact,
        action = ArgAction::Append,
        help = "Contact in key=value pairs (e.g. name=Anita,phone=+91 98220 12345,email=a@b.in[,designation=Buyer][,primary=true]); replaces existing contacts"
    )]
    contacts: Vec<ContactForm>,
}

#[derive(Args)]
struct UpdateCustomerArgs {
    #[arg(help = "Customer identifier")]
    id: String,
    #[command(flatten)]
    fields: CustomerFieldArgs,
}

#[derive(Args)]
struct ListOrdersArgs {
    #[arg(long, help = "Match PO number or supplier name (case-insensitive)")]
    search: Option<String>,
    #[arg(long, value_parser = PurchaseOrderStatus::from_str, help = "draft, ordered, received or cancelled")]
    status: Option<PurchaseOrderStatus>,
}

#[derive(Args)]
struct OrderFieldArgs {
    #[arg(long, help = "Supplier identifier")]
    supplier: Option<String>,
    #[arg(long, value_parser = parse_date, help = "Order date, YYYY-MM-DD (defaults to today)")]
    order_date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date, help = "Expected delivery date, YYYY-MM-DD")]
    expected: Option<NaiveDate>,
    #[arg(long, help = "Free-form notes printed on the invoice")]
    notes: Option<String>,
    #[arg(
        long = "item",
        value_parser = parse_order_item,
        action = ArgAction::Append,
        help = "Line item in key=value pairs (e.g. material=ID,weight=10,rate=50[,length=2][,rate_km=4][,location=Yard A][,details=Rack 3][,containers=2][,notes=Text])"
    )]
    items: Vec<LineItemDraft>,
}

#[derive(Args)]
struct UpdateOrderArgs {
    #[arg(help = "Purchase order identifier")]
    id: String,
    #[command(flatten)]
    fields: OrderFieldArgs,
}

#[derive(Args)]
struct ReceiveOrderArgs {
    #[arg(help = "Purchase order identifier")]
    id: String,
    #[arg(long, help = "Supplier invoice number")]
    invoice_number: String,
    #[arg(long, value_parser = parse_date, help = "Invoice date, YYYY-MM-DD (defaults to today)")]
    invoice_date: Option<NaiveDate>,
}

#[derive(Args)]
struct SuggestSuppliersArgs {
    #[arg(help = "Raw material identifier")]
    material_id: String,
}

#[derive(Args)]
struct InvoiceArgs {
    #[arg(help = "Purchase order identifier")]
    id: String,
    #[arg(long, help = "Directory to write the PDF to (defaults to invoice_output_dir)")]
    output: Option<PathBuf>,
}

struct CliContext {
    config: ConsoleConfig,
    api: ApiClient,
}

impl CliContext {
    fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load console config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let api = ApiClient::from_config(&config).context("failed to build API client")?;
        Ok(Self { config, api })
    }

    fn money(&self, value: rust_decimal::Decimal) -> String {
        pricing::format_currency(&self.config.currency_symbol, value)
    }
}

async fn handle_customers_command(
    context: &CliContext,
    command: CustomersCommands,
    json: bool,
    confirm: &dyn Confirm,
) -> Result<()> {
    let api: &dyn InventoryApi = &context.api;
    let mut page = CustomerPage::new();
    match command {
        CustomersCommands::List(args) => {
            page.refresh(api).await.context("failed to fetch customers")?;
            if let Some(search) = args.search {
                page.set_query(search);
            }
            page.set_status_filter(args.status);
            page.set_view(args.view);

            let visible = page.visible();
            if json {
                print_json(&visible)?;
            } else if visible.is_empty() {
                println!("No customers matched the provided filters.");
            } else {
                let stats = page.stats();
                println!(
                    "Customers ({} shown • {} total • {} active • {} inactive)",
                    visible.len(),
                    stats.total,
                    stats.active,
                    stats.inactive
                );
                for customer in visible {
                    match page.view() {
                        ViewMode::List => render_customer(customer),
                        ViewMode::Grid => render_customer_card(customer),
                    }
                }
            }
            Ok(())
        }
        CustomersCommands::Show(args) => {
            if let Err(err) = page.refresh(api).await {
                warn!(error = %err, "customer list unavailable; details have no fallback");
            }
            let details = page
                .details(api, &args.id)
                .await
                .with_context(|| format!("failed to fetch customer {}", args.id))?;
            if json {
                print_json(&details.customer)?;
                return Ok(());
            }
            if details.stale {
                eprintln!("Showing the last loaded copy; the live record could not be fetched.");
            }
            render_customer_card(&details.customer);
            if let Some(gst) = &details.customer.business_info.gst_number {
                println!("  GSTIN {}", gst);
            }
            if let Some(pan) = &details.customer.business_info.pan_number {
                println!("  PAN {}", pan);
            }
            match &details.billing_address {
                Some(address) => println!("  Billing: {}", address.lines().join(", ")),
                None => println!("  Billing: same as shipping"),
            }
            println!("  Contacts:");
            for contact in &details.contacts {
                let primary = if contact.is_primary { " [primary]" } else { "" };
                println!(
                    "    • {}{} | {} | {} | {}",
                    contact.name,
                    primary,
                    contact.designation.as_deref().unwrap_or("-"),
                    contact.phone.as_deref().unwrap_or("-"),
                    contact.email.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }
        CustomersCommands::Create(args) => {
            let mut form = CustomerForm::new();
            apply_customer_fields(&mut form, args);
            let created = page
                .create(api, &form)
                .await
                .context("failed to create customer")?;
            if json {
                print_json(&json!({ "created": true, "customer": created }))?;
            } else {
                match created {
                    Some(customer) => println!("Created customer {} ({})", customer.company_name, customer.id),
                    None => println!("Created customer {}", form.company_name.trim()),
                }
            }
            Ok(())
        }
        CustomersCommands::Update(args) => {
            let existing = api
                .get_customer(&args.id)
                .await
                .with_context(|| format!("failed to fetch customer {}", args.id))?;
            let mut form = CustomerForm::from_customer(&existing);
            apply_customer_fields(&mut form, args.fields);
            page.update(api, &args.id, &form)
                .await
                .with_context(|| format!("failed to update customer {}", args.id))?;
            if json {
                print_json(&json!({ "updated": true, "id": args.id }))?;
            } else {
                println!("Updated customer {}", args.id);
            }
            Ok(())
        }
        CustomersCommands::Delete(args) => {
            page.refresh(api).await.context("failed to fetch customers")?;
            let deleted = page
                .delete(api, &args.id, confirm)
                .await
                .with_context(|| format!("failed to delete customer {}", args.id))?;
            report_outcome(json, "deleted", deleted, &format!("customer {}", args.id))
        }
    }
}

async fn handle_orders_command(
    context: &CliContext,
    command: OrdersCommands,
    json: bool,
    confirm: &dyn Confirm,
) -> Result<()> {
    let api: &dyn InventoryApi = &context.api;
    let mut page = PurchaseOrderPage::new();

    let needs_list = !matches!(
        command,
        OrdersCommands::Create(_) | OrdersCommands::SuggestSuppliers(_)
    );
    if needs_list {
        page.refresh(api)
            .await
            .context("failed to fetch purchase orders")?;
    }

    match command {
        OrdersCommands::Create(args) => {
            let draft = build_draft(PurchaseOrderDraft::today(), args);
            let created = page
                .create(api, &draft)
                .await
                .context("failed to create purchase order")?;
            if json {
                print_json(&json!({ "created": true, "order": created }))?;
            } else {
                match created {
                    Some(order) => println!(
                        "Created purchase order {} ({}) • total {}",
                        order.po_number,
                        order.id,
                        context.money(order.grand_total())
                    ),
                    None => println!(
                        "Created purchase order • total {}",
                        context.money(draft.grand_total())
                    ),
                }
            }
            Ok(())
        }
        OrdersCommands::SuggestSuppliers(args) => {
            let suggestions = page
                .suggested_suppliers(api, &args.material_id)
                .await
                .with_context(|| {
                    format!("failed to fetch suppliers for material {}", args.material_id)
                })?;
            if json {
                print_json(&suggestions)?;
            } else if suggestions.is_empty() {
                println!("No supplier history for material {}", args.material_id);
            } else {
                for suggestion in &suggestions {
                    println!(
                        "- {} ({}) • last rate {} • last ordered {} • {} order(s)",
                        suggestion.supplier.name,
                        suggestion.supplier.id,
                        suggestion
                            .last_price_per_kg
                            .map(|r| context.money(pricing::to_money(r)))
                            .unwrap_or_else(|| "-".to_string()),
                        display_date(suggestion.last_order_date.as_ref()),
                        suggestion.order_count.unwrap_or_default()
                    );
                }
            }
            Ok(())
        }
        OrdersCommands::List(args) => {
            if let Some(search) = args.search {
                page.set_query(search);
            }
            page.set_status_filter(args.status);
            let visible = page.visible();
            if json {
                print_json(&visible)?;
            } else if visible.is_empty() {
                println!("No purchase orders matched the provided filters.");
            } else {
                let counts: Vec<String> = page
                    .status_counts()
                    .into_iter()
                    .map(|(status, count)| format!("{} {}", count, status))
                    .collect();
                println!("Purchase orders ({})", counts.join(" • "));
                for order in visible {
                    render_order(context, &page, order);
                }
            }
            Ok(())
        }
        OrdersCommands::Show(args) => {
            let order = page
                .find(&args.id)
                .map(|o| page.resolved(o))
                .ok_or_else(|| anyhow!("purchase order {} not found", args.id))?;
            if json {
                print_json(&order)?;
            } else {
                render_order_details(context, &order);
            }
            Ok(())
        }
        OrdersCommands::Update(args) => {
            let existing = page
                .find(&args.id)
                .ok_or_else(|| anyhow!("purchase order {} not found", args.id))?;
            let draft = build_draft(PurchaseOrderDraft::from_order(existing), args.fields);
            page.update(api, &args.id, &draft)
                .await
                .with_context(|| format!("failed to update purchase order {}", args.id))?;
            report_outcome(json, "updated", true, &format!("purchase order {}", args.id))
        }
        OrdersCommands::Place(args) => {
            page.place_order(api, &args.id)
                .await
                .with_context(|| format!("failed to place purchase order {}", args.id))?;
            report_outcome(json, "placed", true, &format!("purchase order {}", args.id))
        }
        OrdersCommands::Receive(args) => {
            let form = match args.invoice_date {
                Some(date) => ReceiveForm::dated(args.invoice_number, date),
                None => ReceiveForm::new(args.invoice_number),
            };
            page.receive(api, &args.id, &form)
                .await
                .with_context(|| format!("failed to receive purchase order {}", args.id))?;
            report_outcome(json, "received", true, &format!("purchase order {}", args.id))
        }
        OrdersCommands::Cancel(args) => {
            let cancelled = page
                .cancel(api, &args.id, confirm)
                .await
                .with_context(|| format!("failed to cancel purchase order {}", args.id))?;
            report_outcome(json, "cancelled", cancelled, &format!("purchase order {}", args.id))
        }
        OrdersCommands::Delete(args) => {
            let deleted = page
                .delete(api, &args.id, confirm)
                .await
                .with_context(|| format!("failed to delete purchase order {}", args.id))?;
            report_outcome(json, "deleted", deleted, &format!("purchase order {}", args.id))
        }
        OrdersCommands::Invoice(args) => {
            let rendered = page
                .invoice(&args.id, &context.config.branding, &context.config.currency_symbol)
                .with_context(|| format!("failed to render invoice for {}", args.id))?;
            let dir = args
                .output
                .unwrap_or_else(|| context.config.invoice_output_dir.clone());
            let path = rendered
                .save_in(&dir)
                .with_context(|| format!("failed to write invoice into {}", dir.display()))?;
            if json {
                print_json(&json!({
                    "file": path,
                    "pages": rendered.page_count,
                    "bytes": rendered.bytes.len(),
                }))?;
            } else {
                println!(
                    "Invoice written to {} ({} page(s))",
                    path.display(),
                    rendered.page_count
                );
            }
            Ok(())
        }
    }
}

async fn handle_materials_command(
    context: &CliContext,
    command: ListOnlyCommands,
    json: bool,
) -> Result<()> {
    match command {
        ListOnlyCommands::List => {
            let materials = context
                .api
                .list_raw_materials()
                .await
                .context("failed to fetch raw materials")?;
            if json {
                print_json(&materials)?;
            } else {
                for material in &materials {
                    println!(
                        "- {} • {} • {} • unit {}",
                        material.id,
                        material.label(),
                        material.category.as_deref().unwrap_or("-"),
                        material.unit.as_deref().unwrap_or("-")
                    );
                }
            }
            Ok(())
        }
    }
}

async fn handle_suppliers_command(
    context: &CliContext,
    command: ListOnlyCommands,
    json: bool,
) -> Result<()> {
    match command {
        ListOnlyCommands::List => {
            let suppliers = context
                .api
                .list_suppliers()
                .await
                .context("failed to fetch suppliers")?;
            if json {
                print_json(&suppliers)?;
            } else {
                for supplier in &suppliers {
                    println!(
                        "- {} • {} • {} • {}",
                        supplier.id,
                        supplier.name,
                        supplier.contact_person.as_deref().unwrap_or("-"),
                        supplier.phone.as_deref().unwrap_or("-")
                    );
                }
            }
            Ok(())
        }
    }
}

fn apply_customer_fields(form: &mut CustomerForm, args: CustomerFieldArgs) {
    let set = |target: &mut String, value: Option<String>| {
        if let Some(value) = value {
            *target = value;
        }
    };
    set(&mut form.company_name, args.company);
    set(&mut form.status, args.status);
    set(&mut form.address.street, args.street);
    set(&mut form.address.city, args.city);
    set(&mut form.address.state, args.state);
    set(&mut form.address.pincode, args.pincode);
    set(&mut form.address.country, args.country);
    set(&mut form.gst_number, args.gst_number);
    set(&mut form.pan_number, args.pan_number);
    set(&mut form.billing_address.street, args.billing_street);
    set(&mut form.billing_address.city, args.billing_city);
    set(&mut form.billing_address.state, args.billing_state);
    set(&mut form.billing_address.pincode, args.billing_pincode);
    if args.billing_same {
        form.set_same_as_shipping(true);
    }
    if !args.contacts.is_empty() {
        let explicit_primary = args.contacts.iter().position(|c| c.is_primary);
        form.contacts = args.contacts;
        form.set_primary(explicit_primary.unwrap_or(0));
    }
}

fn build_draft(mut draft: PurchaseOrderDraft, args: OrderFieldArgs) -> PurchaseOrderDraft {
    if let Some(supplier) = args.supplier {
        draft.supplier_id = supplier;
    }
    if let Some(date) = args.order_date {
        draft.order_date = date;
    }
    if args.expected.is_some() {
        draft.expected_delivery_date = args.expected;
    }
    if let Some(notes) = args.notes {
        draft.notes = notes;
    }
    if !args.items.is_empty() {
        draft.replace_items(args.items);
    }
    draft
}

fn report_outcome(json: bool, action: &str, done: bool, subject: &str) -> Result<()> {
    if json {
        print_json(&json!({ action: done }))?;
    } else if done {
        println!("{} {}", capitalize(action), subject);
    } else {
        println!("Left {} unchanged", subject);
    }
    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Blocking y/N prompt on stderr.
fn prompt_confirm(prompt: &str) -> bool {
    eprint!("{} [y/N] ", prompt);
    let _ = io::stderr().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_customer(customer: &Customer) {
    let location = customer.address.location();
    println!(
        "- Customer {} • {} • {} • status {}",
        customer.id,
        customer.company_name,
        if location.is_empty() { "-" } else { location.as_str() },
        if customer.status.is_empty() { "-" } else { customer.status.as_str() }
    );
}

fn render_customer_card(customer: &Customer) {
    println!("┌ {} [{}]", customer.company_name, customer.status);
    for line in customer.address.lines() {
        println!("│ {}", line);
    }
    if let Some(contact) = customer.primary_contact() {
        println!(
            "│ {} {}",
            contact.name,
            contact.phone.as_deref().or(contact.email.as_deref()).unwrap_or("")
        );
    }
    println!("└ id {}", customer.id);
}

fn render_order(context: &CliContext, page: &PurchaseOrderPage, order: &PurchaseOrder) {
    let actions: Vec<&str> = available_actions(order.status())
        .iter()
        .map(|a| a.as_ref())
        .collect();
    println!(
        "- {} • {} • {} • {} • total {} • [{}]",
        if order.po_number.is_empty() { &order.id } else { &order.po_number },
        page.supplier_name(order),
        display_date(order.order_date.as_ref()),
        if order.status.is_empty() { "-" } else { order.status.as_str() },
        context.money(order.grand_total()),
        actions.join(", ")
    );
}

fn render_order_details(context: &CliContext, order: &PurchaseOrder) {
    println!("Purchase order {} ({})", order.po_number, order.id);
    println!("  Supplier: {}", order.supplier_name());
    println!("  Status: {}", order.status);
    println!("  Order date: {}", display_date(order.order_date.as_ref()));
    println!(
        "  Expected delivery: {}",
        display_date(order.expected_delivery_date.as_ref())
    );
    if order.has_invoice() {
        println!(
            "  Invoice: {} dated {}",
            order.invoice_number.as_deref().unwrap_or_default(),
            display_date(order.invoice_date.as_ref())
        );
    }
    println!("  Items:");
    for item in &order.items {
        println!(
            "    • {} • {} kg @ {} = {}",
            item.material_name(),
            item.quantity.weight.unwrap_or_default(),
            context.money(pricing::to_money(item.pricing.price_per_kg.unwrap_or_default())),
            context.money(item.line_total())
        );
        let storage = item.storage.summary();
        if !storage.is_empty() {
            println!("      storage: {}", storage);
        }
    }
    println!("  Grand total: {}", context.money(order.grand_total()));
    if let Some(notes) = order.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        println!("  Notes: {}", notes);
    }
    let actions: Vec<&str> = available_actions(order.status())
        .iter()
        .map(|a| a.as_ref())
        .collect();
    println!("  Actions: {}", actions.join(", "));
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", raw))
}

fn parse_key_values(raw: &str) -> Result<Vec<(String, String)>, String> {
    raw.split(',')
        .map(|part| {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| format!("invalid segment '{part}', expected key=value"))?;
            let key = key.trim().to_lowercase();
            if key.is_empty() {
                return Err("option key cannot be empty".to_string());
            }
            Ok((key, value.trim().to_string()))
        })
        .collect()
}

fn parse_order_item(raw: &str) -> Result<LineItemDraft, String> {
    let mut item = LineItemDraft::new();
    for (key, value) in parse_key_values(raw)? {
        let field = match key.as_str() {
            "material" | "material_id" => LineItemField::Material,
            "rate" | "price" => LineItemField::PricePerKg,
            "rate_km" => LineItemField::PricePerKm,
            "details" => LineItemField::LocationDetails,
            "containers" => LineItemField::ContainerCount,
            other => LineItemField::from_str(other)
                .map_err(|_| format!("unknown item field '{other}'"))?,
        };
        item.set(field, &value);
    }
    if item.material_id.is_empty() {
        return Err("item needs material=<id>".to_string());
    }
    Ok(item)
}

fn parse_contact(raw: &str) -> Result<ContactForm, String> {
    let mut contact = ContactForm::default();
    for (key, value) in parse_key_values(raw)? {
        match key.as_str() {
            "name" => contact.name = value,
            "designation" => contact.designation = value,
            "phone" => contact.phone = value,
            "email" => contact.email = value,
            "primary" => {
                contact.is_primary = value
                    .parse()
                    .map_err(|_| format!("invalid primary flag '{value}', expected true/false"))?
            }
            other => return Err(format!("unknown contact field '{other}'")),
        }
    }
    Ok(contact)
}
