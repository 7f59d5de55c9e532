//! # Subcommand Handlers
//!
//! One handler per subcommand. Each mutating handler goes through
//! [`Session::apply`], prints the result and then any save warning.
//!
//! ## Product References
//! Products are addressed by id. A unique prefix is enough, which is why
//! `till list` shows the first eight characters.

use crate::cli::{Command, EditArgs, ProductArgs};
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::prompt::terminal_confirm;
use crate::report::TextReportGenerator;
use crate::session::Session;
use till_core::{Confirm, Money, Product, ProductId, ProductInput, Prompt, Register};
use till_db::DbError;

const SHORT_ID: usize = 8;

/// Settings shared by every handler.
pub struct Context {
    pub config: AppConfig,
    pub assume_yes: bool,
}

impl Context {
    fn money(&self, amount: Money) -> String {
        self.config.currency.format(amount)
    }
}

pub async fn run(command: Command, session: &mut Session, ctx: &Context) -> CliResult<()> {
    match command {
        Command::Add(args) => add(args, session, ctx).await,
        Command::Edit(args) => edit(args, session, ctx).await,
        Command::Delete { id } => delete(&id, session, ctx).await,
        Command::List { term } => {
            list(session.register(), term.as_deref().unwrap_or(""), ctx);
            Ok(())
        }
        Command::Stage { id } => stage(&id, session, ctx).await,
        Command::Unstage { position } => unstage(position, session, ctx).await,
        Command::Cart => {
            show_cart(session.register(), ctx);
            Ok(())
        }
        Command::Finalize => finalize(session, ctx).await,
        Command::Close => close(session, ctx).await,
        Command::Cash => {
            show_cash(session.register(), ctx);
            Ok(())
        }
        Command::ImportLegacy { file, replace } => import_legacy(&file, replace, session).await,
    }
}

// =============================================================================
// Catalog
// =============================================================================

async fn add(args: ProductArgs, session: &mut Session, ctx: &Context) -> CliResult<()> {
    let input = ProductInput {
        name: args.name,
        quantity: args.quantity,
        cost: Money::parse_major(&args.cost)?,
        price: Money::parse_major(&args.price)?,
    };

    let applied = session
        .apply(|r| r.add_product(&input).cloned())
        .await?;
    println!("Produto cadastrado:");
    print_product(&applied.value, ctx);
    warn_unsaved(applied.save_warning);
    Ok(())
}

async fn edit(args: EditArgs, session: &mut Session, ctx: &Context) -> CliResult<()> {
    let id = resolve_product(session.register(), &args.id)?;
    let mut input = session
        .register()
        .product(&id)
        .map(Product::to_input)
        .ok_or_else(|| CliError::UnknownProduct(args.id.clone()))?;

    if let Some(name) = args.name {
        input.name = name;
    }
    if let Some(quantity) = args.quantity {
        input.quantity = quantity;
    }
    if let Some(cost) = args.cost {
        input.cost = Money::parse_major(&cost)?;
    }
    if let Some(price) = args.price {
        input.price = Money::parse_major(&price)?;
    }

    let applied = session
        .apply(|r| r.edit_product(&id, &input).cloned())
        .await?;
    println!("Produto atualizado:");
    print_product(&applied.value, ctx);
    if session.register().cart().reserved_units(&id) > 0 {
        println!("Itens já no carrinho mantêm o preço anterior.");
    }
    warn_unsaved(applied.save_warning);
    Ok(())
}

async fn delete(reference: &str, session: &mut Session, ctx: &Context) -> CliResult<()> {
    let id = resolve_product(session.register(), reference)?;
    let name = session
        .register()
        .product(&id)
        .map(|p| p.name().to_string())
        .ok_or_else(|| CliError::UnknownProduct(reference.to_string()))?;

    let mut confirm = terminal_confirm(ctx.assume_yes);
    if !confirm.confirm(&Prompt::DeleteProduct { name }) {
        println!("Cancelado.");
        return Ok(());
    }

    let applied = session.apply(|r| r.delete_product(&id)).await?;
    println!("Produto excluído: {}", applied.value.name());
    let orphaned = session.register().cart().reserved_units(&id);
    if orphaned > 0 {
        println!(
            "{orphaned} item(ns) no carrinho continuam com o preço registrado e não voltam ao estoque."
        );
    }
    warn_unsaved(applied.save_warning);
    Ok(())
}

fn list(register: &Register, term: &str, ctx: &Context) {
    let mut matches = register.search_products(term).peekable();
    if matches.peek().is_none() {
        if term.trim().is_empty() {
            println!("Nenhum produto cadastrado.");
        } else {
            println!("Nenhum produto encontrado para \"{term}\".");
        }
        return;
    }

    println!(
        "{:<8}  {:<28} {:>5} {:>12} {:>12} {:>12} {:>14}",
        "ID", "Produto", "Qtd", "Custo", "Venda", "Lucro Unit.", "Total Venda"
    );
    for product in matches {
        let marker = if product.is_active() { "" } else { " (sem estoque)" };
        println!(
            "{:<8}  {:<28} {:>5} {:>12} {:>12} {:>12} {:>14}{marker}",
            short_id(product.id()),
            product.name(),
            product.quantity(),
            ctx.money(product.cost()),
            ctx.money(product.price()),
            ctx.money(product.unit_profit()),
            ctx.money(product.stock_value()),
        );
    }
}

// =============================================================================
// Cart & Sale
// =============================================================================

async fn stage(reference: &str, session: &mut Session, ctx: &Context) -> CliResult<()> {
    let id = resolve_product(session.register(), reference)?;
    let applied = session
        .apply(|r| r.stage_for_sale(&id).cloned())
        .await?;

    let item = applied.value;
    let remaining = session
        .register()
        .product(&id)
        .map(Product::quantity)
        .unwrap_or(0);
    println!(
        "No carrinho: {} {} (restam {remaining})",
        item.name(),
        ctx.money(item.price())
    );
    println!("Total do carrinho: {}", ctx.money(session.register().cart().total()));
    warn_unsaved(applied.save_warning);
    Ok(())
}

async fn unstage(position: u64, session: &mut Session, ctx: &Context) -> CliResult<()> {
    let index = usize::try_from(position.saturating_sub(1)).unwrap_or(usize::MAX);
    let applied = session.apply(|r| r.unstage(index)).await?;

    println!(
        "Removido do carrinho: {} {}",
        applied.value.name(),
        ctx.money(applied.value.price())
    );
    println!("Total do carrinho: {}", ctx.money(session.register().cart().total()));
    warn_unsaved(applied.save_warning);
    Ok(())
}

fn show_cart(register: &Register, ctx: &Context) {
    let cart = register.cart();
    if cart.is_empty() {
        println!("Carrinho vazio.");
        return;
    }

    for (position, item) in cart.items().iter().enumerate() {
        let orphan = if register.product(item.product_id()).is_none() {
            " (produto excluído)"
        } else {
            ""
        };
        println!(
            "{:>3}. {:<28} {:>12}{orphan}",
            position + 1,
            item.name(),
            ctx.money(item.price())
        );
    }
    println!("Total: {}", ctx.money(cart.total()));
}

async fn finalize(session: &mut Session, ctx: &Context) -> CliResult<()> {
    let mut confirm = terminal_confirm(ctx.assume_yes);
    let applied = session.apply(|r| r.finalize_sale(&mut confirm)).await?;

    match applied.value {
        Some(receipt) => {
            println!(
                "Venda realizada: {} item(ns), {}",
                receipt.items.len(),
                ctx.money(receipt.total)
            );
            println!(
                "Caixa do dia: {}",
                ctx.money(session.register().cash_snapshot().current_cash)
            );
        }
        None => println!("Venda cancelada."),
    }
    warn_unsaved(applied.save_warning);
    Ok(())
}

async fn close(session: &mut Session, ctx: &Context) -> CliResult<()> {
    let mut confirm = terminal_confirm(ctx.assume_yes);
    let mut generator = TextReportGenerator::new(
        ctx.config.reports_dir(),
        ctx.config.store_name.clone(),
        ctx.config.currency.clone(),
    );

    let applied = session
        .apply(|r| r.close_and_render(&mut confirm, &mut generator))
        .await?;

    match applied.value {
        Some(outcome) => {
            println!("Fechamento concluído! Caixa zerado para amanhã.");
            println!("Total do dia: {}", ctx.money(outcome.report.current_cash));
            match (outcome.rendered, generator.written()) {
                (Ok(()), Some(path)) => println!("Relatório: {}", path.display()),
                (Ok(()), None) => {}
                (Err(e), _) => eprintln!("aviso: o relatório não pôde ser gerado: {e}"),
            }
        }
        None => println!("Fechamento cancelado."),
    }
    warn_unsaved(applied.save_warning);
    Ok(())
}

fn show_cash(register: &Register, ctx: &Context) {
    let cash = register.cash_snapshot();
    println!("Caixa do dia:      {}", ctx.money(cash.current_cash));
    println!("No carrinho:       {}", ctx.money(cash.cart_total));
    println!("Estoque (venda):   {}", ctx.money(cash.stock_valuation));
    println!("Caixa anterior:    {}", ctx.money(cash.prior_cash));
    println!("Estoque anterior:  {}", ctx.money(cash.prior_stock_valuation));
    println!("Vendas no período: {}", register.ledger().len());
}

// =============================================================================
// Import
// =============================================================================

async fn import_legacy(
    file: &std::path::Path,
    replace: bool,
    session: &mut Session,
) -> CliResult<()> {
    let text = std::fs::read_to_string(file)?;
    let register = till_db::legacy::import_register(&text)?;

    if !session.is_blank() && !replace {
        return Err(CliError::ImportWouldOverwrite);
    }

    let summary = format!(
        "{} produto(s), {} item(ns) no carrinho, {} venda(s)",
        register.catalog().len(),
        register.cart().len(),
        register.ledger().len()
    );
    let warning = session.replace(register).await;
    println!("Importado: {summary}");
    warn_unsaved(warning);
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Finds a product by full id or unique id prefix.
fn resolve_product(register: &Register, reference: &str) -> CliResult<ProductId> {
    let reference = reference.trim();
    let exact = ProductId::from(reference);
    if register.product(&exact).is_some() {
        return Ok(exact);
    }

    let candidates: Vec<&Product> = register
        .catalog()
        .products()
        .iter()
        .filter(|p| !reference.is_empty() && p.id().as_str().starts_with(reference))
        .collect();

    match candidates.as_slice() {
        [only] => Ok(only.id().clone()),
        [] => Err(CliError::UnknownProduct(reference.to_string())),
        many => Err(CliError::AmbiguousProduct {
            prefix: reference.to_string(),
            count: many.len(),
        }),
    }
}

fn short_id(id: &ProductId) -> &str {
    let s = id.as_str();
    s.char_indices().nth(SHORT_ID).map_or(s, |(end, _)| &s[..end])
}

fn print_product(product: &Product, ctx: &Context) {
    println!("  id:      {}", product.id());
    println!("  nome:    {}", product.name());
    println!("  qtd:     {}", product.quantity());
    println!("  custo:   {}", ctx.money(product.cost()));
    println!("  venda:   {}", ctx.money(product.price()));
}

fn warn_unsaved(warning: Option<DbError>) {
    if let Some(e) = warning {
        eprintln!("aviso: estado não foi salvo, será salvo na próxima operação: {e}");
    }
}
