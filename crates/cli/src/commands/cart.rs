//! Cart commands: show, add, remove, clear.
//!
//! Every command is guarded on an authenticated session and runs one
//! compound synchronizer operation, then renders the committed
//! quantities/bill pair. Errors arrive as synchronizer state, never as raw
//! transport errors.

use greengrocer_client::cart::{CartSync, SyncError, SyncState};
use greengrocer_client::session::Session;
use greengrocer_core::CatalogItem;

const NOT_SIGNED_IN: &str = "Not signed in. Run `grocer login <username>` first.";
const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Show current quantities and the bill.
///
/// # Errors
///
/// Returns an error when not signed in or when the refresh fails.
pub async fn show(session: &Session) -> CommandResult {
    let mut cart = guarded_sync(session)?;
    let result = cart.refresh().await;
    settle(session, &cart, result)
}

/// Add one unit of an item.
///
/// # Errors
///
/// Returns an error for unknown item names, when not signed in, or when
/// the addition fails.
pub async fn add(session: &Session, item: &str) -> CommandResult {
    let item: CatalogItem = item.parse()?;
    let mut cart = guarded_sync(session)?;
    let result = cart.add_item(item).await;
    settle(session, &cart, result)
}

/// Remove one unit of an item.
///
/// # Errors
///
/// Returns an error for unknown item names, when not signed in, or when
/// the removal fails.
pub async fn remove(session: &Session, item: &str) -> CommandResult {
    let item: CatalogItem = item.parse()?;
    let mut cart = guarded_sync(session)?;

    // Load current quantities first so removing at zero can be refused the
    // way a view disables its minus button. The server would tolerate the
    // request; this is a UX guard, not a correctness requirement.
    let refreshed = cart.refresh().await;
    settle(session, &cart, refreshed)?;

    if cart.quantities().get(item) == 0 {
        #[allow(clippy::print_stdout)]
        {
            println!("No {item} in the cart");
        }
        return Ok(());
    }

    let result = cart.remove_one(item).await;
    settle(session, &cart, result)
}

/// Remove everything from the cart.
///
/// # Errors
///
/// Returns an error when not signed in or when the clear fails.
pub async fn clear(session: &Session) -> CommandResult {
    let mut cart = guarded_sync(session)?;
    let result = cart.clear().await;
    settle(session, &cart, result)
}

/// Route guard: cart commands require an authenticated session.
fn guarded_sync(session: &Session) -> Result<CartSync, Box<dyn std::error::Error>> {
    if !session.is_authenticated() {
        return Err(NOT_SIGNED_IN.into());
    }
    Ok(CartSync::new(session.api()))
}

/// Map an operation result to command output: render on success, translate
/// the synchronizer's state into a user-facing message on failure.
fn settle(session: &Session, cart: &CartSync, result: Result<(), SyncError>) -> CommandResult {
    match result {
        Ok(()) => {
            render(session, cart);
            Ok(())
        }
        Err(SyncError::SessionExpired) => Err(SESSION_EXPIRED.into()),
        Err(SyncError::Request(_)) => match cart.state() {
            SyncState::Error(message) => Err(message.clone().into()),
            // Unreachable: a failed operation always settles in Error state
            _ => Err("Something went wrong. Please try again.".into()),
        },
    }
}

#[allow(clippy::print_stdout)]
fn render(session: &Session, cart: &CartSync) {
    if let Some(identity) = session.current_identity() {
        println!("Signed in as {}", identity.subject);
    }
    println!();

    let quantities = cart.quantities();
    for (item, count) in quantities.iter() {
        println!("  {:<8} {count}", item.name());
    }

    let Some(bill) = cart.bill() else {
        println!();
        println!("Cart is empty.");
        return;
    };

    let currency = bill.currency_code();
    println!();
    println!(
        "  {:<8} {:>4} {:>11} {:>8} {:>11}",
        "Item", "Qty", "Chargeable", "Unit", "Line Total"
    );
    for line in &bill.lines {
        println!(
            "  {:<8} {:>4} {:>11} {:>8} {:>11}",
            line.item,
            line.qty,
            line.chargeable_qty,
            line.unit_price(currency).to_string(),
            line.line_total(currency).to_string(),
        );
    }
    // The server pre-formats the grand total; display it verbatim
    println!("  Total: {}", bill.total_formatted);
}
