//! Cart inspection and mutation commands.

use fashion_store_cart::{AddOutcome, CartStorage, CartStore, Decrease, Notifier};
use fashion_store_core::{CartItem, Price, ProductSnapshot, VariantKey};
use rust_decimal::Decimal;
use tracing::{info, warn};

/// Product details given on the command line for `add`.
pub struct NewLine {
    pub key: VariantKey,
    pub title: String,
    pub price: Decimal,
    pub quantity: u32,
    pub media: Vec<String>,
}

impl NewLine {
    fn into_item(self) -> CartItem {
        let mut product = ProductSnapshot::new(self.key.product_id, self.title, Price::new(self.price));
        product.media = self.media;
        if let Some(color) = &self.key.color {
            product.colors.push(color.clone());
        }
        if let Some(size) = &self.key.size {
            product.sizes.push(size.clone());
        }
        CartItem {
            product,
            quantity: self.quantity,
            color: self.key.color,
            size: self.key.size,
        }
    }
}

/// Log every line and the cart totals.
pub fn list<S: CartStorage, N: Notifier>(cart: &CartStore<S, N>) {
    if cart.is_empty() {
        info!("Your cart is empty");
        return;
    }

    for line in cart.items() {
        info!(
            "{} x{} {}{}{} = {}",
            line.product.title,
            line.quantity,
            line.product.id,
            line.color.as_deref().map(|c| format!(" / {c}")).unwrap_or_default(),
            line.size.as_deref().map(|s| format!(" / {s}")).unwrap_or_default(),
            line.line_total()
        );
    }

    let summary = cart.summary();
    info!(
        "{} item(s) in {} line(s), subtotal {}",
        summary.item_count, summary.line_count, summary.subtotal
    );
}

/// Add a line, merging into an existing variant.
pub fn add<S: CartStorage, N: Notifier>(cart: &mut CartStore<S, N>, line: NewLine) {
    match cart.add_item(line.into_item()) {
        AddOutcome::Inserted => info!("Added new line"),
        AddOutcome::Merged { quantity } => info!("Line now has quantity {quantity}"),
        AddOutcome::Rejected(e) => warn!("Nothing added: {e}"),
    }
}

/// Remove a line.
pub fn remove<S: CartStorage, N: Notifier>(cart: &mut CartStore<S, N>, key: &VariantKey) {
    if !cart.remove_item(key) {
        info!("No line for {key}");
    }
}

/// Add one unit to a line.
pub fn increase<S: CartStorage, N: Notifier>(cart: &mut CartStore<S, N>, key: &VariantKey) {
    match cart.increase_quantity(key) {
        Some(quantity) => info!("{key}: quantity {quantity}"),
        None => info!("No line for {key}"),
    }
}

/// Remove one unit from a line.
pub fn decrease<S: CartStorage, N: Notifier>(cart: &mut CartStore<S, N>, key: &VariantKey) {
    match cart.decrease_quantity(key) {
        Decrease::Decreased(quantity) => info!("{key}: quantity {quantity}"),
        Decrease::Removed => info!("{key}: removed from cart"),
        Decrease::NotFound => info!("No line for {key}"),
    }
}
