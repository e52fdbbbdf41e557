//! The cart store.
//!
//! `CartStore` owns the ordered list of cart lines and is the only thing that
//! mutates it. Every public operation is total: bad input, missing lines and
//! storage failures are handled inside the store and reported through the
//! returned outcome, the [`Notifier`] and the log. Nothing is propagated to
//! the caller as an error.
//!
//! # Invariants
//!
//! - Every line has `quantity >= 1`
//! - No two lines share a [`VariantKey`]
//! - Every product snapshot passes [`ProductSnapshot::validate`]
//!
//! # Persistence
//!
//! After each mutation the full list is written under [`STORAGE_KEY`]. The
//! write happens after memory is updated and its failure is only logged, so
//! reads always reflect the last mutation even when storage is unavailable.
//! Two stores sharing one backend are last-writer-wins.
//!
//! [`ProductSnapshot::validate`]: fashion_store_core::ProductSnapshot::validate

use std::collections::HashSet;

use fashion_store_core::{CartItem, CartItemError, CartSummary, VariantKey};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::notify::{Notification, Notifier, TracingNotifier};
use crate::persist::{self, STORAGE_KEY, STORAGE_VERSION};
use crate::storage::CartStorage;

/// Result of [`CartStore::add_item`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended.
    Inserted,
    /// An existing line absorbed the candidate; carries the new quantity.
    Merged {
        /// Quantity after merging.
        quantity: u32,
    },
    /// The candidate failed validation; the cart is unchanged.
    Rejected(CartItemError),
}

/// Result of [`CartStore::decrease_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrease {
    /// The line now has this quantity.
    Decreased(u32),
    /// The line was at one and has been removed.
    Removed,
    /// No line has that variant key.
    NotFound,
}

/// What [`CartStore::replace_all`] kept and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceReport {
    /// Lines now in the cart.
    pub kept: usize,
    /// Candidates that failed validation.
    pub invalid: usize,
    /// Candidates whose variant key was already taken by an earlier one.
    pub duplicates: usize,
}

impl ReplaceReport {
    /// Total number of candidates that didn't make it into the cart.
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.invalid + self.duplicates
    }
}

/// Persisted, validated shopping cart.
///
/// Construct one per client session with [`CartStore::open`] and pass it to
/// whatever needs it.
#[derive(Debug)]
pub struct CartStore<S, N = TracingNotifier> {
    items: Vec<CartItem>,
    storage: S,
    notifier: N,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the cart persisted in `storage`, logging notifications via `tracing`.
    pub fn open(storage: S) -> Self {
        Self::open_with_notifier(storage, TracingNotifier)
    }
}

impl<S: CartStorage, N: Notifier> CartStore<S, N> {
    /// Open the cart persisted in `storage`.
    ///
    /// A missing, unreadable or malformed document yields an empty cart.
    /// Individual lines that fail validation are dropped. Loading never
    /// writes back to storage.
    pub fn open_with_notifier(storage: S, notifier: N) -> Self {
        let items = load_items(&storage);
        Self {
            items,
            storage,
            notifier,
        }
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Line with the given variant key, if present.
    #[must_use]
    pub fn get(&self, key: &VariantKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Subtotal and counts for display.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_items(&self.items)
    }

    /// The storage backend.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Replace the whole cart with the valid subset of `items`.
    ///
    /// Invalid candidates are dropped. When candidates share a variant key
    /// the first one wins. The new list is built completely before it
    /// replaces the old one.
    #[instrument(skip_all)]
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = CartItem>) -> ReplaceReport {
        let (items, report) = sanitize(items.into_iter().map(Some));
        self.items = items;
        self.persist();
        report
    }

    /// Replace the whole cart from untyped JSON, such as a server-rendered
    /// payload.
    ///
    /// Anything other than an array empties the cart. Array entries that
    /// don't deserialize into a line count as invalid.
    #[instrument(skip_all)]
    pub fn replace_all_json(&mut self, value: &Value) -> ReplaceReport {
        let (items, report) = sanitize_json(value);
        self.items = items;
        self.persist();
        report
    }

    /// Add a line, merging into an existing line with the same variant key.
    ///
    /// A rejected candidate leaves the cart untouched and raises a failure
    /// notification. So does adding to a line already at `u32::MAX`.
    #[instrument(skip_all, fields(product_id = %candidate.product.id, quantity = candidate.quantity))]
    pub fn add_item(&mut self, candidate: CartItem) -> AddOutcome {
        if let Err(err) = candidate.validate() {
            return self.reject(err);
        }

        let key = candidate.key();
        if self.get(&key).is_some_and(|line| line.quantity == u32::MAX) {
            return self.reject(CartItemError::QuantityLimit);
        }

        let outcome = if let Some(existing) = self.items.iter_mut().find(|item| item.matches(&key)) {
            existing.quantity = existing.quantity.saturating_add(candidate.quantity);
            AddOutcome::Merged {
                quantity: existing.quantity,
            }
        } else {
            self.items.push(candidate);
            AddOutcome::Inserted
        };

        self.persist();
        self.notifier
            .notify(Notification::Success("Item added to cart".to_owned()));
        outcome
    }

    /// Remove the line with exactly this variant key.
    ///
    /// Returns `true` if a line was removed. Removing an absent line is a
    /// silent no-op.
    #[instrument(skip_all, fields(key = %key))]
    pub fn remove_item(&mut self, key: &VariantKey) -> bool {
        let Some(index) = self.position(key) else {
            debug!("Remove of absent cart line ignored");
            return false;
        };
        self.items.remove(index);
        self.persist();
        self.notifier
            .notify(Notification::Success("Item removed from cart".to_owned()));
        true
    }

    /// Add one unit to a line. Returns the new quantity, or `None` if no
    /// line has that key.
    #[instrument(skip_all, fields(key = %key))]
    pub fn increase_quantity(&mut self, key: &VariantKey) -> Option<u32> {
        let Some(item) = self.items.iter_mut().find(|item| item.matches(key)) else {
            debug!("Increase of absent cart line ignored");
            return None;
        };
        item.quantity = item.quantity.saturating_add(1);
        let quantity = item.quantity;
        self.persist();
        Some(quantity)
    }

    /// Remove one unit from a line; a line at one unit is removed entirely.
    #[instrument(skip_all, fields(key = %key))]
    pub fn decrease_quantity(&mut self, key: &VariantKey) -> Decrease {
        let Some(index) = self.position(key) else {
            debug!("Decrease of absent cart line ignored");
            return Decrease::NotFound;
        };

        let remaining = self
            .items
            .get(index)
            .map_or(0, |item| item.quantity.saturating_sub(1));
        let outcome = if remaining == 0 {
            self.items.remove(index);
            Decrease::Removed
        } else {
            if let Some(item) = self.items.get_mut(index) {
                item.quantity = remaining;
            }
            Decrease::Decreased(remaining)
        };
        self.persist();
        outcome
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
        self.notifier
            .notify(Notification::Success("Cart cleared".to_owned()));
    }

    fn reject(&self, err: CartItemError) -> AddOutcome {
        warn!(error = %err, "Rejected cart item");
        self.notifier.notify(Notification::Failure(format!(
            "Could not add item to cart: {err}"
        )));
        AddOutcome::Rejected(err)
    }

    fn position(&self, key: &VariantKey) -> Option<usize> {
        self.items.iter().position(|item| item.matches(key))
    }

    /// Write the full list. Failures are logged and swallowed.
    fn persist(&self) {
        let document = match persist::encode(&self.items) {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart; keeping in-memory state");
                return;
            }
        };
        if let Err(e) = self.storage.save(STORAGE_KEY, &document) {
            warn!(error = %e, "Failed to persist cart; keeping in-memory state");
        }
    }
}

fn load_items(storage: &impl CartStorage) -> Vec<CartItem> {
    let raw = match storage.load(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read persisted cart; starting empty");
            return Vec::new();
        }
    };

    let decoded = match persist::decode(&raw) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "Persisted cart is malformed; starting empty");
            return Vec::new();
        }
    };
    if decoded.version > STORAGE_VERSION {
        debug!(
            version = decoded.version,
            "Persisted cart is from a newer client; loading compatible lines"
        );
    }

    let (items, report) = sanitize_json(&decoded.items);
    if report.dropped() > 0 {
        warn!(
            invalid = report.invalid,
            duplicates = report.duplicates,
            "Dropped unusable lines from persisted cart"
        );
    }
    items
}

fn sanitize_json(value: &Value) -> (Vec<CartItem>, ReplaceReport) {
    let Some(entries) = value.as_array() else {
        if !value.is_null() {
            warn!("Cart payload is not a list; using an empty cart");
        }
        return (Vec::new(), ReplaceReport::default());
    };
    sanitize(entries.iter().map(|entry| {
        CartItem::deserialize(entry)
            .map_err(|e| debug!(error = %e, "Cart entry does not deserialize"))
            .ok()
    }))
}

/// Keep valid candidates, first occurrence per variant key, in order.
/// `None` marks a candidate that couldn't even be parsed.
fn sanitize(candidates: impl Iterator<Item = Option<CartItem>>) -> (Vec<CartItem>, ReplaceReport) {
    let mut seen = HashSet::new();
    let mut items = Vec::new();
    let mut report = ReplaceReport::default();

    for candidate in candidates {
        let Some(item) = candidate else {
            report.invalid += 1;
            continue;
        };
        if let Err(e) = item.validate() {
            debug!(error = %e, product_id = %item.product.id, "Dropping invalid cart line");
            report.invalid += 1;
            continue;
        }
        let key = item.key();
        if !seen.insert(key) {
            warn!(key = %item.key(), "Dropping duplicate cart line; keeping first occurrence");
            report.duplicates += 1;
            continue;
        }
        items.push(item);
    }

    report.kept = items.len();
    (items, report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fashion_store_core::{Price, ProductError, ProductSnapshot};
    use serde_json::json;

    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStorage;

    fn shirt(quantity: u32) -> CartItem {
        CartItem::new(ProductSnapshot::new("p1", "Shirt", Price::from_cents(2000)), quantity)
            .with_color("red")
            .with_size("M")
    }

    fn red_m() -> VariantKey {
        VariantKey::from_parts("p1", Some("red"), Some("M"))
    }

    fn store() -> (CartStore<MemoryStorage, RecordingNotifier>, MemoryStorage, RecordingNotifier) {
        let storage = MemoryStorage::new();
        let notifier = RecordingNotifier::new();
        let store = CartStore::open_with_notifier(storage.clone(), notifier.clone());
        (store, storage, notifier)
    }

    fn assert_invariants<S: CartStorage, N: Notifier>(store: &CartStore<S, N>) {
        let mut keys = HashSet::new();
        for item in store.items() {
            assert!(item.quantity >= 1, "zero quantity line: {item:?}");
            assert!(keys.insert(item.key()), "duplicate line: {item:?}");
        }
    }

    #[test]
    fn test_quantity_walkthrough() {
        let (mut cart, _, _) = store();

        assert_eq!(cart.add_item(shirt(1)), AddOutcome::Inserted);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&red_m()).unwrap().quantity, 1);

        assert_eq!(cart.add_item(shirt(2)), AddOutcome::Merged { quantity: 3 });
        assert_eq!(cart.len(), 1);

        assert_eq!(cart.increase_quantity(&red_m()), Some(4));

        assert_eq!(cart.decrease_quantity(&red_m()), Decrease::Decreased(3));
        assert_eq!(cart.decrease_quantity(&red_m()), Decrease::Decreased(2));
        assert_eq!(cart.decrease_quantity(&red_m()), Decrease::Decreased(1));
        assert_eq!(cart.get(&red_m()).unwrap().quantity, 1);

        assert_eq!(cart.decrease_quantity(&red_m()), Decrease::Removed);
        assert!(cart.is_empty());
        assert_invariants(&cart);
    }

    #[test]
    fn test_merge_sums_quantities() {
        let (mut cart, _, _) = store();
        for q in [1, 4, 2, 7] {
            cart.add_item(shirt(q));
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 14);
    }

    #[test]
    fn test_variants_are_separate_lines() {
        let (mut cart, _, _) = store();
        cart.add_item(shirt(1));
        cart.add_item(shirt(1).with_size("L"));
        cart.add_item(CartItem::new(
            ProductSnapshot::new("p1", "Shirt", Price::from_cents(2000)),
            1,
        ));

        assert_eq!(cart.len(), 3);
        assert_invariants(&cart);
    }

    #[test]
    fn test_add_invalid_product_is_rejected() {
        let (mut cart, storage, notifier) = store();
        let candidate = CartItem::new(ProductSnapshot::new("", "Shirt", Price::from_cents(2000)), 1);

        assert_eq!(
            cart.add_item(candidate),
            AddOutcome::Rejected(CartItemError::InvalidProduct(ProductError::EmptyId))
        );
        assert!(cart.is_empty());
        assert_eq!(notifier.failure_count(), 1);
        assert_eq!(storage.get(STORAGE_KEY), None);
    }

    #[test]
    fn test_add_zero_quantity_is_rejected() {
        let (mut cart, _, notifier) = store();
        cart.add_item(shirt(2));

        assert_eq!(
            cart.add_item(shirt(0)),
            AddOutcome::Rejected(CartItemError::ZeroQuantity)
        );
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(notifier.failure_count(), 1);
    }

    #[test]
    fn test_add_notifies_success() {
        let (mut cart, _, notifier) = store();
        cart.add_item(shirt(1));
        assert_eq!(
            notifier.take(),
            vec![Notification::Success("Item added to cart".to_owned())]
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut cart, _, notifier) = store();
        cart.add_item(shirt(1));
        let _ = notifier.take();

        assert!(cart.remove_item(&red_m()));
        assert!(!cart.remove_item(&red_m()));
        assert!(cart.is_empty());
        // Only the effective removal is announced.
        assert_eq!(notifier.take().len(), 1);
    }

    #[test]
    fn test_missing_lines_are_noops() {
        let (mut cart, storage, _) = store();
        let other = VariantKey::new("nope");

        assert_eq!(cart.increase_quantity(&other), None);
        assert_eq!(cart.decrease_quantity(&other), Decrease::NotFound);
        assert!(!cart.remove_item(&other));
        assert_eq!(storage.get(STORAGE_KEY), None);
    }

    #[test]
    fn test_keys_distinguish_absent_from_empty() {
        let (mut cart, _, _) = store();
        cart.add_item(CartItem::new(
            ProductSnapshot::new("p1", "Shirt", Price::from_cents(2000)),
            1,
        ));

        assert_eq!(cart.increase_quantity(&VariantKey::new("p1").with_color("")), None);
        assert_eq!(cart.increase_quantity(&VariantKey::new("p1")), Some(2));
    }

    #[test]
    fn test_increase_saturates() {
        let (mut cart, _, _) = store();
        cart.add_item(shirt(u32::MAX - 1));
        assert_eq!(cart.add_item(shirt(5)), AddOutcome::Merged { quantity: u32::MAX });
        assert_eq!(cart.increase_quantity(&red_m()), Some(u32::MAX));
    }

    #[test]
    fn test_add_to_full_line_is_rejected() {
        let (mut cart, _, notifier) = store();
        cart.add_item(shirt(u32::MAX));
        let _ = notifier.take();

        assert_eq!(
            cart.add_item(shirt(1)),
            AddOutcome::Rejected(CartItemError::QuantityLimit)
        );
        assert_eq!(cart.items()[0].quantity, u32::MAX);
        assert_eq!(notifier.failure_count(), 1);
        assert!(
            !notifier
                .notifications()
                .contains(&Notification::Success("Item added to cart".to_owned()))
        );
    }

    #[test]
    fn test_high_precision_price_is_rejected_not_rounded() {
        let (mut cart, storage, notifier) = store();
        let price = Price::new("19.123456789012345678".parse().unwrap());
        let candidate = CartItem::new(ProductSnapshot::new("p1", "Shirt", price), 1);

        assert!(matches!(
            cart.add_item(candidate),
            AddOutcome::Rejected(CartItemError::InvalidProduct(ProductError::ImprecisePrice { .. }))
        ));
        assert_eq!(notifier.failure_count(), 1);

        cart.add_item(CartItem::new(
            ProductSnapshot::new("p2", "Socks", Price::new("4.99".parse().unwrap())),
            1,
        ));
        let reopened = CartStore::open(storage);
        assert_eq!(reopened.items(), cart.items());
    }

    #[test]
    fn test_clear() {
        let (mut cart, storage, notifier) = store();
        cart.add_item(shirt(1));
        cart.add_item(shirt(1).with_color("blue"));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(
            notifier.notifications().last(),
            Some(&Notification::Success("Cart cleared".to_owned()))
        );

        let reopened = CartStore::open(storage);
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_replace_all_filters_and_dedupes() {
        let (mut cart, _, _) = store();
        let report = cart.replace_all(vec![
            shirt(2),
            shirt(0),
            CartItem::new(ProductSnapshot::new(" ", "Ghost", Price::ZERO), 1),
            shirt(5),
            shirt(1).with_size("S"),
        ]);

        assert_eq!(
            report,
            ReplaceReport {
                kept: 2,
                invalid: 2,
                duplicates: 1
            }
        );
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.items()[1].size.as_deref(), Some("S"));
        assert_invariants(&cart);
    }

    #[test]
    fn test_replace_all_round_trip() {
        let (mut cart, _, _) = store();
        cart.add_item(shirt(3));
        cart.add_item(shirt(1).with_color("blue"));
        cart.add_item(CartItem::new(
            ProductSnapshot::new("p2", "Socks", Price::from_cents(499)),
            2,
        ));
        let before = cart.items().to_vec();

        let report = cart.replace_all(before.clone());
        assert_eq!(report.dropped(), 0);
        assert_eq!(cart.items(), before.as_slice());
    }

    #[test]
    fn test_replace_all_json_non_list_empties_cart() {
        let (mut cart, _, _) = store();
        cart.add_item(shirt(1));

        let report = cart.replace_all_json(&json!({ "cartItems": [] }));
        assert!(cart.is_empty());
        assert_eq!(report, ReplaceReport::default());
    }

    #[test]
    fn test_replace_all_json_drops_malformed_entries() {
        let (mut cart, _, _) = store();
        let report = cart.replace_all_json(&json!([
            { "product": { "id": "p1", "title": "Shirt", "price": 20 }, "quantity": 1 },
            { "product": { "id": "p2", "title": "Hat", "price": "12" }, "quantity": 1 },
            { "product": { "id": "p3", "title": "Belt", "price": 15 }, "quantity": 0 },
            { "product": { "id": "p4", "title": "Scarf", "price": 9 }, "quantity": 2.5 },
            "garbage"
        ]));

        assert_eq!(report.kept, 1);
        assert_eq!(report.invalid, 4);
        assert_eq!(cart.items()[0].product.id.as_str(), "p1");
    }

    #[test]
    fn test_mutations_persist_and_reload() {
        let (mut cart, storage, _) = store();
        cart.add_item(shirt(2));
        cart.add_item(CartItem::new(
            ProductSnapshot::new("p2", "Socks", Price::from_cents(499)),
            1,
        ));
        cart.decrease_quantity(&red_m());

        let reopened = CartStore::open(storage);
        assert_eq!(reopened.items(), cart.items());
    }

    #[test]
    fn test_open_drops_invalid_persisted_lines() {
        let doc = json!({
            "state": {
                "cartItems": [
                    { "item": { "_id": "p1", "title": "Shirt", "price": 20 }, "quantity": 1, "color": "red" },
                    { "item": { "title": "No id", "price": 20 }, "quantity": 1 },
                    { "item": { "_id": "p1", "title": "Shirt", "price": 20 }, "quantity": 4, "color": "red" },
                    { "product": { "id": "p9", "title": "Cap", "price": 11.5 }, "quantity": 2 }
                ]
            },
            "version": 0
        });
        let storage = MemoryStorage::with_entry(STORAGE_KEY, doc.to_string());

        let cart = CartStore::open(storage.clone());
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.items()[1].product.id.as_str(), "p9");

        // Loading is passive.
        assert_eq!(storage.get(STORAGE_KEY), Some(doc.to_string()));
    }

    #[test]
    fn test_open_malformed_document_starts_empty() {
        for raw in ["", "{", "[1,2,3]", r#"{"state":{"cartItems":"nope"}}"#] {
            let cart = CartStore::open(MemoryStorage::with_entry(STORAGE_KEY, raw));
            assert!(cart.is_empty(), "{raw:?} should load as empty");
        }
    }

    #[test]
    fn test_storage_failure_keeps_memory_authoritative() {
        let notifier = RecordingNotifier::new();
        let mut cart = CartStore::open_with_notifier(MemoryStorage::failing(), notifier.clone());

        assert_eq!(cart.add_item(shirt(1)), AddOutcome::Inserted);
        assert_eq!(cart.increase_quantity(&red_m()), Some(2));
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(notifier.failure_count(), 0);
    }

    #[test]
    fn test_summary_tracks_mutations() {
        let (mut cart, _, _) = store();
        cart.add_item(shirt(2));
        cart.add_item(CartItem::new(
            ProductSnapshot::new("p2", "Socks", Price::from_cents(499)),
            3,
        ));

        let summary = cart.summary();
        assert_eq!(summary.subtotal, Price::from_cents(5497));
        assert_eq!(summary.item_count, 5);
        assert_eq!(summary.line_count, 2);
    }

    mod sequences {
        use proptest::prelude::*;

        use super::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(VariantKey, u32),
            Inc(VariantKey),
            Dec(VariantKey),
            Remove(VariantKey),
            Replace(Vec<(VariantKey, u32)>),
        }

        fn arb_key() -> impl Strategy<Value = VariantKey> {
            (
                prop::sample::select(vec!["p1", "p2", "p3"]),
                prop::option::of(prop::sample::select(vec!["red", "blue", ""])),
                prop::option::of(prop::sample::select(vec!["S", "M"])),
            )
                .prop_map(|(id, color, size)| VariantKey::from_parts(id, color, size))
        }

        fn arb_op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => (arb_key(), 0..5_u32).prop_map(|(key, quantity)| Op::Add(key, quantity)),
                2 => arb_key().prop_map(Op::Inc),
                2 => arb_key().prop_map(Op::Dec),
                1 => arb_key().prop_map(Op::Remove),
                1 => prop::collection::vec((arb_key(), 0..5_u32), 0..6).prop_map(Op::Replace),
            ]
        }

        fn line(key: &VariantKey, quantity: u32) -> CartItem {
            CartItem {
                product: ProductSnapshot::new(
                    key.product_id.clone(),
                    "Item",
                    Price::from_cents(1250),
                ),
                quantity,
                color: key.color.clone(),
                size: key.size.clone(),
            }
        }

        /// Ordered (key, quantity) list the cart is expected to hold.
        fn apply_expected(expected: &mut Vec<(VariantKey, u32)>, op: &Op) {
            match op {
                Op::Add(_, 0) => {}
                Op::Add(key, quantity) => {
                    if let Some(entry) = expected.iter_mut().find(|(k, _)| k == key) {
                        entry.1 += quantity;
                    } else {
                        expected.push((key.clone(), *quantity));
                    }
                }
                Op::Inc(key) => {
                    if let Some(entry) = expected.iter_mut().find(|(k, _)| k == key) {
                        entry.1 += 1;
                    }
                }
                Op::Dec(key) => {
                    if let Some(entry) = expected.iter_mut().find(|(k, _)| k == key) {
                        entry.1 -= 1;
                    }
                    expected.retain(|(_, quantity)| *quantity > 0);
                }
                Op::Remove(key) => expected.retain(|(k, _)| k != key),
                Op::Replace(entries) => {
                    expected.clear();
                    for (key, quantity) in entries {
                        if *quantity > 0 && !expected.iter().any(|(k, _)| k == key) {
                            expected.push((key.clone(), *quantity));
                        }
                    }
                }
            }
        }

        fn apply(cart: &mut CartStore<MemoryStorage, RecordingNotifier>, op: &Op) {
            match op {
                Op::Add(key, quantity) => {
                    cart.add_item(line(key, *quantity));
                }
                Op::Inc(key) => {
                    cart.increase_quantity(key);
                }
                Op::Dec(key) => {
                    cart.decrease_quantity(key);
                }
                Op::Remove(key) => {
                    cart.remove_item(key);
                }
                Op::Replace(entries) => {
                    cart.replace_all(entries.iter().map(|(key, quantity)| line(key, *quantity)));
                }
            }
        }

        proptest! {
            #[test]
            fn test_invariants_hold_for_any_sequence(ops in prop::collection::vec(arb_op(), 0..40)) {
                let (mut cart, storage, _) = store();
                let mut expected = Vec::new();

                for op in &ops {
                    apply(&mut cart, op);
                    apply_expected(&mut expected, op);

                    assert_invariants(&cart);
                    let actual: Vec<(VariantKey, u32)> = cart
                        .items()
                        .iter()
                        .map(|item| (item.key(), item.quantity))
                        .collect();
                    prop_assert_eq!(&actual, &expected);
                }

                let reopened = CartStore::open(storage);
                prop_assert_eq!(reopened.items(), cart.items());
            }
        }
    }
}
