//! Restaurant shopping cart and vouchers.
//!
//! [`Cart`] is plain data; every mutating method recomputes `subtotal`,
//! `discount` and `total` before returning, so the stored totals are never
//! stale. [`CartStore`] shares one cart between dashboard screens and
//! publishes each change on a `tokio::sync::watch` channel.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use serde::Deserialize;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::CartError;

/// Largest quantity a single line holds. Larger requests are clamped.
pub const MAX_QUANTITY: u32 = 10_000;

/// Largest accepted unit price.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Rounds to cents, halves away from zero.
fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Items and vouchers
// =============================================================================

/// One product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identity.
    pub product_id: String,
    /// Display name.
    pub name: String,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Units ordered. Lines never hold zero.
    pub quantity: u32,
}

impl CartItem {
    /// Creates a line.
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// `unit_price * quantity`, saturating at `Decimal::MAX`.
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// How a voucher reduces the subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VoucherKind {
    /// Percentage off, optionally capped at an absolute amount.
    Percentage { percent: Decimal, cap: Option<Decimal> },
    /// Fixed amount off.
    Fixed { amount: Decimal },
}

/// A discount code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    /// The code the user typed.
    pub code: String,
    /// Discount rule.
    pub kind: VoucherKind,
    /// Subtotal required before the voucher applies.
    pub min_subtotal: Option<Decimal>,
}

impl Voucher {
    /// `percent`% off.
    pub fn percentage(code: impl Into<String>, percent: Decimal) -> Self {
        Self {
            code: code.into(),
            kind: VoucherKind::Percentage { percent, cap: None },
            min_subtotal: None,
        }
    }

    /// `amount` off.
    pub fn fixed(code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            code: code.into(),
            kind: VoucherKind::Fixed { amount },
            min_subtotal: None,
        }
    }

    /// Caps a percentage discount. Has no effect on fixed vouchers.
    pub fn with_cap(mut self, max: Decimal) -> Self {
        if let VoucherKind::Percentage { cap, .. } = &mut self.kind {
            *cap = Some(max);
        }
        self
    }

    /// Requires a minimum subtotal.
    pub fn with_min_subtotal(mut self, min: Decimal) -> Self {
        self.min_subtotal = Some(min);
        self
    }

    /// Checks that the amounts make sense.
    pub fn check(&self) -> Result<(), CartError> {
        let invalid = |reason: &str| CartError::InvalidVoucher {
            code: self.code.clone(),
            reason: reason.to_string(),
        };
        match &self.kind {
            VoucherKind::Percentage { percent, cap } => {
                if *percent <= Decimal::ZERO || *percent > Decimal::ONE_HUNDRED {
                    return Err(invalid("percentage must be in (0, 100]"));
                }
                if cap.is_some_and(|c| c < Decimal::ZERO) {
                    return Err(invalid("cap must not be negative"));
                }
            }
            VoucherKind::Fixed { amount } => {
                if *amount <= Decimal::ZERO {
                    return Err(invalid("amount must be positive"));
                }
            }
        }
        Ok(())
    }

    /// Returns `true` when `subtotal` meets the minimum.
    pub fn applies_to(&self, subtotal: Decimal) -> bool {
        self.min_subtotal.is_none_or(|min| subtotal >= min)
    }

    /// Discount for `subtotal`. Zero when the minimum is not met; never more
    /// than `subtotal`.
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        if !self.applies_to(subtotal) {
            return Decimal::ZERO;
        }
        let raw = match &self.kind {
            VoucherKind::Percentage { percent, cap } => {
                let off = subtotal * *percent / Decimal::ONE_HUNDRED;
                cap.map_or(off, |c| off.min(c))
            }
            VoucherKind::Fixed { amount } => *amount,
        };
        round_money(raw.min(subtotal).max(Decimal::ZERO))
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart contents and derived totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
    voucher: Option<Voucher>,
    subtotal: Decimal,
    discount: Decimal,
    total: Decimal,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns the line for `product_id`.
    pub fn item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Returns the applied voucher, if any.
    pub fn voucher(&self) -> Option<&Voucher> {
        self.voucher.as_ref()
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Discount from the voucher.
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// `subtotal - discount`.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Total number of units.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Returns `true` when the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `item`, merging with an existing line for the same product.
    ///
    /// A zero quantity is ignored. Quantities are clamped to
    /// [`MAX_QUANTITY`]; prices outside `0..=MAX_UNIT_PRICE` are rejected.
    pub fn add(&mut self, mut item: CartItem) -> Result<(), CartError> {
        if item.unit_price < Decimal::ZERO || item.unit_price > MAX_UNIT_PRICE {
            return Err(CartError::InvalidPrice {
                product_id: item.product_id,
            });
        }
        if item.quantity == 0 {
            return Ok(());
        }
        item.quantity = item.quantity.min(MAX_QUANTITY);
        match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity).min(MAX_QUANTITY);
                existing.unit_price = item.unit_price;
            }
            None => self.items.push(item),
        }
        self.recalculate();
        Ok(())
    }

    /// Sets the quantity of a line, clamped to [`MAX_QUANTITY`]. Zero
    /// removes it.
    ///
    /// Returns `false` if there is no such line.
    pub fn set_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        let Some(index) = self.items.iter().position(|i| i.product_id == product_id) else {
            return false;
        };
        if quantity == 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = quantity.min(MAX_QUANTITY);
        }
        self.recalculate();
        true
    }

    /// Removes a line. Returns it if it existed.
    pub fn remove(&mut self, product_id: &str) -> Option<CartItem> {
        let index = self.items.iter().position(|i| i.product_id == product_id)?;
        let item = self.items.remove(index);
        self.recalculate();
        Some(item)
    }

    /// Applies `voucher`, replacing any previous one.
    ///
    /// Rejected when the voucher is malformed or the current subtotal is
    /// below its minimum. A voucher that stops qualifying later (lines
    /// removed) stays attached with a zero discount.
    pub fn apply_voucher(&mut self, voucher: Voucher) -> Result<(), CartError> {
        voucher.check()?;
        if !voucher.applies_to(self.subtotal) {
            return Err(CartError::BelowMinimum {
                code: voucher.code,
                minimum: voucher.min_subtotal.unwrap_or_default(),
            });
        }
        log::debug!("[cart] voucher '{}' applied", voucher.code);
        self.voucher = Some(voucher);
        self.recalculate();
        Ok(())
    }

    /// Removes the voucher.
    pub fn remove_voucher(&mut self) -> Option<Voucher> {
        let voucher = self.voucher.take();
        self.recalculate();
        voucher
    }

    /// Empties the cart, voucher included.
    pub fn clear(&mut self) {
        self.items.clear();
        self.voucher = None;
        self.recalculate();
    }

    fn recalculate(&mut self) {
        let subtotal = self
            .items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.line_total()));
        self.subtotal = round_money(subtotal);
        self.discount = self
            .voucher
            .as_ref()
            .map_or(Decimal::ZERO, |v| v.discount_for(self.subtotal));
        self.total = self.subtotal - self.discount;
    }
}

// =============================================================================
// Shared store
// =============================================================================

/// Shared cart with change notification.
///
/// Clones share the same cart. Readers call [`subscribe`](Self::subscribe)
/// and wait on `changed()`; writers go through the methods below, which
/// notify only when something changed.
///
/// # Example
///
/// ```
/// use farmgate_lib::cart::{CartItem, CartStore};
/// use rust_decimal::Decimal;
///
/// let store = CartStore::new();
/// let rx = store.subscribe();
///
/// store.add(CartItem::new("p-1", "Kale", Decimal::new(350, 2), 2)).unwrap();
/// assert_eq!(rx.borrow().total(), Decimal::new(700, 2));
/// ```
#[derive(Clone)]
pub struct CartStore {
    tx: Arc<watch::Sender<Cart>>,
}

impl CartStore {
    /// Creates a store holding an empty cart.
    pub fn new() -> Self {
        Self::with_cart(Cart::new())
    }

    /// Creates a store holding `cart`.
    pub fn with_cart(cart: Cart) -> Self {
        let (tx, _rx) = watch::channel(cart);
        Self { tx: Arc::new(tx) }
    }

    /// Returns a receiver that sees every committed change.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.tx.subscribe()
    }

    /// Returns a copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.tx.borrow().clone()
    }

    /// See [`Cart::add`].
    pub fn add(&self, item: CartItem) -> Result<(), CartError> {
        self.modify(|cart| cart.add(item).map(|()| true))
    }

    /// See [`Cart::set_quantity`].
    pub fn set_quantity(&self, product_id: &str, quantity: u32) -> bool {
        self.tx
            .send_if_modified(|cart| cart.set_quantity(product_id, quantity))
    }

    /// See [`Cart::remove`].
    pub fn remove(&self, product_id: &str) -> Option<CartItem> {
        let mut removed = None;
        self.tx.send_if_modified(|cart| {
            removed = cart.remove(product_id);
            removed.is_some()
        });
        removed
    }

    /// See [`Cart::apply_voucher`].
    pub fn apply_voucher(&self, voucher: Voucher) -> Result<(), CartError> {
        self.modify(|cart| cart.apply_voucher(voucher).map(|()| true))
    }

    /// See [`Cart::remove_voucher`].
    pub fn remove_voucher(&self) -> Option<Voucher> {
        let mut removed = None;
        self.tx.send_if_modified(|cart| {
            removed = cart.remove_voucher();
            removed.is_some()
        });
        removed
    }

    /// Empties the cart, for example after checkout.
    pub fn clear(&self) {
        self.tx.send_if_modified(|cart| {
            let changed = !cart.is_empty() || cart.voucher().is_some();
            cart.clear();
            changed
        });
    }

    fn modify<F>(&self, f: F) -> Result<(), CartError>
    where
        F: FnOnce(&mut Cart) -> Result<bool, CartError>,
    {
        let mut result = Ok(());
        self.tx.send_if_modified(|cart| match f(cart) {
            Ok(changed) => changed,
            Err(e) => {
                result = Err(e);
                false
            }
        });
        result
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
