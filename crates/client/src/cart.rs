//! Point-of-sale cart built on the New Order screen.
//!
//! Quantities are capped at the stock the cashier last saw. The server does
//! not decrement stock on order creation, so this cap is advisory only.

use rust_decimal::Decimal;

use canteen_core::{DomainError, DomainResult, EntityId};
use canteen_products::Product;
use canteen_sales::{Order, OrderItemRequest, OrderStatus};

use crate::PlaceOrder;

pub const OUT_OF_STOCK: &str = "This product is out of stock.";
pub const OVER_STOCK: &str = "Cannot add more than available stock.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: EntityId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
    /// Stock at the time the product was added.
    pub available: i64,
}

impl CartLine {
    pub fn subtotal(&self) -> DomainResult<Decimal> {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(out_of_range)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `product`.
    pub fn add(&mut self, product: &Product) -> DomainResult<()> {
        if product.stock <= 0 {
            return Err(DomainError::invariant(OUT_OF_STOCK));
        }
        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => {
                if line.quantity + 1 > product.stock {
                    return Err(DomainError::invariant(OVER_STOCK));
                }
                line.quantity += 1;
                line.available = product.stock;
            }
            None => self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity: 1,
                available: product.stock,
            }),
        }
        Ok(())
    }

    /// Set a line's quantity; zero or less removes the line.
    pub fn set_quantity(&mut self, product_id: EntityId, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or_else(|| DomainError::not_found(format!("cart line {product_id}")))?;
        if quantity > line.available {
            return Err(DomainError::invariant(OVER_STOCK));
        }
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, product_id: EntityId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total(&self) -> DomainResult<Decimal> {
        self.lines.iter().try_fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(line.subtotal()?).ok_or_else(out_of_range)
        })
    }

    /// Build the order request for this cart.
    ///
    /// The New Order screen records sales as already completed.
    pub fn checkout(&self, customer_name: &str) -> DomainResult<PlaceOrder> {
        let items: Vec<OrderItemRequest> = self
            .lines
            .iter()
            .map(|l| OrderItemRequest {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect();
        Order::validate_request(customer_name, &items)?;
        Ok(PlaceOrder {
            customer_name: customer_name.trim().to_string(),
            items,
            status: Some(OrderStatus::Completed),
        })
    }
}

fn out_of_range() -> DomainError {
    DomainError::validation("order total out of range")
}
