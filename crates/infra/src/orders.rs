//! Order processor: order capture, status changes and dashboard metrics.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use canteen_core::EntityId;
use canteen_products::Product;
use canteen_sales::{
    DashboardStats, Order, OrderItemRequest, OrderLine, OrderStatus, SalesPoint, TOP_PRODUCTS_LIMIT, TopProduct,
    dashboard_stats, top_products, weekly_sales,
};

use crate::error::ServiceResult;
use crate::repository::Repository;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_name: String,
    pub items: Vec<OrderItemRequest>,
    /// Defaults to Pending. The POS screen places orders as Completed.
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

pub struct OrderProcessor {
    orders: Arc<dyn Repository<Order>>,
    products: Arc<dyn Repository<Product>>,
}

impl OrderProcessor {
    pub fn new(orders: Arc<dyn Repository<Order>>, products: Arc<dyn Repository<Product>>) -> Self {
        Self { orders, products }
    }

    /// Place an order for `cashier`, snapshotting current product names and
    /// prices. Stock is not touched.
    pub async fn create_order(&self, req: NewOrder, cashier: &str, now: DateTime<Utc>) -> ServiceResult<Order> {
        Order::validate_request(&req.customer_name, &req.items)?;

        let mut lines = Vec::with_capacity(req.items.len());
        for item in &req.items {
            let product = self.products.get(item.product_id).await?;
            lines.push(OrderLine::snapshot(&product, item.quantity)?);
        }

        let order = Order::place(&req.customer_name, lines, cashier, req.status.unwrap_or_default(), now)?;
        let order = self.orders.create(order).await?;
        info!(order_id = %order.id, total = %order.total, status = ?order.status, "order placed");
        Ok(order)
    }

    pub async fn list_orders(&self) -> ServiceResult<Vec<Order>> {
        self.orders.list().await
    }

    /// Any status may move to any other.
    pub async fn update_status(&self, id: EntityId, status: OrderStatus) -> ServiceResult<Order> {
        let order = self
            .orders
            .update_with(
                id,
                Box::new(move |o: &mut Order| {
                    o.set_status(status);
                    Ok(())
                }),
            )
            .await?;
        info!(order_id = %id, status = ?status, "order status changed");
        Ok(order)
    }

    pub async fn delete_order(&self, id: EntityId) -> ServiceResult<()> {
        self.orders.delete(id).await?;
        info!(order_id = %id, "order deleted");
        Ok(())
    }

    pub async fn stats(&self) -> ServiceResult<DashboardStats> {
        Ok(dashboard_stats(&self.orders.list().await?))
    }

    pub async fn top_products(&self) -> ServiceResult<Vec<TopProduct>> {
        Ok(top_products(&self.orders.list().await?, TOP_PRODUCTS_LIMIT))
    }

    pub fn weekly_sales(&self) -> Vec<SalesPoint> {
        weekly_sales()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::repository::InMemoryRepository;
    use canteen_core::DomainError;
    use canteen_products::{ProductDraft, ProductPatch};
    use rust_decimal::Decimal;

    struct Fixture {
        processor: OrderProcessor,
        products: Arc<InMemoryRepository<Product>>,
    }

    fn fixture() -> Fixture {
        let products = Arc::new(InMemoryRepository::<Product>::new());
        let processor = OrderProcessor::new(Arc::new(InMemoryRepository::<Order>::new()), products.clone());
        Fixture { processor, products }
    }

    async fn product(fx: &Fixture, name: &str, cents: i64) -> Product {
        let draft = ProductDraft {
            name: name.into(),
            category: "Meals".into(),
            price: Decimal::new(cents, 2),
            stock: 50,
            allergens: Default::default(),
            supplier: String::new(),
            expiry_date: None,
        };
        fx.products.create(Product::create(draft).unwrap()).await.unwrap()
    }

    fn request(items: Vec<(EntityId, i64)>) -> NewOrder {
        NewOrder {
            customer_name: "Walk-in".into(),
            items: items
                .into_iter()
                .map(|(product_id, quantity)| OrderItemRequest { product_id, quantity })
                .collect(),
            status: None,
        }
    }

    #[tokio::test]
    async fn total_uses_snapshot_prices() {
        let fx = fixture();
        let tea = product(&fx, "Tea", 120).await;
        let bun = product(&fx, "Bun", 75).await;

        let order = fx
            .processor
            .create_order(request(vec![(tea.id, 2), (bun.id, 3)]), "cashier-1", Utc::now())
            .await
            .unwrap();

        assert_eq!(order.total, Decimal::new(465, 2));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items[0].name, "Tea");

        fx.products
            .update_with(
                tea.id,
                Box::new(|p: &mut Product| {
                    p.apply_patch(ProductPatch {
                        price: Some(Decimal::new(999, 2)),
                        ..Default::default()
                    })
                }),
            )
            .await
            .unwrap();
        let stored = &fx.processor.list_orders().await.unwrap()[0];
        assert_eq!(stored.total, Decimal::new(465, 2));
        assert_eq!(stored.items[0].price, Decimal::new(120, 2));
    }

    #[tokio::test]
    async fn order_does_not_touch_stock() {
        let fx = fixture();
        let tea = product(&fx, "Tea", 100).await;
        fx.processor
            .create_order(request(vec![(tea.id, 10)]), "c", Utc::now())
            .await
            .unwrap();
        assert_eq!(fx.products.get(tea.id).await.unwrap().stock, 50);
    }

    #[tokio::test]
    async fn empty_or_unknown_items_are_rejected() {
        let fx = fixture();
        let err = fx
            .processor
            .create_order(request(vec![]), "c", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));

        let err = fx
            .processor
            .create_order(request(vec![(EntityId::new(), 1)]), "c", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));
        assert!(fx.processor.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn revenue_moves_with_status() {
        let fx = fixture();
        let tea = product(&fx, "Tea", 200).await;
        let order = fx
            .processor
            .create_order(request(vec![(tea.id, 2)]), "c", Utc::now())
            .await
            .unwrap();

        assert_eq!(fx.processor.stats().await.unwrap().total_revenue, Decimal::ZERO);
        assert_eq!(fx.processor.stats().await.unwrap().pending_orders, 1);

        fx.processor.update_status(order.id, OrderStatus::Completed).await.unwrap();
        let stats = fx.processor.stats().await.unwrap();
        assert_eq!(stats.total_revenue, Decimal::new(400, 2));
        assert_eq!(stats.pending_orders, 0);
        assert_eq!(
            fx.processor.top_products().await.unwrap(),
            vec![TopProduct { name: "Tea".into(), sales: 2 }]
        );

        fx.processor.update_status(order.id, OrderStatus::Cancelled).await.unwrap();
        assert_eq!(fx.processor.stats().await.unwrap().total_revenue, Decimal::ZERO);
    }

    #[tokio::test]
    async fn caller_may_place_completed_orders_and_delete_them() {
        let fx = fixture();
        let tea = product(&fx, "Tea", 100).await;
        let mut req = request(vec![(tea.id, 1)]);
        req.status = Some(OrderStatus::Completed);
        let order = fx.processor.create_order(req, "c", Utc::now()).await.unwrap();
        assert!(order.is_completed());

        fx.processor.delete_order(order.id).await.unwrap();
        let err = fx.processor.delete_order(order.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));
    }
}
