//! Case-insensitive search boxes on the list screens.

use canteen_auth::UserProfile;
use canteen_products::Product;
use canteen_sales::Order;

fn matches<'a>(query: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty() || fields.into_iter().any(|f| f.to_lowercase().contains(&query))
}

/// Products whose name, category or supplier contains `query`.
pub fn products<'a>(items: &'a [Product], query: &str) -> Vec<&'a Product> {
    items
        .iter()
        .filter(|p| matches(query, [p.name.as_str(), p.category.as_str(), p.supplier.as_str()]))
        .collect()
}

/// Orders whose id, customer or cashier contains `query`.
pub fn orders<'a>(items: &'a [Order], query: &str) -> Vec<&'a Order> {
    items
        .iter()
        .filter(|o| {
            let id = o.id.to_string();
            matches(query, [id.as_str(), o.customer_name.as_str(), o.cashier.as_str()])
        })
        .collect()
}

pub fn users<'a>(items: &'a [UserProfile], query: &str) -> Vec<&'a UserProfile> {
    items
        .iter()
        .filter(|u| matches(query, [u.name.as_str(), u.email.as_str()]))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use canteen_products::ProductDraft;
    use canteen_sales::{OrderLine, OrderStatus};

    use super::*;

    fn product(name: &str, category: &str, supplier: &str) -> Product {
        Product::create(ProductDraft {
            name: name.into(),
            category: category.into(),
            price: Decimal::new(100, 2),
            stock: 5,
            allergens: BTreeSet::new(),
            supplier: supplier.into(),
            expiry_date: None,
        })
        .unwrap()
    }

    #[test]
    fn product_search_covers_name_category_supplier() {
        let items = vec![
            product("Cheese Roll", "Bakery", "Fresh Farms"),
            product("Apple Juice", "Drinks", "Orchard Co"),
        ];
        assert_eq!(products(&items, "cheese").len(), 1);
        assert_eq!(products(&items, "DRINKS")[0].name, "Apple Juice");
        assert_eq!(products(&items, "orchard")[0].name, "Apple Juice");
        assert!(products(&items, "pizza").is_empty());
    }

    #[test]
    fn blank_query_matches_everything() {
        let items = vec![product("Tea", "Drinks", "Leafy")];
        assert_eq!(products(&items, "   ").len(), 1);
    }

    #[test]
    fn order_search_covers_id_customer_cashier() {
        let p = product("Tea", "Drinks", "Leafy");
        let line = OrderLine::snapshot(&p, 1).unwrap();
        let order = Order::place("Jamie", vec![line], "Sam Cashier", OrderStatus::Pending, Utc::now()).unwrap();
        let id_prefix = order.id.to_string()[..8].to_string();
        let items = vec![order];

        assert_eq!(orders(&items, "jamie").len(), 1);
        assert_eq!(orders(&items, "sam").len(), 1);
        assert_eq!(orders(&items, &id_prefix).len(), 1);
        assert!(orders(&items, "nobody").is_empty());
    }
}
