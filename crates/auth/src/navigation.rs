//! Navigation targets of the back-office client and the roles allowed on each.

use serde::{Deserialize, Serialize};

use crate::Role;

/// A navigation/action target of the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    Dashboard,
    NewOrder,
    Orders,
    Products,
    Inventory,
    Suppliers,
    Discounts,
    Users,
    Settings,
}

impl Page {
    /// Pages in sidebar order.
    pub const ALL: [Page; 9] = [
        Page::Dashboard,
        Page::NewOrder,
        Page::Orders,
        Page::Products,
        Page::Inventory,
        Page::Suppliers,
        Page::Discounts,
        Page::Users,
        Page::Settings,
    ];

    /// Roles allowed to open this page.
    pub fn allowed_roles(self) -> &'static [Role] {
        use Role::*;
        match self {
            Page::Dashboard => &[Admin, Manager],
            Page::NewOrder | Page::Orders => &[Admin, Manager, Cashier],
            Page::Products | Page::Inventory | Page::Suppliers | Page::Discounts => &[Admin, Manager],
            Page::Users => &[Admin],
            Page::Settings => &[Admin, Manager, Cashier, Staff],
        }
    }

    /// Human-readable sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::NewOrder => "New Order",
            Page::Orders => "Orders",
            Page::Products => "Products",
            Page::Inventory => "Inventory",
            Page::Suppliers => "Suppliers",
            Page::Discounts => "Discounts",
            Page::Users => "Users",
            Page::Settings => "Settings",
        }
    }

    /// Pages visible to `role`, in sidebar order.
    pub fn visible_to(role: Role) -> Vec<Page> {
        Page::ALL
            .into_iter()
            .filter(|p| p.allowed_roles().contains(&role))
            .collect()
    }
}
