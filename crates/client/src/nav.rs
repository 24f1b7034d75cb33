//! Role-aware sidebar.

use canteen_auth::{Page, Role};

/// Sidebar entries for `role`, in display order.
pub fn sidebar(role: Role) -> Vec<(Page, &'static str)> {
    Page::visible_to(role).into_iter().map(|p| (p, p.label())).collect()
}

/// Whether `role` may open `page`. Pages a role cannot open are not rendered.
pub fn can_open(role: Role, page: Page) -> bool {
    page.allowed_roles().contains(&role)
}

/// Landing page after login.
pub fn home(role: Role) -> Page {
    if can_open(role, Page::Dashboard) {
        Page::Dashboard
    } else if can_open(role, Page::NewOrder) {
        Page::NewOrder
    } else {
        Page::Settings
    }
}
