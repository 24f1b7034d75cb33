use serde::{Deserialize, Serialize};

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Cashier,
    Staff,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Manager, Role::Cashier, Role::Staff];

    /// Roles whose permissions this role inherits (always includes itself).
    ///
    /// Admin ⊇ {Admin, Manager, Cashier, Staff}; Manager ⊇ {Manager, Cashier,
    /// Staff}; Cashier and Staff only hold their own.
    pub fn hierarchy(self) -> &'static [Role] {
        match self {
            Role::Admin => &[Role::Admin, Role::Manager, Role::Cashier, Role::Staff],
            Role::Manager => &[Role::Manager, Role::Cashier, Role::Staff],
            Role::Cashier => &[Role::Cashier],
            Role::Staff => &[Role::Staff],
        }
    }

    /// Whether this role holds `other`'s permissions.
    pub fn includes(self, other: Role) -> bool {
        self.hierarchy().contains(&other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Cashier => "Cashier",
            Role::Staff => "Staff",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
