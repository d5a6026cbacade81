use serde::Serialize;

/// Permission identifier (e.g. "sweets.view").
///
/// The permission set is closed and known at compile time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Permission(&'static str);

/// Read the catalog: list, search, get.
pub const SWEETS_VIEW: Permission = Permission::new("sweets.view");
/// Buy stock.
pub const SWEETS_PURCHASE: Permission = Permission::new("sweets.purchase");
/// Create, edit, delete and restock records.
pub const SWEETS_MANAGE: Permission = Permission::new("sweets.manage");

impl Permission {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}
