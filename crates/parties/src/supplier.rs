use serde::{Deserialize, Serialize};

use canteen_core::{DomainResult, Entity, EntityId, error::require_non_blank};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: EntityId,
    pub name: String,
    pub contact_person: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDraft {
    pub name: String,
    pub contact_person: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Supplier {
    pub fn create(draft: SupplierDraft) -> DomainResult<Self> {
        require_non_blank("name", &draft.name)?;
        require_non_blank("contactPerson", &draft.contact_person)?;
        Ok(Self {
            id: EntityId::new(),
            name: draft.name.trim().to_string(),
            contact_person: draft.contact_person.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            email: draft.email.trim().to_string(),
        })
    }

    pub fn apply_patch(&mut self, patch: SupplierPatch) -> DomainResult<()> {
        if let Some(name) = &patch.name {
            require_non_blank("name", name)?;
        }
        if let Some(contact) = &patch.contact_person {
            require_non_blank("contactPerson", contact)?;
        }

        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(contact) = patch.contact_person {
            self.contact_person = contact.trim().to_string();
        }
        if let Some(phone) = patch.phone {
            self.phone = phone.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = email.trim().to_string();
        }
        Ok(())
    }
}

impl Entity for Supplier {
    const COLLECTION: &'static str = "suppliers";

    fn id(&self) -> EntityId {
        self.id
    }
}
