//! Records written when a collection file does not exist yet.

use crate::models::{OperationTemplate, SparePartTemplate, User, UserRole};

const SEED_CREATED_AT: &str = "2024-01-01T00:00:00.000Z";

pub fn default_users() -> Vec<User> {
    vec![
        User {
            id: "1".to_string(),
            charisma_id: "ADMIN001".to_string(),
            username: "admin".to_string(),
            password: "admin123".to_string(),
            name: "Administrator".to_string(),
            role: UserRole::SuperUser,
            depot: "Central".to_string(),
            is_active: true,
            created_at: SEED_CREATED_AT.to_string(),
            workday_status: None,
            workday_closed_at: None,
            workday_opened_by: None,
            workday_reopen_reason: None,
        },
        User {
            id: "2".to_string(),
            charisma_id: "IGOR001".to_string(),
            username: "Igor".to_string(),
            password: "Igor123".to_string(),
            name: "Igor Administrator".to_string(),
            role: UserRole::Gospodar,
            depot: "Central".to_string(),
            is_active: true,
            created_at: SEED_CREATED_AT.to_string(),
            workday_status: None,
            workday_closed_at: None,
            workday_opened_by: None,
            workday_reopen_reason: None,
        },
    ]
}

pub fn default_operations() -> Vec<OperationTemplate> {
    [
        ("OP-001", "Čišćenje rezervoara", "Kompletno čišćenje rezervoara za vodu"),
        ("OP-002", "Zamena filtera", "Zamena filter uloška"),
        ("OP-003", "Provera slavina", "Provera funkcionalnosti slavina"),
        ("OP-004", "Provera sistema hlađenja", "Provera hladnjaka i kompresora"),
        ("OP-005", "Provera grejača", "Provera funkcije grejanja vode"),
        ("OP-006", "Zamena cevi", "Zamena silikonskih cevi"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (code, name, description))| OperationTemplate {
        id: (i + 1).to_string(),
        code: code.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        is_active: true,
        created_at: SEED_CREATED_AT.to_string(),
    })
    .collect()
}

pub fn default_spare_parts() -> Vec<SparePartTemplate> {
    [
        ("RD-001", "Filter uložak", "kom"),
        ("RD-002", "Slavina za hladnu vodu", "kom"),
        ("RD-003", "Slavina za toplu vodu", "kom"),
        ("RD-004", "Silikonske cevi", "m"),
        ("RD-005", "Grejač", "kom"),
        ("RD-006", "Termostat", "kom"),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (code, name, unit))| SparePartTemplate {
        id: (i + 1).to_string(),
        code: code.to_string(),
        name: name.to_string(),
        unit: unit.to_string(),
        is_active: true,
        created_at: SEED_CREATED_AT.to_string(),
    })
    .collect()
}
