use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{Configuration, Dispatch, Employee, Payment, User, WorkRecord};

// In-memory storage. Stands in for the database: one DashMap per table,
// keyed by id, with owner scoping done in the accessors. Handlers clone
// values out instead of holding guards across awaits.
#[derive(Default)]
pub struct Store {
    pub users: DashMap<Uuid, User>,
    pub employees: DashMap<Uuid, Employee>,
    pub work_records: DashMap<Uuid, WorkRecord>,
    pub payments: DashMap<Uuid, Payment>,
    pub dispatches: DashMap<Uuid, Dispatch>,
    pub configurations: DashMap<String, Configuration>,
    pub sessions: DashMap<String, Uuid>, // token -> user id
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .map(|u| u.value().clone())
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.value().clone())
    }

    // newest first, like the original list endpoints
    pub fn employees_for(&self, owner: Uuid) -> Vec<Employee> {
        let mut employees: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| e.created_by == owner)
            .map(|e| e.value().clone())
            .collect();
        employees.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        employees
    }

    pub fn employee_for(&self, owner: Uuid, id: Uuid) -> Option<Employee> {
        self.employees
            .get(&id)
            .filter(|e| e.created_by == owner)
            .map(|e| e.value().clone())
    }

    pub fn work_records_for(&self, owner: Uuid) -> Vec<WorkRecord> {
        let mut records: Vec<WorkRecord> = self
            .work_records
            .iter()
            .filter(|r| r.created_by == owner)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    pub fn work_record_for(&self, owner: Uuid, id: Uuid) -> Option<WorkRecord> {
        self.work_records
            .get(&id)
            .filter(|r| r.created_by == owner)
            .map(|r| r.value().clone())
    }

    pub fn payments_for(&self, owner: Uuid) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .filter(|p| p.created_by == owner)
            .map(|p| p.value().clone())
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        payments
    }

    pub fn payment_for(&self, owner: Uuid, id: Uuid) -> Option<Payment> {
        self.payments
            .get(&id)
            .filter(|p| p.created_by == owner)
            .map(|p| p.value().clone())
    }

    pub fn dispatches_for(&self, user_id: Uuid) -> Vec<Dispatch> {
        let mut dispatches: Vec<Dispatch> = self
            .dispatches
            .iter()
            .filter(|d| d.user_id == user_id)
            .map(|d| d.value().clone())
            .collect();
        dispatches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        dispatches
    }

    pub fn configurations_sorted(&self) -> Vec<Configuration> {
        let mut configurations: Vec<Configuration> = self
            .configurations
            .iter()
            .map(|c| c.value().clone())
            .collect();
        configurations.sort_by(|a, b| a.key.cmp(&b.key));
        configurations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn employee(owner: Uuid, name: &str, offset_secs: i64) -> Employee {
        let created_at = Utc::now() + Duration::seconds(offset_secs);
        Employee {
            id: Uuid::new_v4(),
            name: name.to_string(),
            special_notes: None,
            is_active: true,
            created_by: owner,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn employee_listing_is_owner_scoped() {
        let store = Store::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mine = employee(alice, "mine", 0);
        let theirs = employee(bob, "theirs", 0);
        store.employees.insert(mine.id, mine.clone());
        store.employees.insert(theirs.id, theirs.clone());

        let listed = store.employees_for(alice);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);

        // point lookups respect the same scoping
        assert!(store.employee_for(alice, theirs.id).is_none());
        assert!(store.employee_for(bob, theirs.id).is_some());
    }

    #[test]
    fn employee_listing_is_newest_first() {
        let store = Store::new();
        let owner = Uuid::new_v4();

        let older = employee(owner, "older", -10);
        let newer = employee(owner, "newer", 0);
        store.employees.insert(older.id, older.clone());
        store.employees.insert(newer.id, newer.clone());

        let listed = store.employees_for(owner);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }
}
