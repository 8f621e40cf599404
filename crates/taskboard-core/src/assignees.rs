use std::collections::{BTreeMap, BTreeSet};

use taskboard_shared::{Account, AccountId, initials_for_name};
use tracing::{debug, warn};

/// Rendered assignee: initials on a colored chip plus the full name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeBadge {
    pub initials: String,
    pub full_name: String,
    pub color: Option<String>,
}

impl AssigneeBadge {
    pub fn from_name(name: &str, color: Option<String>) -> Self {
        let full_name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        Self {
            initials: initials_for_name(&full_name),
            full_name,
            color,
        }
    }
}

/// Accounts as returned by `GET /api/accounts`, in the backend's key order.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: BTreeMap<AccountId, Account>,
}

impl AccountDirectory {
    pub fn new(accounts: BTreeMap<AccountId, Account>) -> Self {
        Self { accounts }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &Account)> {
        self.accounts.iter()
    }

    /// Matches a stored display name to an account. Two accounts sharing a
    /// full name cannot be told apart; the first in directory order wins.
    pub fn find_by_name(&self, name: &str) -> Option<&AccountId> {
        let wanted = normalize_name(name);
        let mut matches = self
            .accounts
            .iter()
            .filter(|(_, account)| normalize_name(&account.full_name()) == wanted)
            .map(|(id, _)| id);
        let first = matches.next()?;
        if matches.next().is_some() {
            warn!(name = %wanted, account = %first, "display name matches several accounts; using the first");
        }
        Some(first)
    }

    pub fn badge_for_name(&self, name: &str) -> AssigneeBadge {
        match self.find_by_name(name).and_then(|id| self.accounts.get(id)) {
            Some(account) => AssigneeBadge {
                initials: account.initials(),
                full_name: account.full_name(),
                color: account.profile_color.clone(),
            },
            None => AssigneeBadge::from_name(name, None),
        }
    }

    /// One badge per unique name, in first-seen order.
    pub fn badges_for_names(&self, names: &[String]) -> Vec<AssigneeBadge> {
        let mut seen = BTreeSet::new();
        names
            .iter()
            .map(|name| normalize_name(name))
            .filter(|name| !name.is_empty() && seen.insert(name.clone()))
            .map(|name| self.badge_for_name(&name))
            .collect()
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Chosen assignees, by account id. Display order is always directory
/// order, so the set itself carries no insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssigneeSelection {
    selected: BTreeSet<AccountId>,
}

impl AssigneeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the selection from the names stored on a task. Names without a
    /// matching account are dropped.
    pub fn from_names(names: &[String], directory: &AccountDirectory) -> Self {
        let mut selection = Self::new();
        for name in names {
            match directory.find_by_name(name) {
                Some(id) => {
                    selection.selected.insert(id.clone());
                }
                None => warn!(name = %name, "stored assignee has no matching account"),
            }
        }
        debug!(count = selection.len(), "assignee selection seeded");
        selection
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.selected.contains(id)
    }

    pub fn select(&mut self, id: AccountId) -> bool {
        self.selected.insert(id)
    }

    pub fn deselect(&mut self, id: &AccountId) -> bool {
        self.selected.remove(id)
    }

    /// Flips one assignee; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: &AccountId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Full names for the wire format, in directory order. Ids no longer in
    /// the directory are skipped.
    pub fn names(&self, directory: &AccountDirectory) -> Vec<String> {
        directory
            .iter()
            .filter(|(id, _)| self.selected.contains(*id))
            .map(|(_, account)| account.full_name())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownEntry {
    pub account_id: AccountId,
    pub full_name: String,
    pub initials: String,
    pub color: Option<String>,
    pub checked: bool,
}

/// The checkbox list of the assignee picker. At save time the checked boxes
/// are the authoritative answer, not the selection they were built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssigneeDropdown {
    entries: Vec<DropdownEntry>,
}

impl AssigneeDropdown {
    pub fn build(directory: &AccountDirectory, selection: &AssigneeSelection) -> Self {
        let entries = directory
            .iter()
            .map(|(id, account)| DropdownEntry {
                account_id: id.clone(),
                full_name: account.full_name(),
                initials: account.initials(),
                color: account.profile_color.clone(),
                checked: selection.contains(id),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[DropdownEntry] {
        &self.entries
    }

    /// Flips the checkbox and mirrors the change into `selection`. Returns
    /// `None` when the account is not listed.
    pub fn toggle(&mut self, id: &AccountId, selection: &mut AssigneeSelection) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|entry| &entry.account_id == id)?;
        entry.checked = !entry.checked;
        if entry.checked {
            selection.select(id.clone());
        } else {
            selection.deselect(id);
        }
        Some(entry.checked)
    }

    pub fn checked_ids(&self) -> Vec<AccountId> {
        self.entries
            .iter()
            .filter(|entry| entry.checked)
            .map(|entry| entry.account_id.clone())
            .collect()
    }

    pub fn checked_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.checked)
            .map(|entry| entry.full_name.clone())
            .collect()
    }

    pub fn uncheck_all(&mut self, selection: &mut AssigneeSelection) {
        for entry in &mut self.entries {
            entry.checked = false;
        }
        selection.clear();
    }
}
