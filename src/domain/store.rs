use std::sync::Arc;

use parking_lot::RwLock;

use crate::{entities::profile::Profile, errors::AppError};

/// The client-side profile collection.
///
/// Transitions consume the store and hand back the next one, so a caller
/// holding an older value never observes a change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileStore {
    profiles: Vec<Profile>,
}

/// A state transition, in reducer form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    SetAll(Vec<Profile>),
    Add(Profile),
    Update(Profile),
    Remove(String),
}

impl ProfileStore {
    pub fn new(profiles: Vec<Profile>) -> Self {
        ProfileStore { profiles }
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Replaces the whole collection.
    pub fn set_all(self, profiles: Vec<Profile>) -> Self {
        ProfileStore { profiles }
    }

    /// Appends a profile. Fails with `Conflict` if its id is already present.
    pub fn add(self, profile: Profile) -> Result<Self, AppError> {
        if self.contains(&profile.id) {
            return Err(AppError::Conflict(format!("Profile {} already exists", profile.id)));
        }

        let mut profiles = self.profiles;
        profiles.push(profile);
        Ok(ProfileStore { profiles })
    }

    /// Replaces the profile with the same id in place. Fails with `NotFound` if absent.
    pub fn update(self, profile: Profile) -> Result<Self, AppError> {
        let mut profiles = self.profiles;
        match profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(slot) => *slot = profile,
            None => return Err(AppError::NotFound(format!("Profile {}", profile.id))),
        }
        Ok(ProfileStore { profiles })
    }

    /// Removes the profile with this id; an unknown id leaves the store as it was.
    pub fn remove(self, id: &str) -> Self {
        let mut profiles = self.profiles;
        profiles.retain(|p| p.id != id);
        ProfileStore { profiles }
    }

    pub fn apply(self, command: StoreCommand) -> Result<Self, AppError> {
        match command {
            StoreCommand::SetAll(profiles) => Ok(self.set_all(profiles)),
            StoreCommand::Add(profile) => self.add(profile),
            StoreCommand::Update(profile) => self.update(profile),
            StoreCommand::Remove(id) => Ok(self.remove(&id)),
        }
    }
}

/// Shared handle to the one profile store of the process.
///
/// All mutation goes through [`SharedProfileStore::dispatch`]. A failed
/// transition leaves the held state untouched.
#[derive(Debug, Clone, Default)]
pub struct SharedProfileStore {
    inner: Arc<RwLock<ProfileStore>>,
}

impl SharedProfileStore {
    pub fn new(store: ProfileStore) -> Self {
        SharedProfileStore {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn snapshot(&self) -> ProfileStore {
        self.inner.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Profile> {
        self.inner.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn dispatch(&self, command: StoreCommand) -> Result<(), AppError> {
        let mut guard = self.inner.write();
        let next = guard.clone().apply(command)?;
        *guard = next;
        Ok(())
    }
}
