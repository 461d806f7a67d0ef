//! Id-keyed registry with owner-gated mutation
//!
//! Every registry in the ledger is an `OwnedRegistry` over its own record
//! type. Ids are allocated sequentially from 1 and never reused; records are
//! replaced in place by updates and never removed.

use std::marker::PhantomData;
use log::{debug, warn};

use crate::crypto;
use crate::error::{RegistryError, RegistryResult};
use crate::models::{Patch, Principal, Record, RecordId};
use super::store::{MemoryStore, RecordStore};

/// First id handed out by a fresh registry
pub const FIRST_ID: RecordId = 1;

/// Who may create records in a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatePolicy {
    /// Any caller may create
    Open,

    /// Only the owner may create
    OwnerOnly,
}

/// Registry of `T` records owned by a single principal
#[derive(Debug, Clone)]
pub struct OwnedRegistry<T, S = MemoryStore<T>> {
    /// Principal allowed to perform gated mutations; fixed at construction
    owner: Principal,

    /// Next id to allocate
    next_id: RecordId,

    /// Record storage
    store: S,

    _record: PhantomData<T>,
}

impl<T: Record> OwnedRegistry<T> {
    /// Create an empty in-memory registry
    pub fn new(owner: Principal) -> Self {
        OwnedRegistry {
            owner,
            next_id: FIRST_ID,
            store: MemoryStore::new(),
            _record: PhantomData,
        }
    }
}

impl<T: Record, S: RecordStore<T>> OwnedRegistry<T, S> {
    /// Create a registry over an existing store, continuing after its highest id
    pub fn with_store(owner: Principal, store: S) -> Self {
        let next_id = store
            .ids()
            .last()
            .map_or(FIRST_ID, |max| max.saturating_add(1));

        OwnedRegistry {
            owner,
            next_id,
            store,
            _record: PhantomData,
        }
    }

    /// Rebuild a registry from persisted parts
    ///
    /// Fails with `DuplicateId` when the store holds a record under the
    /// reserved id 0, or when `next_id` would hand out an id that is already
    /// stored (or 0 itself).
    pub fn from_parts(owner: Principal, next_id: RecordId, store: S) -> RegistryResult<Self> {
        let ids = store.ids();
        if let Some(&min_id) = ids.first().filter(|id| **id < FIRST_ID) {
            warn!("Stored {} under reserved id {}", T::KIND, min_id);
            return Err(RegistryError::DuplicateId(min_id));
        }

        let max_id = ids.last().copied().unwrap_or(0);
        if next_id < FIRST_ID || next_id <= max_id {
            return Err(RegistryError::DuplicateId(next_id));
        }

        Ok(OwnedRegistry {
            owner,
            next_id,
            store,
            _record: PhantomData,
        })
    }

    /// The registry owner
    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Next id that `create` will allocate
    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    /// Whether `caller` is the owner
    pub fn is_owner(&self, caller: &Principal) -> bool {
        *caller == self.owner
    }

    fn authorize(&self, caller: &Principal, action: &str) -> RegistryResult<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            warn!("Rejected {} {} from non-owner {}", T::KIND, action, caller);
            Err(RegistryError::Unauthorized)
        }
    }

    /// Store `record` under the next id
    pub fn create(&mut self, caller: &Principal, policy: CreatePolicy, record: T) -> RegistryResult<RecordId> {
        if policy == CreatePolicy::OwnerOnly {
            self.authorize(caller, "create")?;
        }

        let id = self.next_id;
        if id < FIRST_ID || self.store.contains(id) {
            warn!("Id allocation for {} collided at {}", T::KIND, id);
            return Err(RegistryError::DuplicateId(id));
        }

        self.store.insert(id, record);
        // Saturating: once exhausted, the next create trips the collision guard
        self.next_id = id.saturating_add(1);

        debug!("Created {} {} by {}", T::KIND, id, caller);
        Ok(id)
    }

    /// Apply `patch` to the record under `id`
    pub fn update<P: Patch<T>>(&mut self, caller: &Principal, id: RecordId, patch: P) -> RegistryResult<()> {
        self.authorize(caller, "update")?;

        let current = self.store.get(id).ok_or_else(|| {
            warn!("Update of unknown {} {}", T::KIND, id);
            RegistryError::NotFound(id)
        })?;

        let updated = patch.apply(current);
        self.store.insert(id, updated);

        debug!("Updated {} {} by {}", T::KIND, id, caller);
        Ok(())
    }

    /// Look up a record; absent ids yield `None`
    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.store.get(id)
    }

    /// Project a field of the record under `id`, or `V::default()` if absent
    pub fn derive<V, F>(&self, id: RecordId, projector: F) -> V
    where
        V: Default,
        F: FnOnce(&T) -> V,
    {
        self.store.get(id).map(projector).unwrap_or_default()
    }

    /// All allocated ids in ascending order
    pub fn ids(&self) -> Vec<RecordId> {
        self.store.ids()
    }

    /// Records in id order
    pub fn records(&self) -> Vec<(RecordId, T)> {
        self.store
            .ids()
            .into_iter()
            .filter_map(|id| self.store.get(id).map(|record| (id, record.clone())))
            .collect()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no record has been created yet
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Digest over the id counter and every record, in id order
    pub fn state_digest(&self) -> [u8; 32] {
        let mut fields: Vec<Vec<u8>> = Vec::with_capacity(self.store.len() + 1);
        fields.push(self.next_id.to_be_bytes().to_vec());

        for id in self.store.ids() {
            if let Some(record) = self.store.get(id) {
                let mut field = id.to_be_bytes().to_vec();
                field.extend_from_slice(&record.digest());
                fields.push(field);
            }
        }

        let refs: Vec<&[u8]> = fields.iter().map(Vec::as_slice).collect();
        crypto::secure_hash_multiple(T::KIND, &refs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Note {
        text: String,
        pinned: bool,
    }

    impl Record for Note {
        const KIND: &'static str = "note";

        fn digest(&self) -> [u8; 32] {
            crypto::secure_hash_multiple("TEST_NOTE", &[self.text.as_bytes(), &[self.pinned as u8]])
        }
    }

    #[derive(Default)]
    struct NotePatch {
        text: Option<String>,
        pinned: Option<bool>,
    }

    impl Patch<Note> for NotePatch {
        fn apply(self, record: &Note) -> Note {
            Note {
                text: self.text.unwrap_or_else(|| record.text.clone()),
                pinned: self.pinned.unwrap_or(record.pinned),
            }
        }
    }

    fn note(text: &str) -> Note {
        Note { text: text.to_string(), pinned: false }
    }

    fn owner() -> Principal {
        Principal::new("owner")
    }

    #[test]
    fn test_ids_start_at_one() {
        let mut registry: OwnedRegistry<Note> = OwnedRegistry::new(owner());
        assert_eq!(registry.next_id(), 1);

        let first = registry.create(&owner(), CreatePolicy::OwnerOnly, note("a")).unwrap();
        let second = registry.create(&owner(), CreatePolicy::OwnerOnly, note("b")).unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(registry.next_id(), 3);
        assert_eq!(registry.ids(), vec![1, 2]);
        assert!(registry.get(0).is_none());
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn test_open_policy_accepts_anyone() {
        let mut registry = OwnedRegistry::new(owner());
        let stranger = Principal::new("stranger");

        let id = registry.create(&stranger, CreatePolicy::Open, note("hello")).unwrap();
        assert_eq!(id, 1);
        assert_eq!(registry.get(1), Some(&note("hello")));
    }

    #[rstest]
    #[case("stranger")]
    #[case("")]
    #[case("OWNER")]
    #[case("owner ")]
    fn test_non_owner_rejected(#[case] caller: &str) {
        let mut registry = OwnedRegistry::new(owner());
        registry.create(&owner(), CreatePolicy::OwnerOnly, note("a")).unwrap();
        let before = registry.get(1).unwrap().digest();
        let caller = Principal::new(caller);

        assert_eq!(
            registry.create(&caller, CreatePolicy::OwnerOnly, note("b")),
            Err(RegistryError::Unauthorized)
        );
        assert_eq!(
            registry.update(&caller, 1, NotePatch { pinned: Some(true), ..Default::default() }),
            Err(RegistryError::Unauthorized)
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.next_id(), 2);
        assert_eq!(registry.get(1).unwrap().digest(), before);
    }

    #[test]
    fn test_update_merges_only_given_fields() {
        let mut registry = OwnedRegistry::new(owner());
        registry.create(&owner(), CreatePolicy::OwnerOnly, note("draft")).unwrap();

        registry
            .update(&owner(), 1, NotePatch { pinned: Some(true), ..Default::default() })
            .unwrap();

        assert_eq!(registry.get(1), Some(&Note { text: "draft".to_string(), pinned: true }));
    }

    #[test]
    fn test_update_unknown_id() {
        let mut registry: OwnedRegistry<Note> = OwnedRegistry::new(owner());
        assert_eq!(
            registry.update(&owner(), 42, NotePatch::default()),
            Err(RegistryError::NotFound(42))
        );
    }

    #[test]
    fn test_authorization_checked_before_existence() {
        let mut registry: OwnedRegistry<Note> = OwnedRegistry::new(owner());
        assert_eq!(
            registry.update(&Principal::new("stranger"), 42, NotePatch::default()),
            Err(RegistryError::Unauthorized)
        );
    }

    #[test]
    fn test_derive_defaults_when_absent() {
        let mut registry = OwnedRegistry::new(owner());
        registry
            .create(&owner(), CreatePolicy::OwnerOnly, Note { text: "x".to_string(), pinned: true })
            .unwrap();

        assert!(registry.derive(1, |n: &Note| n.pinned));
        assert!(!registry.derive(2, |n: &Note| n.pinned));
        assert_eq!(registry.derive(9, |n: &Note| n.text.len()), 0);
    }

    #[test]
    fn test_collision_guard() {
        let mut registry = OwnedRegistry::new(owner());
        registry.create(&owner(), CreatePolicy::OwnerOnly, note("a")).unwrap();

        // Simulate a broken allocator
        registry.next_id = 1;
        assert_eq!(
            registry.create(&owner(), CreatePolicy::OwnerOnly, note("b")),
            Err(RegistryError::DuplicateId(1))
        );
        assert_eq!(registry.get(1), Some(&note("a")));
    }

    #[test]
    fn test_exhausted_ids_trip_collision_guard() {
        let store: MemoryStore<Note> = vec![(u64::MAX, note("last"))].into_iter().collect();
        let mut registry = OwnedRegistry::with_store(owner(), store);

        assert_eq!(registry.next_id(), u64::MAX);
        assert_eq!(
            registry.create(&owner(), CreatePolicy::OwnerOnly, note("overflow")),
            Err(RegistryError::DuplicateId(u64::MAX))
        );
    }

    #[test]
    fn test_with_store_continues_after_highest_id() {
        let store: MemoryStore<Note> = vec![(1, note("a")), (5, note("e"))].into_iter().collect();
        let mut registry = OwnedRegistry::with_store(owner(), store);

        assert_eq!(registry.next_id(), 6);
        assert_eq!(registry.create(&owner(), CreatePolicy::OwnerOnly, note("f")), Ok(6));
    }

    #[test]
    fn test_from_parts_rejects_stale_counter() {
        let store: MemoryStore<Note> = vec![(1, note("a")), (2, note("b"))].into_iter().collect();

        assert!(OwnedRegistry::from_parts(owner(), 3, store.clone()).is_ok());
        assert_eq!(
            OwnedRegistry::from_parts(owner(), 2, store.clone()).err(),
            Some(RegistryError::DuplicateId(2))
        );
        assert_eq!(
            OwnedRegistry::<Note>::from_parts(owner(), 0, MemoryStore::new()).err(),
            Some(RegistryError::DuplicateId(0))
        );
    }

    #[test]
    fn test_from_parts_rejects_reserved_id() {
        let store: MemoryStore<Note> = vec![(0, note("zero")), (1, note("a"))].into_iter().collect();

        assert_eq!(
            OwnedRegistry::from_parts(owner(), 2, store).err(),
            Some(RegistryError::DuplicateId(0))
        );
    }

    #[test]
    fn test_state_digest_tracks_changes() {
        let mut registry: OwnedRegistry<Note> = OwnedRegistry::new(owner());
        let empty = registry.state_digest();

        registry.create(&owner(), CreatePolicy::OwnerOnly, note("a")).unwrap();
        let one = registry.state_digest();
        assert_ne!(empty, one);

        let _ = registry.update(&Principal::new("stranger"), 1, NotePatch { pinned: Some(true), ..Default::default() });
        assert_eq!(registry.state_digest(), one);

        registry
            .update(&owner(), 1, NotePatch { pinned: Some(true), ..Default::default() })
            .unwrap();
        assert_ne!(registry.state_digest(), one);
    }

    proptest! {
        #[test]
        fn prop_ids_are_dense_and_monotonic(count in 0usize..64, probe in 0u64..1_000) {
            let mut registry = OwnedRegistry::new(owner());
            for i in 0..count {
                let id = registry.create(&owner(), CreatePolicy::OwnerOnly, note(&i.to_string())).unwrap();
                prop_assert_eq!(id, i as u64 + 1);
            }

            let expected: Vec<RecordId> = (1..=count as u64).collect();
            prop_assert_eq!(registry.ids(), expected);
            prop_assert_eq!(registry.get(probe).is_some(), probe >= 1 && probe <= count as u64);
        }

        #[test]
        fn prop_rejected_calls_do_not_move_counter(attempts in 1usize..16) {
            let mut registry = OwnedRegistry::new(owner());
            let stranger = Principal::new("stranger");
            for _ in 0..attempts {
                prop_assert!(registry.create(&stranger, CreatePolicy::OwnerOnly, note("x")).is_err());
            }
            prop_assert_eq!(registry.next_id(), 1);
            prop_assert!(registry.is_empty());
        }
    }
}
