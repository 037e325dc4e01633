// SPDX-FileCopyrightText: Wedding RSVP Developers
//
// SPDX-License-Identifier: EUPL-1.2

use super::{
    Guest, GuestId, GuestOrder, GuestPatch, GuestStore, NewGuest, Result, RsvpStatus,
    StatusCounts, StoreError,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::cmp::{Ordering, Reverse};

/// Process local guest store
///
/// Used when no database is configured. All records are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    guests: RwLock<Vec<Guest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sorts newest inserted records first for equal keys, like the sequence of a database index
fn sorted(guests: impl DoubleEndedIterator<Item = Guest>, order: GuestOrder) -> Vec<Guest> {
    let mut guests = guests.rev().collect::<Vec<_>>();

    match order {
        GuestOrder::Newest => guests.sort_by_key(|guest| Reverse(guest.created_at)),
        GuestOrder::Oldest => {
            guests.reverse();
            guests.sort_by_key(|guest| guest.created_at);
        }
        GuestOrder::LatestResponse => guests.sort_by(latest_response_first),
    }

    guests
}

fn latest_response_first(a: &Guest, b: &Guest) -> Ordering {
    let by_response = match (a.responded_at, b.responded_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };

    by_response.then_with(|| b.created_at.cmp(&a.created_at))
}

impl GuestStore for MemoryStore {
    #[tracing::instrument(err, skip_all)]
    fn insert(&self, new_guest: NewGuest) -> Result<Guest> {
        let guest = new_guest.into_guest(GuestId::generate(), Utc::now());

        self.guests.write().push(guest.clone());

        Ok(guest)
    }

    #[tracing::instrument(err, skip(self))]
    fn find_all(&self, order: GuestOrder) -> Result<Vec<Guest>> {
        let guests = self.guests.read();

        Ok(sorted(guests.iter().cloned(), order))
    }

    #[tracing::instrument(err, skip(self))]
    fn find_by_id(&self, id: GuestId) -> Result<Guest> {
        self.guests
            .read()
            .iter()
            .find(|guest| guest.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    #[tracing::instrument(err, skip(self))]
    fn find_by_status(&self, status: RsvpStatus) -> Result<Vec<Guest>> {
        let guests = self.guests.read();

        let matching = guests
            .iter()
            .filter(|guest| guest.rsvp_status == status)
            .cloned()
            .collect::<Vec<_>>();

        Ok(sorted(matching.into_iter(), GuestOrder::LatestResponse))
    }

    #[tracing::instrument(err, skip(self))]
    fn find_recent_responses(&self, limit: usize) -> Result<Vec<Guest>> {
        let guests = self.guests.read();

        let responded = guests
            .iter()
            .filter(|guest| guest.rsvp_status != RsvpStatus::Pending)
            .cloned()
            .collect::<Vec<_>>();

        let mut responded = sorted(responded.into_iter(), GuestOrder::LatestResponse);
        responded.truncate(limit);

        Ok(responded)
    }

    #[tracing::instrument(err, skip(self, patch))]
    fn update(&self, id: GuestId, patch: GuestPatch) -> Result<Guest> {
        let mut guests = self.guests.write();

        let guest = guests
            .iter_mut()
            .find(|guest| guest.id == id)
            .ok_or(StoreError::NotFound)?;

        patch.apply(guest, Utc::now());

        Ok(guest.clone())
    }

    #[tracing::instrument(err, skip(self))]
    fn delete_by_id(&self, id: GuestId) -> Result<Guest> {
        let mut guests = self.guests.write();

        let position = guests
            .iter()
            .position(|guest| guest.id == id)
            .ok_or(StoreError::NotFound)?;

        Ok(guests.remove(position))
    }

    #[tracing::instrument(err, skip(self))]
    fn delete_all(&self) -> Result<u64> {
        let mut guests = self.guests.write();

        let deleted = guests.len() as u64;
        guests.clear();

        Ok(deleted)
    }

    #[tracing::instrument(err, skip(self))]
    fn count_by_status(&self) -> Result<StatusCounts> {
        let guests = self.guests.read();

        let mut counts = StatusCounts::default();
        for guest in guests.iter() {
            counts.add(guest.rsvp_status, 1);
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_guest(name: &str, status: Option<RsvpStatus>) -> NewGuest {
        NewGuest::new(Some(name.into()), None, status, None, Some(Utc::now())).unwrap()
    }

    #[test]
    fn insert_and_find() {
        let store = MemoryStore::new();

        let ani = store.insert(new_guest("Ani", None)).unwrap();
        assert_eq!(ani.rsvp_status, RsvpStatus::Pending);
        assert_eq!(ani.created_at, ani.updated_at);

        assert_eq!(store.find_by_id(ani.id).unwrap(), ani);
        assert_eq!(
            store.find_by_id(GuestId::generate()),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn duplicates_are_kept() {
        let store = MemoryStore::new();

        let first = store.insert(new_guest("Ani", None)).unwrap();
        let second = store.insert(new_guest("Ani", None)).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.find_all(GuestOrder::Newest).unwrap().len(), 2);
    }

    #[test]
    fn newest_first_keeps_insertion_order_for_ties() {
        let store = MemoryStore::new();

        let a = store.insert(new_guest("A", None)).unwrap();
        let b = store.insert(new_guest("B", None)).unwrap();
        let c = store.insert(new_guest("C", None)).unwrap();

        let ids = |order| {
            store
                .find_all(order)
                .unwrap()
                .into_iter()
                .map(|guest| guest.id)
                .collect::<Vec<_>>()
        };

        assert_eq!(ids(GuestOrder::Newest), vec![c.id, b.id, a.id]);
        assert_eq!(ids(GuestOrder::Oldest), vec![a.id, b.id, c.id]);
    }

    #[test]
    fn latest_response_ordering() {
        let store = MemoryStore::new();
        let now = Utc::now();

        let early = store
            .insert(
                NewGuest::new(
                    Some("Early".into()),
                    None,
                    None,
                    None,
                    Some(now - Duration::hours(2)),
                )
                .unwrap(),
            )
            .unwrap();
        let unanswered = store
            .insert(NewGuest::new(Some("Unanswered".into()), None, None, None, None).unwrap())
            .unwrap();
        let late = store
            .insert(
                NewGuest::new(
                    Some("Late".into()),
                    None,
                    None,
                    None,
                    Some(now - Duration::hours(1)),
                )
                .unwrap(),
            )
            .unwrap();

        let names = store
            .find_all(GuestOrder::LatestResponse)
            .unwrap()
            .into_iter()
            .map(|guest| guest.name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec![late.name, early.name, unanswered.name]);
    }

    #[test]
    fn recent_responses_skip_pending_and_respect_limit() {
        let store = MemoryStore::new();

        store.insert(new_guest("Pending", None)).unwrap();
        for i in 0..7 {
            let status = if i % 2 == 0 {
                RsvpStatus::Confirmed
            } else {
                RsvpStatus::Declined
            };
            store
                .insert(new_guest(&format!("Guest {i}"), Some(status)))
                .unwrap();
        }

        let recent = store.find_recent_responses(5).unwrap();
        assert_eq!(recent.len(), 5);
        assert!(recent
            .iter()
            .all(|guest| guest.rsvp_status != RsvpStatus::Pending));
        assert_eq!(recent[0].name, "Guest 6");
    }

    #[test]
    fn find_by_status_filters() {
        let store = MemoryStore::new();

        store.insert(new_guest("A", Some(RsvpStatus::Confirmed))).unwrap();
        store.insert(new_guest("B", Some(RsvpStatus::Declined))).unwrap();
        store.insert(new_guest("C", Some(RsvpStatus::Confirmed))).unwrap();

        let confirmed = store.find_by_status(RsvpStatus::Confirmed).unwrap();
        assert_eq!(confirmed.len(), 2);
        assert!(confirmed
            .iter()
            .all(|guest| guest.rsvp_status == RsvpStatus::Confirmed));
        assert!(store.find_by_status(RsvpStatus::Pending).unwrap().is_empty());
    }

    #[test]
    fn update_allows_any_status_transition() {
        let store = MemoryStore::new();
        let guest = store
            .insert(new_guest("Dewi", Some(RsvpStatus::Confirmed)))
            .unwrap();

        let patch = GuestPatch::new(None, None, Some(RsvpStatus::Pending), None, None).unwrap();
        let updated = store.update(guest.id, patch).unwrap();

        assert_eq!(updated.rsvp_status, RsvpStatus::Pending);
        assert_eq!(updated.name, "Dewi");
        assert!(updated.updated_at >= guest.updated_at);

        assert_eq!(
            store.update(GuestId::generate(), GuestPatch::default()),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn delete_by_id_and_all() {
        let store = MemoryStore::new();
        let a = store.insert(new_guest("A", None)).unwrap();
        store.insert(new_guest("B", None)).unwrap();
        store.insert(new_guest("C", None)).unwrap();

        assert_eq!(store.delete_by_id(a.id).unwrap(), a);
        assert_eq!(store.delete_by_id(a.id), Err(StoreError::NotFound));

        assert_eq!(store.delete_all().unwrap(), 2);
        assert!(store.find_all(GuestOrder::Newest).unwrap().is_empty());
        assert_eq!(store.delete_all().unwrap(), 0);
    }

    #[test]
    fn count_by_status() {
        let store = MemoryStore::new();
        store.insert(new_guest("A", None)).unwrap();
        store.insert(new_guest("B", Some(RsvpStatus::Confirmed))).unwrap();
        store.insert(new_guest("C", Some(RsvpStatus::Confirmed))).unwrap();
        store.insert(new_guest("D", Some(RsvpStatus::Declined))).unwrap();

        let counts = store.count_by_status().unwrap();
        assert_eq!(
            counts,
            StatusCounts {
                pending: 1,
                confirmed: 2,
                declined: 1
            }
        );
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn every_operation_opens_a_span() {
        use std::sync::{Arc, Mutex};
        use tracing::span::{Attributes, Id};
        use tracing::Subscriber;
        use tracing_subscriber::layer::{Context, SubscriberExt};
        use tracing_subscriber::Layer;

        #[derive(Clone, Default)]
        struct SpanNames(Arc<Mutex<Vec<&'static str>>>);

        impl<S: Subscriber> Layer<S> for SpanNames {
            fn on_new_span(&self, attrs: &Attributes<'_>, _: &Id, _: Context<'_, S>) {
                self.0.lock().unwrap().push(attrs.metadata().name());
            }
        }

        let names = SpanNames::default();
        let subscriber = tracing_subscriber::registry().with(names.clone());

        tracing::subscriber::with_default(subscriber, || {
            let store = MemoryStore::new();
            let guest = store.insert(new_guest("Eka", None)).unwrap();

            store.find_all(GuestOrder::Newest).unwrap();
            store.find_by_id(guest.id).unwrap();
            store.find_by_status(RsvpStatus::Pending).unwrap();
            store.find_recent_responses(5).unwrap();
            store.count_by_status().unwrap();
            store.update(guest.id, GuestPatch::default()).unwrap();
            store.delete_by_id(guest.id).unwrap();
            store.delete_all().unwrap();
        });

        assert_eq!(
            *names.0.lock().unwrap(),
            vec![
                "insert",
                "find_all",
                "find_by_id",
                "find_by_status",
                "find_recent_responses",
                "count_by_status",
                "update",
                "delete_by_id",
                "delete_all",
            ]
        );
    }
}
