use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use discovery_common::{DiscoveredVenue, VenueStatus};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct VenueStats {
    pub total: u32,
    pub discovered: u32,
    pub verified: u32,
    pub rejected: u32,
    pub published: u32,
}

#[async_trait]
pub trait DiscoveredVenueStore: Send + Sync {
    async fn find_by_delivery_url(&self, url: &str) -> Option<DiscoveredVenue>;
    /// Upsert keyed on (platform, url) of the venue's delivery platforms.
    /// A duplicate returns the existing record unchanged.
    async fn create_venue(&self, record: DiscoveredVenue) -> DiscoveredVenue;
    async fn get_by_ids(&self, ids: &[Uuid]) -> Vec<DiscoveredVenue>;
    async fn get_by_status(&self, status: VenueStatus) -> Vec<DiscoveredVenue>;
    async fn get_stats(&self) -> VenueStats;
    /// Replace a venue wholesale (used by `verify` mode to flip a
    /// `delivery_platforms[].verified` flag). Not part of the minimal CRUD
    /// surface but required to make verification durable.
    async fn update_venue(&self, venue: DiscoveredVenue);
}

pub struct InMemoryVenueStore {
    venues: RwLock<HashMap<Uuid, DiscoveredVenue>>,
}

impl InMemoryVenueStore {
    pub fn new() -> Self {
        Self {
            venues: RwLock::new(HashMap::new()),
        }
    }

    fn find_by_platform_url(venues: &HashMap<Uuid, DiscoveredVenue>, platform: &str, url: &str) -> Option<DiscoveredVenue> {
        venues
            .values()
            .find(|v| v.delivery_platforms.iter().any(|p| p.platform == platform && p.url == url))
            .cloned()
    }
}

impl Default for InMemoryVenueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiscoveredVenueStore for InMemoryVenueStore {
    async fn find_by_delivery_url(&self, url: &str) -> Option<DiscoveredVenue> {
        self.venues
            .read()
            .expect("venue store lock poisoned")
            .values()
            .find(|v| v.delivery_platforms.iter().any(|p| p.url == url))
            .cloned()
    }

    async fn create_venue(&self, record: DiscoveredVenue) -> DiscoveredVenue {
        let mut venues = self.venues.write().expect("venue store lock poisoned");
        if let Some(primary) = record.delivery_platforms.first() {
            if let Some(existing) = Self::find_by_platform_url(&venues, &primary.platform, &primary.url) {
                return existing;
            }
        }
        venues.insert(record.id, record.clone());
        record
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> Vec<DiscoveredVenue> {
        let venues = self.venues.read().expect("venue store lock poisoned");
        ids.iter().filter_map(|id| venues.get(id).cloned()).collect()
    }

    async fn get_by_status(&self, status: VenueStatus) -> Vec<DiscoveredVenue> {
        self.venues
            .read()
            .expect("venue store lock poisoned")
            .values()
            .filter(|v| v.status == status)
            .cloned()
            .collect()
    }

    async fn update_venue(&self, venue: DiscoveredVenue) {
        self.venues
            .write()
            .expect("venue store lock poisoned")
            .insert(venue.id, venue);
    }

    async fn get_stats(&self) -> VenueStats {
        let venues = self.venues.read().expect("venue store lock poisoned");
        let mut stats = VenueStats {
            total: venues.len() as u32,
            ..Default::default()
        };
        for v in venues.values() {
            match v.status {
                VenueStatus::Discovered => stats.discovered += 1,
                VenueStatus::Verified => stats.verified += 1,
                VenueStatus::Rejected => stats.rejected += 1,
                VenueStatus::Published => stats.published += 1,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use discovery_common::DeliveryPlatform;

    fn venue(platform: &str, url: &str) -> DiscoveredVenue {
        DiscoveredVenue {
            id: Uuid::new_v4(),
            discovery_run_id: Uuid::new_v4(),
            name: "Birdie Birdie".into(),
            is_chain: false,
            chain_confidence: 0,
            address: None,
            delivery_platforms: vec![DeliveryPlatform {
                platform: platform.into(),
                url: url.into(),
                active: true,
                verified: false,
            }],
            planted_products: vec![],
            dishes: vec![],
            confidence_score: 80,
            confidence_factors: vec![],
            discovered_by_strategy_id: None,
            discovered_by_query: "q".into(),
            status: VenueStatus::Discovered,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_venue_upserts_on_platform_and_url() {
        let store = InMemoryVenueStore::new();
        let v1 = store.create_venue(venue("wolt", "https://wolt.com/a")).await;
        let v2 = store.create_venue(venue("wolt", "https://wolt.com/a")).await;
        assert_eq!(v1.id, v2.id);
        assert_eq!(store.get_stats().await.total, 1);
    }

    #[tokio::test]
    async fn find_by_delivery_url_matches_any_platform() {
        let store = InMemoryVenueStore::new();
        store.create_venue(venue("wolt", "https://wolt.com/a")).await;
        assert!(store.find_by_delivery_url("https://wolt.com/a").await.is_some());
        assert!(store.find_by_delivery_url("https://wolt.com/b").await.is_none());
    }
}
