use crate::error::AppError;
use crate::model::Beer;
use crate::store::BeerRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Process-local repository. Used when no database is configured, and in tests.
#[derive(Default)]
pub struct MemoryBeerRepository {
    beers: RwLock<HashMap<Uuid, Beer>>,
}

impl MemoryBeerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.beers.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BeerRepository for MemoryBeerRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Beer>, AppError> {
        let beers = self
            .beers
            .read()
            .map_err(|_| AppError::Internal("beer store lock poisoned".into()))?;
        Ok(beers.get(&id).cloned())
    }

    async fn save(&self, mut beer: Beer) -> Result<Beer, AppError> {
        let mut beers = self
            .beers
            .write()
            .map_err(|_| AppError::Internal("beer store lock poisoned".into()))?;
        let now = Utc::now();
        let id = *beer.id.get_or_insert_with(Uuid::new_v4);
        if let Some(upc) = beer.upc {
            if beers.iter().any(|(other, b)| *other != id && b.upc == Some(upc)) {
                return Err(AppError::Conflict(format!("upc {} already in use", upc)));
            }
        }
        match beers.get(&id) {
            Some(existing) => {
                beer.version = Some(existing.version.unwrap_or(0) + 1);
                beer.created_date = existing.created_date;
            }
            None => {
                beer.version = Some(1);
                beer.created_date = Some(now);
            }
        }
        beer.last_modified_date = Some(now);
        beers.insert(id, beer.clone());
        tracing::debug!(%id, version = ?beer.version, "saved beer in memory");
        Ok(beer)
    }
}
