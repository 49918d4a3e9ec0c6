use crate::error::AppError;
use crate::model::BeerDto;
use crate::service::mapper::{beer_to_dto, dto_to_beer};
use crate::service::BeerValidator;
use crate::store::BeerRepository;
use uuid::Uuid;

pub struct BeerService;

impl BeerService {
    /// Fetch one beer by id.
    pub async fn get_by_id(repo: &dyn BeerRepository, id: Uuid) -> Result<BeerDto, AppError> {
        let beer = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("beer {}", id)))?;
        Ok(beer_to_dto(&beer))
    }

    /// Validate and insert a new beer. Returns the saved representation.
    pub async fn save_new(repo: &dyn BeerRepository, dto: BeerDto) -> Result<BeerDto, AppError> {
        BeerValidator::validate(&dto)?;
        let saved = repo.save(dto_to_beer(dto)).await?;
        tracing::info!(id = ?saved.id, "beer created");
        Ok(beer_to_dto(&saved))
    }

    /// Replace name, style, price and upc of an existing beer.
    pub async fn update(repo: &dyn BeerRepository, id: Uuid, dto: BeerDto) -> Result<(), AppError> {
        BeerValidator::validate(&dto)?;
        let mut beer = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("beer {}", id)))?;
        beer.beer_name = dto.beer_name;
        beer.beer_style = dto.beer_style;
        beer.price = dto.price;
        beer.upc = dto.upc;
        let saved = repo.save(beer).await?;
        tracing::info!(%id, version = ?saved.version, "beer updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BeerStyle;
    use crate::store::MemoryBeerRepository;
    use rust_decimal::Decimal;

    fn nice_ale() -> BeerDto {
        BeerDto {
            beer_name: Some("Nice Ale".into()),
            beer_style: Some(BeerStyle::Ale),
            price: Some(Decimal::new(999, 2)),
            upc: Some(123123123123),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn save_then_get() {
        let repo = MemoryBeerRepository::new();
        let saved = BeerService::save_new(&repo, nice_ale()).await.unwrap();
        let id = saved.id.expect("id assigned");
        assert_eq!(saved.version, Some(1));

        let fetched = BeerService::get_by_id(&repo, id).await.unwrap();
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn update_keeps_id_and_bumps_version() {
        let repo = MemoryBeerRepository::new();
        let saved = BeerService::save_new(&repo, nice_ale()).await.unwrap();
        let id = saved.id.unwrap();

        let change = BeerDto {
            beer_name: Some("Better Stout".into()),
            beer_style: Some(BeerStyle::Stout),
            ..nice_ale()
        };
        BeerService::update(&repo, id, change).await.unwrap();

        let fetched = BeerService::get_by_id(&repo, id).await.unwrap();
        assert_eq!(fetched.id, Some(id));
        assert_eq!(fetched.version, Some(2));
        assert_eq!(fetched.beer_name.as_deref(), Some("Better Stout"));
        assert_eq!(fetched.beer_style, Some(BeerStyle::Stout));
        assert_eq!(fetched.created_date, saved.created_date);
    }

    #[tokio::test]
    async fn missing_beer_is_not_found() {
        let repo = MemoryBeerRepository::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            BeerService::get_by_id(&repo, id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            BeerService::update(&repo, id, nice_ale()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn invalid_payload_is_not_saved() {
        let repo = MemoryBeerRepository::new();
        let dto = BeerDto {
            beer_name: None,
            ..nice_ale()
        };
        assert!(matches!(
            BeerService::save_new(&repo, dto).await,
            Err(AppError::Validation(_))
        ));
        assert!(repo.is_empty());
    }
}
